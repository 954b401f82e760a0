use std::collections::HashSet;

use glam::Vec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Pointer buttons the orbit controller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    /// Left mouse button, pen tip or a single touch.
    Primary,
    /// Right mouse button.
    Secondary,
    /// Middle mouse button / wheel press.
    Auxiliary,
}

impl PointerButton {
    /// Maps a DOM `MouseEvent.button` index.
    pub fn from_dom_index(index: i16) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Auxiliary),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Input event in surface-local logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { button: PointerButton, position: Vec2 },
    Move { position: Vec2 },
    Up { button: PointerButton },
    /// Positive `delta_y` scrolls away from the user (zoom out).
    Wheel { delta_y: f32 },
}

/// Pointer input shared between platform listeners and the controller.
///
/// Listeners push events as they arrive; the controller drains the queue
/// once per frame.
#[derive(Debug, Default)]
pub struct InputState {
    queue: Mutex<Vec<PointerEvent>>,
    pressed: Mutex<HashSet<PointerButton>>,
    position: Mutex<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: PointerEvent) {
        match event {
            PointerEvent::Down { button, position } => {
                self.pressed.lock().insert(button);
                *self.position.lock() = position;
            }
            PointerEvent::Up { button } => {
                self.pressed.lock().remove(&button);
            }
            PointerEvent::Move { position } => {
                *self.position.lock() = position;
            }
            PointerEvent::Wheel { .. } => {}
        }
        self.queue.lock().push(event);
    }

    /// Takes every event queued since the last call.
    pub fn drain(&self) -> Vec<PointerEvent> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_pressed(&self, button: PointerButton) -> bool {
        self.pressed.lock().contains(&button)
    }

    pub fn pointer_position(&self) -> Vec2 {
        *self.position.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_buttons_and_position() {
        let input = InputState::new();
        input.push(PointerEvent::Down {
            button: PointerButton::Primary,
            position: Vec2::new(10.0, 20.0),
        });
        assert!(input.is_pressed(PointerButton::Primary));
        input.push(PointerEvent::Move {
            position: Vec2::new(15.0, 25.0),
        });
        assert_eq!(input.pointer_position(), Vec2::new(15.0, 25.0));
        input.push(PointerEvent::Up {
            button: PointerButton::Primary,
        });
        assert!(!input.is_pressed(PointerButton::Primary));
    }

    #[test]
    fn drain_empties_the_queue() {
        let input = InputState::new();
        input.push(PointerEvent::Wheel { delta_y: 100.0 });
        input.push(PointerEvent::Wheel { delta_y: -50.0 });
        assert_eq!(input.pending(), 2);
        assert_eq!(input.drain().len(), 2);
        assert!(input.drain().is_empty());
    }

    #[test]
    fn dom_button_indices() {
        assert_eq!(PointerButton::from_dom_index(0), Some(PointerButton::Primary));
        assert_eq!(PointerButton::from_dom_index(1), Some(PointerButton::Auxiliary));
        assert_eq!(PointerButton::from_dom_index(2), Some(PointerButton::Secondary));
        assert_eq!(PointerButton::from_dom_index(3), None);
    }
}
