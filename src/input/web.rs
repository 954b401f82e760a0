use std::sync::Arc;

use anyhow::{anyhow, Result};
use glam::Vec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Event, HtmlCanvasElement, PointerEvent as DomPointerEvent, WheelEvent};

use super::{InputState, PointerButton, PointerEvent};

type Listener = Closure<dyn FnMut(Event)>;

/// Forwards DOM pointer and wheel events from a canvas into [`InputState`].
///
/// Listeners are removed again when the handler is dropped.
pub struct WebInputHandler {
    canvas: HtmlCanvasElement,
    listeners: Vec<(&'static str, Listener)>,
}

impl WebInputHandler {
    pub fn attach(canvas: &HtmlCanvasElement, input: Arc<InputState>) -> Result<Self> {
        let mut handler = Self {
            canvas: canvas.clone(),
            listeners: Vec::new(),
        };

        // Keep touch gestures from scrolling the page instead of orbiting.
        if let Err(err) = canvas.style().set_property("touch-action", "none") {
            log::warn!("could not disable touch-action on canvas: {err:?}");
        }

        {
            let input = Arc::clone(&input);
            let canvas = canvas.clone();
            handler.listen("pointerdown", move |event| {
                let Some(event) = event.dyn_ref::<DomPointerEvent>() else {
                    return;
                };
                let Some(button) = PointerButton::from_dom_index(event.button()) else {
                    return;
                };
                let _ = canvas.set_pointer_capture(event.pointer_id());
                input.push(PointerEvent::Down {
                    button,
                    position: offset(event),
                });
            })?;
        }

        {
            let input = Arc::clone(&input);
            handler.listen("pointermove", move |event| {
                if let Some(event) = event.dyn_ref::<DomPointerEvent>() {
                    input.push(PointerEvent::Move {
                        position: offset(event),
                    });
                }
            })?;
        }

        for name in ["pointerup", "pointercancel"] {
            let input = Arc::clone(&input);
            let canvas = canvas.clone();
            handler.listen(name, move |event| {
                let Some(event) = event.dyn_ref::<DomPointerEvent>() else {
                    return;
                };
                let _ = canvas.release_pointer_capture(event.pointer_id());
                if let Some(button) = PointerButton::from_dom_index(event.button()) {
                    input.push(PointerEvent::Up { button });
                } else {
                    // pointercancel reports no button; release whatever is held.
                    for button in [
                        PointerButton::Primary,
                        PointerButton::Secondary,
                        PointerButton::Auxiliary,
                    ] {
                        if input.is_pressed(button) {
                            input.push(PointerEvent::Up { button });
                        }
                    }
                }
            })?;
        }

        {
            let input = Arc::clone(&input);
            handler.listen("wheel", move |event| {
                if let Some(event) = event.dyn_ref::<WheelEvent>() {
                    event.prevent_default();
                    input.push(PointerEvent::Wheel {
                        delta_y: event.delta_y() as f32,
                    });
                }
            })?;
        }

        handler.listen("contextmenu", |event| event.prevent_default())?;

        Ok(handler)
    }

    fn listen(&mut self, name: &'static str, callback: impl FnMut(Event) + 'static) -> Result<()> {
        let closure: Listener = Closure::new(callback);
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        self.canvas
            .add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|err| anyhow!("failed to register {name} listener: {err:?}"))?;
        self.listeners.push((name, closure));
        Ok(())
    }
}

impl Drop for WebInputHandler {
    fn drop(&mut self) {
        for (name, closure) in self.listeners.drain(..) {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

fn offset(event: &DomPointerEvent) -> Vec2 {
    Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
}
