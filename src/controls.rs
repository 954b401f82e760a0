//! Pointer-driven orbit camera controller.
//!
//! The controller keeps the camera on a sphere around a pivot point. Input is
//! accumulated from [`InputState`] and applied in [`CameraController::update`],
//! which the frame loop calls once per frame:
//!
//! * primary drag rotates around the pivot,
//! * secondary drag pans the pivot in screen space,
//! * auxiliary drag and the wheel dolly towards or away from the pivot.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::config::ViewportConfig;
use crate::input::{InputState, PointerButton, PointerEvent};

const EPS: f32 = 1e-6;

/// Anything that moves a camera once per frame.
pub trait CameraController {
    /// Applies pending input; returns `true` when the camera moved.
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    None,
    Rotate,
    Dolly,
    Pan,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= EPS {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit controller bound to an input source and a surface size.
#[derive(Debug)]
pub struct OrbitControls {
    input: Arc<InputState>,
    /// Height of the bound surface in logical pixels.
    element_height: f32,
    pub target: Vec3,
    pub enabled: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    state: DragState,
    last_pointer: Vec2,
    spherical_delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    pub fn new(input: Arc<InputState>, viewport: &ViewportConfig) -> Self {
        Self {
            input,
            element_height: viewport.height.max(1) as f32,
            target: Vec3::ZERO,
            enabled: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            enable_damping: false,
            damping_factor: 0.05,
            state: DragState::None,
            last_pointer: Vec2::ZERO,
            spherical_delta: Spherical::default(),
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    pub fn input(&self) -> &Arc<InputState> {
        &self.input
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::None
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    fn pan(&mut self, delta: Vec2, camera: &PerspectiveCamera) {
        let offset = camera.position - self.target;
        // Distance covered by half the viewport height at the pivot's depth.
        let target_distance = offset.length() * (camera.fov.to_radians() * 0.5).tan();
        let left = 2.0 * delta.x * target_distance / self.element_height;
        let up = 2.0 * delta.y * target_distance / self.element_height;
        self.pan_offset += camera.right() * -left;
        self.pan_offset += camera.up_vector() * up;
    }

    fn handle(&mut self, event: PointerEvent, camera: &PerspectiveCamera) {
        match event {
            PointerEvent::Down { button, position } => {
                self.state = match button {
                    PointerButton::Primary => DragState::Rotate,
                    PointerButton::Secondary => DragState::Pan,
                    PointerButton::Auxiliary => DragState::Dolly,
                };
                self.last_pointer = position;
            }
            PointerEvent::Move { position } => {
                let delta = position - self.last_pointer;
                self.last_pointer = position;
                match self.state {
                    DragState::None => {}
                    DragState::Rotate => {
                        let delta = delta * self.rotate_speed;
                        self.rotate_left(2.0 * PI * delta.x / self.element_height);
                        self.rotate_up(2.0 * PI * delta.y / self.element_height);
                    }
                    DragState::Dolly => {
                        if delta.y > 0.0 {
                            self.dolly_out(self.zoom_scale());
                        } else if delta.y < 0.0 {
                            self.dolly_in(self.zoom_scale());
                        }
                    }
                    DragState::Pan => self.pan(delta * self.pan_speed, camera),
                }
            }
            PointerEvent::Up { .. } => {
                self.state = DragState::None;
            }
            PointerEvent::Wheel { delta_y } => {
                if delta_y < 0.0 {
                    self.dolly_in(self.zoom_scale());
                } else if delta_y > 0.0 {
                    self.dolly_out(self.zoom_scale());
                }
            }
        }
    }
}

impl CameraController for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let events = self.input.drain();
        if self.enabled {
            for event in events {
                self.handle(event, camera);
            }
        }

        let old_position = camera.position;
        let old_rotation = camera.rotation;

        let mut spherical = Spherical::from_offset(camera.position - self.target);
        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= keep;
            self.spherical_delta.phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        camera.position.distance_squared(old_position) > EPS
            || 8.0 * (1.0 - old_rotation.dot(camera.rotation).abs()) > EPS
    }
}
