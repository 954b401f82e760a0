//! A small lit scene (a box on a ground plane) with orbit camera controls.
//!
//! The scene itself lives in [`bootstrap::SceneContext`], which owns the
//! renderer, the scene graph and the camera controller and exposes a single
//! `draw` step. Platform front ends (the native binary and, on wasm32, the
//! [`web`] module) only size the surface, feed pointer input and decide when
//! the next frame runs through [`frame_loop::AnimationLoop`]. Everything
//! except the GPU renderer can run headless, which is how the tests use it.

pub mod bootstrap;
pub mod camera;
pub mod color;
pub mod config;
pub mod controls;
pub mod frame_loop;
pub mod geometry;
pub mod input;
pub mod light;
pub mod material;
pub mod mesh;
pub mod render;
pub mod scene;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use bootstrap::SceneContext;
pub use camera::PerspectiveCamera;
pub use color::{Color, ColorError};
pub use config::{pixel_ratio_for, ConfigError, RendererOptions, ViewportConfig, MAX_PIXEL_RATIO};
pub use controls::{CameraController, OrbitControls};
pub use frame_loop::{AnimationLoop, FrameStatus, LoopHandle};
pub use geometry::{Geometry, MeshData, Vertex};
pub use input::{InputState, PointerButton, PointerEvent};
pub use light::{AmbientLight, DirectionalLight, ShadowCamera};
pub use material::{LambertMaterial, Side};
pub use mesh::Mesh;
pub use render::{FrameStats, GpuRenderer, HeadlessRenderer, SceneRenderer};
pub use scene::{NodeId, Scene, SceneNode};
