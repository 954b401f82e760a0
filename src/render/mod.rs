mod gpu;
mod headless;
mod shaders;

use anyhow::Result;

use crate::camera::PerspectiveCamera;
use crate::scene::Scene;

pub use gpu::GpuRenderer;
pub use headless::{FrameStats, HeadlessRenderer};

/// Draws a scene from a camera's point of view.
pub trait SceneRenderer {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()>;
}
