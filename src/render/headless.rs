use anyhow::Result;
use log::debug;

use crate::camera::PerspectiveCamera;
use crate::config::RendererOptions;
use crate::scene::Scene;

use super::SceneRenderer;

/// Per-frame bookkeeping of what a draw would have submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub shadow_casters: usize,
    pub shadow_receivers: usize,
}

/// Renderer that walks the scene like the GPU path but submits nothing.
///
/// Used when no display or adapter is available and by tests.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    options: RendererOptions,
    frames: u64,
    last_frame: FrameStats,
}

impl HeadlessRenderer {
    pub fn new(options: RendererOptions) -> Self {
        Self {
            options,
            frames: 0,
            last_frame: FrameStats::default(),
        }
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        let shadows = self.options.shadows_enabled
            && scene.directional_lights().any(|light| light.cast_shadow);
        let mut stats = FrameStats::default();
        for (_, mesh) in scene.meshes() {
            stats.draw_calls += 1;
            if shadows && mesh.cast_shadow {
                stats.shadow_casters += 1;
            }
            if shadows && mesh.receive_shadow {
                stats.shadow_receivers += 1;
            }
        }
        self.frames += 1;
        self.last_frame = stats;
        debug!(
            "headless frame {} from {:?}: {:?}",
            self.frames, camera.position, stats
        );
        Ok(())
    }
}
