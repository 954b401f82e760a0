use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest pixel ratio the renderer will configure, whatever the host reports.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Edge length of the square shadow map.
pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("viewport must have a non-zero area (got {width}x{height})")]
    EmptyViewport { width: u32, height: u32 },
}

/// Host sizing input, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Width in CSS / logical pixels.
    pub width: u32,
    /// Height in CSS / logical pixels.
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl ViewportConfig {
    pub const fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn pixel_ratio(&self) -> f32 {
        pixel_ratio_for(self.device_pixel_ratio)
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::new(1280, 720, 1.0)
    }
}

/// Maps the host's device pixel ratio onto the ratio the renderer uses.
///
/// High-density displays are capped at [`MAX_PIXEL_RATIO`]; ratios below one
/// and nonsense values (NaN, zero, negative) fall back to one. Fractional
/// ratios such as 1.5 are kept as-is rather than rounded up to 2.
pub fn pixel_ratio_for(device_pixel_ratio: f32) -> f32 {
    if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
        return 1.0;
    }
    device_pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO)
}

/// Output configuration of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RendererOptions {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
    pub shadows_enabled: bool,
    pub antialias: bool,
    pub shadow_map_size: u32,
}

impl RendererOptions {
    pub fn for_viewport(viewport: &ViewportConfig) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            pixel_ratio: viewport.pixel_ratio(),
            shadows_enabled: true,
            antialias: true,
            shadow_map_size: DEFAULT_SHADOW_MAP_SIZE,
        }
    }

    /// Size of the backing buffer in physical pixels.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |value: u32| ((value as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }

    pub fn sample_count(&self) -> u32 {
        if self.antialias {
            4
        } else {
            1
        }
    }
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self::for_viewport(&ViewportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(pixel_ratio_for(3.0), 2.0);
        assert_eq!(pixel_ratio_for(2.0), 2.0);
        assert_eq!(pixel_ratio_for(1.5), 1.5);
        assert_eq!(pixel_ratio_for(1.0), 1.0);
    }

    #[test]
    fn odd_pixel_ratios_fall_back_to_one() {
        assert_eq!(pixel_ratio_for(0.5), 1.0);
        assert_eq!(pixel_ratio_for(0.0), 1.0);
        assert_eq!(pixel_ratio_for(-2.0), 1.0);
        assert_eq!(pixel_ratio_for(f32::NAN), 1.0);
        assert_eq!(pixel_ratio_for(f32::INFINITY), 1.0);
    }

    #[test]
    fn drawing_buffer_scales_with_ratio() {
        let options = RendererOptions::for_viewport(&ViewportConfig::new(800, 600, 3.0));
        assert_eq!(options.pixel_ratio, 2.0);
        assert_eq!(options.drawing_buffer_size(), (1600, 1200));
        assert!(options.shadows_enabled);
        assert_eq!(options.sample_count(), 4);
    }

    #[test]
    fn empty_viewport_is_rejected() {
        assert!(ViewportConfig::new(0, 600, 1.0).validate().is_err());
        assert!(ViewportConfig::new(800, 600, 1.0).validate().is_ok());
        assert_eq!(ViewportConfig::new(800, 400, 1.0).aspect(), 2.0);
    }
}
