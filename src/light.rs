use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Uniform fill light with no direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }

    pub fn radiance(&self) -> Vec3 {
        self.color.to_vec3() * self.intensity
    }
}

/// Orthographic frustum used to render a directional light's shadow map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowCamera {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
    /// Depth offset subtracted before the shadow comparison.
    pub bias: f32,
}

impl Default for ShadowCamera {
    fn default() -> Self {
        Self {
            left: -5.0,
            right: 5.0,
            bottom: -5.0,
            top: 5.0,
            near: 0.5,
            far: 500.0,
            bias: 0.0005,
        }
    }
}

/// Parallel light shining from `position` towards `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowCamera,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::Y,
            target: Vec3::ZERO,
            cast_shadow: false,
            shadow: ShadowCamera::default(),
        }
    }

    /// Unit vector pointing from the lit surface towards the light.
    pub fn direction(&self) -> Vec3 {
        let direction = (self.position - self.target).normalize_or_zero();
        if direction == Vec3::ZERO {
            Vec3::Y
        } else {
            direction
        }
    }

    pub fn radiance(&self) -> Vec3 {
        self.color.to_vec3() * self.intensity
    }

    pub fn light_view_projection(&self) -> Mat4 {
        let direction = self.direction();
        let up = if direction.cross(Vec3::Y).length_squared() <= f32::EPSILON {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, self.target, up);
        let shadow = &self.shadow;
        let projection = Mat4::orthographic_rh(
            shadow.left,
            shadow.right,
            shadow.bottom,
            shadow.top,
            shadow.near,
            shadow.far,
        );
        projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_at_the_light() {
        let mut light = DirectionalLight::new(Color::WHITE, 3.0);
        light.position = Vec3::new(-3.0, 5.0, 1.0);
        let expected = Vec3::new(-3.0, 5.0, 1.0).normalize();
        assert!(light.direction().abs_diff_eq(expected, 1e-6));
        assert_eq!(light.radiance(), Vec3::splat(3.0));
    }

    #[test]
    fn shadow_frustum_contains_the_origin() {
        let mut light = DirectionalLight::new(Color::WHITE, 1.0);
        light.position = Vec3::new(-3.0, 5.0, 1.0);
        let clip = light.light_view_projection() * Vec3::ZERO.extend(1.0);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn overhead_light_still_has_a_valid_frustum() {
        let mut light = DirectionalLight::new(Color::WHITE, 1.0);
        light.position = Vec3::new(0.0, 10.0, 0.0);
        let matrix = light.light_view_projection();
        assert!(!matrix.is_nan());
    }
}
