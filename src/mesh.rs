use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;
use crate::material::LambertMaterial;

/// Static drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: LambertMaterial,
    pub position: Vec3,
    /// Intrinsic XYZ Euler angles in radians.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: LambertMaterial) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn plane_rotated_about_x_lies_flat() {
        let mut ground = Mesh::new(
            "ground",
            Geometry::plane(10.0, 10.0),
            LambertMaterial::new(Color::WHITE),
        );
        ground.rotation.x = (-90.0f32).to_radians();
        let normal = ground.model_matrix().transform_vector3(Vec3::Z);
        assert!(normal.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn model_matrix_translates() {
        let mut cube = Mesh::new(
            "box",
            Geometry::cuboid(2.0, 2.0, 2.0),
            LambertMaterial::default(),
        );
        cube.position = Vec3::new(0.0, 1.0, 0.0);
        let bottom = cube.model_matrix().transform_point3(Vec3::new(0.0, -1.0, 0.0));
        assert!(bottom.abs_diff_eq(Vec3::ZERO, 1e-6));
    }
}
