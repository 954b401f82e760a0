use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera with a world-space pose.
///
/// `fov` is the vertical field of view in degrees. Orientation is stored as a
/// quaternion so that the orbit controller can rebuild it with [`look_at`].
///
/// [`look_at`]: PerspectiveCamera::look_at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub rotation: Quat,
    pub up: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            up: Vec3::Y,
        }
    }

    /// Rotates the camera so that it faces `target`.
    ///
    /// A target at the camera position is ignored. Looking exactly along the
    /// up axis nudges the view direction slightly off it so a basis exists.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() == 0.0 {
            return;
        }
        let mut forward = forward.normalize();
        let mut right = forward.cross(self.up);
        if right.length_squared() == 0.0 {
            if self.up.z.abs() == 1.0 {
                forward.x += 1e-4;
            } else {
                forward.z += 1e-4;
            }
            forward = forward.normalize();
            right = forward.cross(self.up);
        }
        let right = right.normalize();
        let up = right.cross(forward);
        // The camera looks down its local -Z axis.
        let basis = Mat3::from_cols(right, up, -forward);
        self.rotation = Quat::from_mat3(&basis).normalize();
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up_vector(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Camera-to-world transform.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect.max(0.01),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_points_forward_at_target() {
        let mut camera = PerspectiveCamera::new(60.0, 1.5, 0.1, 1000.0);
        camera.position = Vec3::new(-3.0, 3.0, 7.0);
        let target = Vec3::new(0.0, 1.0, 0.0);
        camera.look_at(target);
        let expected = (target - camera.position).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-5));
        assert!(camera.right().y.abs() < 1e-5);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let mut camera = PerspectiveCamera::new(60.0, 16.0 / 9.0, 0.1, 1000.0);
        camera.position = Vec3::new(4.0, 2.0, -5.0);
        camera.look_at(Vec3::ZERO);
        let clip = camera.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn looking_straight_down_still_faces_target() {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 1000.0);
        camera.position = Vec3::new(0.0, 5.0, 0.0);
        camera.look_at(Vec3::ZERO);
        assert!(camera.rotation.is_finite());
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Y, 1e-3));
    }

    #[test]
    fn nearly_vertical_look_at_is_exact() {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 1000.0);
        camera.position = Vec3::new(0.0, 10.0, 1e-5);
        camera.look_at(Vec3::ZERO);
        let expected = (Vec3::ZERO - camera.position).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn target_at_camera_position_is_ignored() {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 1000.0);
        camera.position = Vec3::new(1.0, 2.0, 3.0);
        camera.look_at(camera.position);
        assert_eq!(camera.rotation, Quat::IDENTITY);
    }
}
