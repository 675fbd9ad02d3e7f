use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera that never moves. It looks down -Z from `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedCamera {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl FixedCamera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}
