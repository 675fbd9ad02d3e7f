use std::sync::Arc;

use glam::{EulerRot, Mat4, Vec3};

use crate::camera::FixedCamera;
use crate::material::PointsMaterial;

/// Independently positioned points sharing one material.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    /// Flattened x, y, z triples.
    pub positions: Arc<[f32]>,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    pub material: PointsMaterial,
    pub frustum_culled: bool,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.len() < 3
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Positions as `[x, y, z]` triples.
    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.positions.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }
}

/// Renderable fragment: a fixed camera looking at one point cloud, sized to
/// its container.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleScene {
    pub camera: FixedCamera,
    pub width: u32,
    pub height: u32,
    pub cloud: PointCloud,
}

impl ParticleScene {
    pub fn new(camera: FixedCamera, width: u32, height: u32, cloud: PointCloud) -> Self {
        Self {
            camera,
            width: width.max(1),
            height: height.max(1),
            cloud,
        }
    }

    /// Follow the container. The camera itself does not change.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn view_projection(&self) -> Mat4 {
        self.camera.view_projection(self.aspect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldConfig, ParticleField};
    use crate::frame::FrameState;

    #[test]
    fn scene_carries_field_state() {
        let mut field = ParticleField::new(FieldConfig {
            count: 12,
            seed: Some(1),
            ..FieldConfig::default()
        });
        field.on_frame(&FrameState {
            elapsed: 2.0,
            delta: 0.0,
            frame: 0,
        });
        let scene = field.scene(1280, 720);

        assert_eq!(scene.cloud.len(), 12);
        assert_eq!(scene.cloud.points().count(), 12);
        assert!(!scene.cloud.frustum_culled);
        assert!((scene.aspect() - 1280.0 / 720.0).abs() < 1e-6);
        assert!((scene.cloud.rotation.x - 0.1).abs() < 1e-6);
        assert!(Arc::ptr_eq(&scene.cloud.positions, &field.positions()));
    }

    #[test]
    fn empty_cloud_renders_nothing() {
        let field = ParticleField::from_requested(0, FieldConfig::default());
        let scene = field.scene(0, 0);
        assert!(scene.cloud.is_empty());
        assert_eq!(scene.aspect(), 1.0);
    }

    #[test]
    fn resize_keeps_camera() {
        let field = ParticleField::from_requested(1, FieldConfig::default());
        let mut scene = field.scene(100, 100);
        let camera = scene.camera;
        scene.resize(400, 100);
        assert_eq!(scene.camera, camera);
        assert_eq!(scene.aspect(), 4.0);
    }

    #[test]
    fn model_matrix_rotates() {
        let cloud = PointCloud {
            positions: Arc::from(vec![0.0, 1.0, 0.0]),
            rotation: Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0),
            material: PointsMaterial::default(),
            frustum_culled: false,
        };
        let p = cloud.model_matrix().transform_point3(Vec3::Y);
        assert!((p - Vec3::Z).length() < 1e-5);
    }
}
