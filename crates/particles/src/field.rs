use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::camera::FixedCamera;
use crate::frame::{FrameLoop, FrameState, FrameSubscription};
use crate::material::PointsMaterial;
use crate::scene::{ParticleScene, PointCloud};
use crate::{ROTATION_RATE_X, ROTATION_RATE_Y};

/// Particle field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of points. Default 2000.
    pub count: usize,
    /// Half-width of the cube points are scattered in. Default 10.
    pub extent: f32,
    /// Fixed RNG seed for reproducible fields. `None` seeds from the OS.
    pub seed: Option<u64>,
    pub material: PointsMaterial,
    pub camera: FixedCamera,
    /// Cull the cloud against the view frustum. Off, so the field's edges
    /// never pop in.
    pub frustum_culled: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 2000,
            extent: 10.0,
            seed: None,
            material: PointsMaterial::default(),
            camera: FixedCamera::default(),
            frustum_culled: false,
        }
    }
}

/// Rotation of the field after `elapsed` seconds, in radians per axis.
pub fn rotation_at(elapsed: f32) -> Vec3 {
    Vec3::new(elapsed * ROTATION_RATE_X, elapsed * ROTATION_RATE_Y, 0.0)
}

/// `3 * count` coordinates, each uniform in `[-extent, extent]`, laid out
/// as consecutive x, y, z triples.
pub fn generate_positions(count: usize, extent: f32, rng: &mut impl Rng) -> Arc<[f32]> {
    let extent = extent.abs();
    (0..count * 3)
        .map(|_| rng.random_range(-extent..=extent))
        .collect()
}

/// A rotating cloud of random points.
///
/// Positions are memoised on the point count: asking for the same count
/// again hands back the same allocation.
#[derive(Debug)]
pub struct ParticleField {
    config: FieldConfig,
    rng: StdRng,
    count: usize,
    positions: Arc<[f32]>,
    rotation: Vec3,
}

impl ParticleField {
    pub fn new(config: FieldConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let count = config.count;
        let positions = generate_positions(count, config.extent, &mut rng);
        tracing::debug!(count, extent = config.extent, "generated particle positions");
        Self {
            config,
            rng,
            count,
            positions,
            rotation: Vec3::ZERO,
        }
    }

    /// Build a field for a possibly degenerate request. Zero or negative
    /// counts produce an empty field.
    pub fn from_requested(requested: i64, config: FieldConfig) -> Self {
        let count = usize::try_from(requested).unwrap_or(0);
        Self::new(FieldConfig { count, ..config })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// The memoised positions (`3 * count` floats).
    pub fn positions(&self) -> Arc<[f32]> {
        Arc::clone(&self.positions)
    }

    /// Request a point count. Regenerates only when it differs from the
    /// current one. Returns whether new positions were generated.
    pub fn set_count(&mut self, count: usize) -> bool {
        if count == self.count {
            return false;
        }
        self.positions = generate_positions(count, self.config.extent, &mut self.rng);
        tracing::debug!(from = self.count, to = count, "regenerated particle positions");
        self.count = count;
        self.config.count = count;
        true
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Per-frame hook: assign the rotation for the total elapsed time.
    pub fn on_frame(&mut self, frame: &FrameState) {
        self.rotation = rotation_at(frame.elapsed);
    }

    /// Drive a shared field from a frame loop. The callback holds a weak
    /// reference, so a dropped field is never touched; dropping the returned
    /// subscription stops the callback.
    pub fn attach(field: &Rc<RefCell<Self>>, frames: &FrameLoop) -> FrameSubscription {
        let weak: Weak<RefCell<Self>> = Rc::downgrade(field);
        frames.subscribe(move |frame| {
            if let Some(field) = weak.upgrade() {
                field.borrow_mut().on_frame(frame);
            }
        })
    }

    /// Scene fragment for a container of the given pixel size.
    pub fn scene(&self, width: u32, height: u32) -> ParticleScene {
        ParticleScene::new(
            self.config.camera,
            width,
            height,
            PointCloud {
                positions: self.positions(),
                rotation: self.rotation,
                material: self.config.material,
                frustum_culled: self.config.frustum_culled,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(count: usize) -> ParticleField {
        ParticleField::new(FieldConfig {
            count,
            seed: Some(42),
            ..FieldConfig::default()
        })
    }

    fn frame(elapsed: f32) -> FrameState {
        FrameState {
            elapsed,
            delta: 0.0,
            frame: 0,
        }
    }

    #[test]
    fn default_config() {
        let c = FieldConfig::default();
        assert_eq!(c.count, 2000);
        assert_eq!(c.extent, 10.0);
        assert!(!c.frustum_culled);
    }

    #[test]
    fn positions_length_and_range() {
        for count in [0, 1, 7, 2000] {
            let field = seeded(count);
            let p = field.positions();
            assert_eq!(p.len(), 3 * count);
            assert!(p.iter().all(|v| (-10.0..=10.0).contains(v)));
        }
    }

    #[test]
    fn positions_are_spread_across_the_cube() {
        let p = seeded(2000).positions();
        let min = p.iter().copied().fold(f32::INFINITY, f32::min);
        let max = p.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(min < -9.0 && max > 9.0);
        let mean: f32 = p.iter().sum::<f32>() / p.len() as f32;
        assert!(mean.abs() < 0.5);
    }

    #[test]
    fn same_count_is_referentially_stable() {
        let mut field = seeded(100);
        let a = field.positions();
        assert!(!field.set_count(100));
        field.on_frame(&frame(3.0));
        let b = field.positions();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn changed_count_regenerates() {
        let mut field = seeded(100);
        let a = field.positions();
        assert!(field.set_count(250));
        let b = field.positions();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.len(), 750);
        assert_eq!(field.count(), 250);
    }

    #[test]
    fn seeded_fields_are_reproducible() {
        assert_eq!(seeded(10).positions(), seeded(10).positions());
    }

    #[test]
    fn non_positive_request_is_empty() {
        for requested in [0, -1, i64::MIN] {
            let field = ParticleField::from_requested(requested, FieldConfig::default());
            assert_eq!(field.count(), 0);
            assert!(field.positions().is_empty());
        }
        assert_eq!(
            ParticleField::from_requested(5, FieldConfig::default()).count(),
            5
        );
    }

    #[test]
    fn rotation_is_pure_in_elapsed_time() {
        let r = rotation_at(10.0);
        assert!((r.x - 0.5).abs() < 1e-6);
        assert!((r.y - 0.75).abs() < 1e-6);
        assert_eq!(r.z, 0.0);

        // Many uneven frames land on the same value as a single jump.
        let mut stepped = seeded(1);
        let mut t = 0.0_f32;
        for dt in [0.016, 0.033, 0.1, 0.007, 0.25].iter().cycle().take(500) {
            t += dt;
            stepped.on_frame(&frame(t));
        }
        let mut jumped = seeded(1);
        jumped.on_frame(&frame(t));
        assert_eq!(stepped.rotation(), jumped.rotation());
        assert!((stepped.rotation().x - 0.05 * t).abs() < 1e-4);
        assert!((stepped.rotation().y - 0.075 * t).abs() < 1e-4);
    }

    #[test]
    fn rotation_resumes_from_any_time() {
        let mut field = seeded(1);
        field.on_frame(&frame(100.0));
        field.on_frame(&frame(2.0));
        assert_eq!(field.rotation(), rotation_at(2.0));
    }

    #[test]
    fn attach_follows_frame_loop_until_dropped() {
        let frames = FrameLoop::new();
        let field = Rc::new(RefCell::new(seeded(10)));
        let sub = ParticleField::attach(&field, &frames);

        frames.tick(4.0);
        assert_eq!(field.borrow().rotation(), rotation_at(4.0));

        drop(sub);
        frames.tick(8.0);
        assert_eq!(field.borrow().rotation(), rotation_at(4.0));
    }

    #[test]
    fn dropped_field_is_not_called() {
        let frames = FrameLoop::new();
        let field = Rc::new(RefCell::new(seeded(10)));
        let _sub = ParticleField::attach(&field, &frames);
        drop(field);
        assert_eq!(frames.tick(1.0), 1);
    }

    #[test]
    fn config_from_yaml() {
        let c: FieldConfig = serde_yaml::from_str("count: 64\nseed: 9\n").unwrap();
        assert_eq!(c.count, 64);
        assert_eq!(c.seed, Some(9));
        assert_eq!(c.extent, 10.0);
    }
}
