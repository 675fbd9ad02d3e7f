//! Particle field: a rotating cloud of random points.
//!
//! # Invariants
//! - Positions are generated once per point count and shared by `Arc`.
//! - Rotation is a pure function of total elapsed time; nothing accumulates
//!   across frames.
//! - Per-frame work is limited to assigning the rotation.
//! - The camera is fixed for the life of a scene; only its aspect follows the
//!   container size.

mod camera;
mod field;
mod frame;
mod material;
mod scene;

pub use camera::FixedCamera;
pub use field::{FieldConfig, ParticleField, generate_positions, rotation_at};
pub use frame::{FrameClock, FrameLoop, FrameState, FrameSubscription};
pub use material::{Blending, PointsMaterial};
pub use scene::{ParticleScene, PointCloud};

/// Rotation rate about X, radians per second.
pub const ROTATION_RATE_X: f32 = 0.05;
/// Rotation rate about Y, radians per second.
pub const ROTATION_RATE_Y: f32 = 0.075;

pub fn crate_info() -> &'static str {
    "lazyview-particles v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("particles"));
    }
}
