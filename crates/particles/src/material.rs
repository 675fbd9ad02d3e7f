use serde::{Deserialize, Serialize};

/// How overlapping fragments combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blending {
    Normal,
    /// Colours are summed, so dense regions brighten.
    #[default]
    Additive,
}

/// Appearance of every point in a cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsMaterial {
    /// World-space size when attenuated, pixels otherwise.
    pub size: f32,
    /// Shrink points with distance from the camera.
    pub size_attenuation: bool,
    pub color: [f32; 3],
    pub opacity: f32,
    pub blending: Blending,
    /// Points never write depth, so they never occlude one another.
    pub depth_write: bool,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            size: 0.05,
            size_attenuation: true,
            color: [0.55, 0.7, 1.0],
            opacity: 0.8,
            blending: Blending::Additive,
            depth_write: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_particle_look() {
        let m = PointsMaterial::default();
        assert_eq!(m.blending, Blending::Additive);
        assert!(m.size_attenuation);
        assert!(!m.depth_write);
        assert!(m.size > 0.0 && m.size < 1.0);
    }
}
