//! wgpu render backend for the particle field.
//!
//! Each point is drawn as an instanced, screen-aligned quad so the point
//! size can follow the material (and shrink with distance) on every backend.
//!
//! # Invariants
//! - The renderer never mutates the scene; it only reads it each frame.
//! - Point positions are uploaded only when the scene's position array
//!   changes identity, never per frame.
//! - Blending and depth writes are fixed per pipeline, taken from the
//!   material it was built for.

mod context;
mod gpu;
mod shaders;

pub use context::GpuContext;
pub use gpu::PointCloudRenderer;

/// Errors from setting up the GPU.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

pub fn crate_info() -> &'static str {
    "lazyview-particles-wgpu v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("wgpu"));
    }

    #[test]
    fn missing_adapter_message() {
        assert_eq!(
            RendererError::NoAdapter.to_string(),
            "no compatible GPU adapter found"
        );
    }
}
