//! Shared value types for the lazyview crates.
//!
//! # Invariants
//! - A `Threshold` is always within `[0, 1]`.
//! - A `RootMargin` always holds four resolved sides (top, right, bottom, left).

mod margin;
mod types;

pub use margin::{CssLength, Insets, RootMargin};
pub use types::{ElementId, Rect, Threshold};

/// Errors from parsing or validating shared value types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommonError {
    #[error("threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f32),
    #[error("invalid CSS length {input:?}: {reason}")]
    InvalidLength { input: String, reason: String },
    #[error("invalid root margin {input:?}: {reason}")]
    InvalidMargin { input: String, reason: String },
}

pub fn crate_info() -> &'static str {
    "lazyview-common v0.1.0"
}
