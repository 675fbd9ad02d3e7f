//! Visibility: viewport intersection observation and one-shot latching.
//!
//! # Invariants
//! - `Visibility` only ever moves `NotVisible -> Visible`.
//! - Observer callbacks only enqueue events; state changes happen when the
//!   owning component calls `update()` from the host's update cycle.
//! - Dropping a `Subscription` stops observation; no event is delivered to a
//!   released inbox.

mod gate;
mod manual;
mod observer;
mod state;
mod viewport;

pub use gate::VisibilityGate;
pub use manual::ManualObserver;
pub use observer::{Inbox, ObserveOptions, Subscription, VisibilityEvent, VisibilityObserver};
pub use state::Visibility;
pub use viewport::ViewportObserver;

pub fn crate_info() -> &'static str {
    "lazyview-visibility v0.1.0"
}
