//! Views: markup trees, suspension, and visibility-deferred mounting.
//!
//! # Invariants
//! - A deferred component renders its placeholder until its gate latches,
//!   and its content (through a suspense boundary) afterwards. Never both.
//! - Components never handle view failures; the suspense boundary does.
//! - Rendering is pure: it reads component state and produces a `Node`.

mod html;
mod mount;
mod node;
mod resource;
mod section;
mod suspense;
mod view;

pub use html::{HtmlRenderer, MarkupRenderer};
pub use mount::{DeferOptions, DeferredMount, deferred, default_placeholder};
pub use node::{Element, Node};
pub use resource::{LazyView, Resource, ResourceState};
pub use section::{DeferredSection, SectionOptions};
pub use suspense::{Suspense, SuspenseBoundary};
pub use view::{Render, View, ViewError, ViewFn, view_fn};

pub fn crate_info() -> &'static str {
    "lazyview-view v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("view"));
    }
}
