use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use lazyview_common::{ElementId, RootMargin, Threshold};
use serde::{Deserialize, Serialize};

/// Options for a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserveOptions {
    /// Fraction of the target that must be inside the expanded root.
    pub threshold: Threshold,
    /// Margin applied to the root before intersecting.
    pub root_margin: RootMargin,
    /// Stop observing after the first intersecting event.
    pub once: bool,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            root_margin: RootMargin::ZERO,
            once: true,
        }
    }
}

/// Delivered when a target's intersecting state changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEvent {
    pub target: ElementId,
    pub is_intersecting: bool,
    /// Visible fraction of the target, in `[0, 1]`.
    pub ratio: f32,
}

pub type Inbox = Rc<RefCell<VecDeque<VisibilityEvent>>>;

/// Host capability that reports visibility changes for observed elements.
///
/// Implementations may detect changes at any time but must only enqueue
/// them into the subscription's inbox.
pub trait VisibilityObserver {
    fn observe(&self, target: ElementId, options: ObserveOptions) -> Subscription;
}

/// Live observation handle. Dropping it releases the observation.
pub struct Subscription {
    target: ElementId,
    inbox: Inbox,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(target: ElementId, inbox: Inbox, release: impl FnOnce() + 'static) -> Self {
        Self {
            target,
            inbox,
            release: Some(Box::new(release)),
        }
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    /// Take every event delivered since the last drain, oldest first.
    pub fn drain(&self) -> Vec<VisibilityEvent> {
        self.inbox.borrow_mut().drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.inbox.borrow().len()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("target", &self.target)
            .field("pending", &self.pending())
            .finish()
    }
}
