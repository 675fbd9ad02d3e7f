use lazyview_common::ElementId;

use crate::observer::{ObserveOptions, Subscription, VisibilityObserver};
use crate::state::Visibility;

/// Visibility latch bound to one observed element.
///
/// Both deferred components own one of these. The gate subscribes on
/// `mount`, applies delivered events on `update`, and lets go of the
/// subscription as soon as it latches or the owner unmounts.
#[derive(Debug)]
pub struct VisibilityGate {
    element: ElementId,
    options: ObserveOptions,
    state: Visibility,
    subscription: Option<Subscription>,
}

impl VisibilityGate {
    pub fn new(options: ObserveOptions) -> Self {
        Self {
            element: ElementId::new(),
            options,
            state: Visibility::NotVisible,
            subscription: None,
        }
    }

    /// The element the host must lay out and report on.
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn options(&self) -> &ObserveOptions {
        &self.options
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    /// Start observing. No-op once latched or while already observing.
    pub fn mount(&mut self, observer: &dyn VisibilityObserver) {
        if self.state.is_visible() || self.subscription.is_some() {
            return;
        }
        self.subscription = Some(observer.observe(self.element, self.options));
    }

    /// Apply delivered events. Returns `true` exactly once, on the update
    /// that latches the gate.
    pub fn update(&mut self) -> bool {
        let Some(subscription) = &self.subscription else {
            return false;
        };
        let became_visible = subscription
            .drain()
            .iter()
            .any(|event| event.is_intersecting);

        if became_visible && self.state.latch() {
            self.subscription = None;
            tracing::debug!(element = %self.element.short(), "element became visible");
            return true;
        }
        false
    }

    /// Release the observation without changing the latch.
    pub fn unmount(&mut self) {
        self.subscription = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualObserver;

    #[test]
    fn latches_on_first_intersection() {
        let obs = ManualObserver::new();
        let mut gate = VisibilityGate::new(ObserveOptions::default());
        gate.mount(&obs);
        assert!(gate.is_observing());

        obs.emit(gate.element(), false);
        assert!(!gate.update());
        assert!(!gate.is_visible());

        obs.emit(gate.element(), true);
        assert!(gate.update());
        assert!(gate.is_visible());
        assert!(!gate.is_observing());
        assert!(!gate.update());
    }

    #[test]
    fn events_apply_only_on_update() {
        let obs = ManualObserver::new();
        let mut gate = VisibilityGate::new(ObserveOptions::default());
        gate.mount(&obs);
        obs.emit(gate.element(), true);
        assert!(!gate.is_visible());
        gate.update();
        assert!(gate.is_visible());
    }

    #[test]
    fn remount_after_latch_is_noop() {
        let obs = ManualObserver::new();
        let mut gate = VisibilityGate::new(ObserveOptions::default());
        gate.mount(&obs);
        obs.emit(gate.element(), true);
        gate.update();

        gate.mount(&obs);
        assert!(!gate.is_observing());
        assert_eq!(obs.observed_count(), 0);
    }

    #[test]
    fn unmount_releases_without_latching() {
        let obs = ManualObserver::new();
        let mut gate = VisibilityGate::new(ObserveOptions::default());
        gate.mount(&obs);
        gate.unmount();
        assert_eq!(obs.observed_count(), 0);
        assert_eq!(obs.emit(gate.element(), true), 0);
        assert!(!gate.update());
        assert!(!gate.is_visible());
    }

    #[test]
    fn double_mount_keeps_single_observation() {
        let obs = ManualObserver::new();
        let mut gate = VisibilityGate::new(ObserveOptions::default());
        gate.mount(&obs);
        gate.mount(&obs);
        assert_eq!(obs.observed_count(), 1);
    }
}
