use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use lazyview_common::ElementId;

use crate::observer::{Inbox, ObserveOptions, Subscription, VisibilityEvent, VisibilityObserver};

#[derive(Default)]
struct Targets {
    subscribers: BTreeMap<u64, (ElementId, ObserveOptions, Inbox)>,
    next_key: u64,
}

/// Observer driven by hand: the caller decides when a target enters or
/// leaves. Useful wherever no layout exists, tests in particular.
#[derive(Clone, Default)]
pub struct ManualObserver {
    inner: Rc<RefCell<Targets>>,
}

impl ManualObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every live subscriber of `target`. Trigger-once
    /// subscribers are dropped after an intersecting event.
    /// Returns the number of inboxes reached.
    pub fn emit(&self, target: ElementId, is_intersecting: bool) -> usize {
        let mut inner = self.inner.borrow_mut();
        let mut reached = 0;
        inner.subscribers.retain(|_, (id, options, inbox)| {
            if *id != target {
                return true;
            }
            inbox.borrow_mut().push_back(VisibilityEvent {
                target,
                is_intersecting,
                ratio: if is_intersecting { 1.0 } else { 0.0 },
            });
            reached += 1;
            !(is_intersecting && options.once)
        });
        reached
    }

    pub fn is_observing(&self, target: ElementId) -> bool {
        self.inner
            .borrow()
            .subscribers
            .values()
            .any(|(id, _, _)| *id == target)
    }

    pub fn observed_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl VisibilityObserver for ManualObserver {
    fn observe(&self, target: ElementId, options: ObserveOptions) -> Subscription {
        let inbox = Inbox::default();
        let key = {
            let mut inner = self.inner.borrow_mut();
            let key = inner.next_key;
            inner.next_key += 1;
            inner.subscribers.insert(key, (target, options, inbox.clone()));
            key
        };
        let targets = Rc::downgrade(&self.inner);
        Subscription::new(target, inbox, move || {
            if let Some(targets) = targets.upgrade() {
                if let Ok(mut targets) = targets.try_borrow_mut() {
                    targets.subscribers.remove(&key);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_reaches_only_matching_target() {
        let obs = ManualObserver::new();
        let a = ElementId::new();
        let b = ElementId::new();
        let sub_a = obs.observe(a, ObserveOptions::default());
        let sub_b = obs.observe(b, ObserveOptions::default());

        assert_eq!(obs.emit(a, false), 1);
        assert_eq!(sub_a.pending(), 1);
        assert_eq!(sub_b.pending(), 0);
    }

    #[test]
    fn once_subscriber_dropped_after_intersecting() {
        let obs = ManualObserver::new();
        let a = ElementId::new();
        let sub = obs.observe(a, ObserveOptions::default());

        obs.emit(a, true);
        assert!(!obs.is_observing(a));
        assert_eq!(obs.emit(a, true), 0);
        assert_eq!(sub.pending(), 1);
    }

    #[test]
    fn drop_unregisters() {
        let obs = ManualObserver::new();
        let a = ElementId::new();
        let sub = obs.observe(a, ObserveOptions::default());
        assert!(obs.is_observing(a));
        drop(sub);
        assert_eq!(obs.observed_count(), 0);
    }
}
