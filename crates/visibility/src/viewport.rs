use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use lazyview_common::{ElementId, Rect, Threshold};

use crate::observer::{Inbox, ObserveOptions, Subscription, VisibilityEvent, VisibilityObserver};

struct Observation {
    target: ElementId,
    options: ObserveOptions,
    inbox: Inbox,
    last: Option<bool>,
}

#[derive(Default)]
struct Registry {
    root: Rect,
    layout: HashMap<ElementId, Rect>,
    observations: BTreeMap<u64, Observation>,
    next_key: u64,
}

/// Geometric visibility observer.
///
/// The host describes the scroll viewport (`set_root`) and element layout
/// (`set_target_rect`), then calls `flush()` once per frame. Each
/// observation is measured against the root expanded by its own margin.
/// Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct ViewportObserver {
    inner: Rc<RefCell<Registry>>,
}

impl ViewportObserver {
    pub fn new(root: Rect) -> Self {
        let observer = Self::default();
        observer.set_root(root);
        observer
    }

    pub fn set_root(&self, root: Rect) {
        self.inner.borrow_mut().root = root;
    }

    pub fn root(&self) -> Rect {
        self.inner.borrow().root
    }

    /// Move the root vertically, as a page scroll does.
    pub fn scroll_by(&self, dy: f32) {
        let mut reg = self.inner.borrow_mut();
        reg.root = reg.root.translate(0.0, dy);
    }

    pub fn set_target_rect(&self, target: ElementId, rect: Rect) {
        self.inner.borrow_mut().layout.insert(target, rect);
    }

    pub fn remove_target(&self, target: ElementId) {
        self.inner.borrow_mut().layout.remove(&target);
    }

    /// Number of live observations.
    pub fn observed_count(&self) -> usize {
        self.inner.borrow().observations.len()
    }

    /// Measure every observation and enqueue an event for each one whose
    /// intersecting state changed. The first measurement always reports.
    /// Returns how many events were delivered.
    pub fn flush(&self) -> usize {
        let _span = tracing::info_span!("visibility_flush").entered();
        let mut reg = self.inner.borrow_mut();
        let Registry {
            root,
            layout,
            observations,
            ..
        } = &mut *reg;

        let mut delivered = 0;
        let mut finished = Vec::new();

        for (key, obs) in observations.iter_mut() {
            let expanded = obs.options.root_margin.expand(root);
            let (is_intersecting, ratio) = match layout.get(&obs.target) {
                Some(rect) => measure(&expanded, rect, obs.options.threshold),
                None => (false, 0.0),
            };

            if obs.last == Some(is_intersecting) {
                continue;
            }
            obs.last = Some(is_intersecting);
            obs.inbox.borrow_mut().push_back(VisibilityEvent {
                target: obs.target,
                is_intersecting,
                ratio,
            });
            delivered += 1;

            if is_intersecting && obs.options.once {
                finished.push(*key);
            }
        }

        for key in finished {
            if let Some(obs) = observations.remove(&key) {
                tracing::debug!(target_id = %obs.target.short(), "trigger-once observation complete");
            }
        }

        tracing::trace!(delivered, live = observations.len(), "visibility flush complete");
        delivered
    }
}

impl VisibilityObserver for ViewportObserver {
    fn observe(&self, target: ElementId, options: ObserveOptions) -> Subscription {
        let inbox = Inbox::default();
        let key = {
            let mut reg = self.inner.borrow_mut();
            let key = reg.next_key;
            reg.next_key += 1;
            reg.observations.insert(
                key,
                Observation {
                    target,
                    options,
                    inbox: inbox.clone(),
                    last: None,
                },
            );
            key
        };
        tracing::debug!(
            target_id = %target.short(),
            threshold = options.threshold.value(),
            margin = %options.root_margin,
            "observing element"
        );

        let registry: Weak<RefCell<Registry>> = Rc::downgrade(&self.inner);
        Subscription::new(target, inbox, move || {
            if let Some(reg) = registry.upgrade() {
                if let Ok(mut reg) = reg.try_borrow_mut() {
                    if reg.observations.remove(&key).is_some() {
                        tracing::debug!(target_id = %target.short(), "observation released");
                    }
                }
            }
        })
    }
}

/// Intersecting state and visible ratio of `target` within `root`.
///
/// A zero threshold accepts any inclusive overlap, including an edge touch.
/// Zero-area targets that overlap count as fully visible.
fn measure(root: &Rect, target: &Rect, threshold: Threshold) -> (bool, f32) {
    let Some(overlap) = target.intersection(root) else {
        return (false, 0.0);
    };
    let area = target.area();
    let ratio = if area > 0.0 {
        (overlap.area() / area).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let is_intersecting = threshold.is_any() || ratio >= threshold.value();
    (is_intersecting, ratio)
}
