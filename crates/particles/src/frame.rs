use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;

/// Timing handed to every frame callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Seconds since the loop's clock started.
    pub elapsed: f32,
    /// Seconds since the previous tick, zero on the first.
    pub delta: f32,
    /// Tick counter, starting at zero.
    pub frame: u64,
}

type Callback = Rc<RefCell<dyn FnMut(&FrameState)>>;

#[derive(Default)]
struct Callbacks {
    entries: BTreeMap<u64, Callback>,
    next_key: u64,
    last_elapsed: Option<f32>,
    frame: u64,
}

/// Render-loop scheduler. The host calls `tick` once per display refresh;
/// every live subscriber runs in subscription order.
#[derive(Clone, Default)]
pub struct FrameLoop {
    inner: Rc<RefCell<Callbacks>>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl FnMut(&FrameState) + 'static) -> FrameSubscription {
        let mut inner = self.inner.borrow_mut();
        let key = inner.next_key;
        inner.next_key += 1;
        let callback: Callback = Rc::new(RefCell::new(callback));
        inner.entries.insert(key, callback);
        FrameSubscription {
            key,
            frames: Rc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Run one frame at `elapsed` seconds. Returns how many callbacks ran.
    ///
    /// Callbacks may drop subscriptions (their own or others') while the
    /// frame runs; a callback released mid-frame is skipped.
    pub fn tick(&self, elapsed: f32) -> usize {
        let (state, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let delta = inner
                .last_elapsed
                .map_or(0.0, |last| (elapsed - last).max(0.0));
            let state = FrameState {
                elapsed,
                delta,
                frame: inner.frame,
            };
            inner.last_elapsed = Some(elapsed);
            inner.frame += 1;
            let callbacks: Vec<(u64, Callback)> = inner
                .entries
                .iter()
                .map(|(k, cb)| (*k, Rc::clone(cb)))
                .collect();
            (state, callbacks)
        };

        let mut ran = 0;
        for (key, callback) in callbacks {
            if !self.inner.borrow().entries.contains_key(&key) {
                continue;
            }
            (&mut *callback.borrow_mut())(&state);
            ran += 1;
        }
        tracing::trace!(frame = state.frame, elapsed, ran, "frame tick");
        ran
    }
}

/// Live frame callback. Dropping it removes the callback from the loop.
pub struct FrameSubscription {
    key: u64,
    frames: Weak<RefCell<Callbacks>>,
}

impl Drop for FrameSubscription {
    fn drop(&mut self) {
        if let Some(frames) = self.frames.upgrade() {
            if let Ok(mut frames) = frames.try_borrow_mut() {
                frames.entries.remove(&self.key);
            }
        }
    }
}

impl fmt::Debug for FrameSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSubscription")
            .field("key", &self.key)
            .finish()
    }
}

/// Wall clock for the frame loop.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since `start`.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn tick_reports_elapsed_and_delta() {
        let frames = FrameLoop::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = frames.subscribe(move |s| sink.borrow_mut().push(*s));

        frames.tick(1.0);
        frames.tick(1.5);

        let seen = seen.borrow();
        assert_eq!(seen[0].delta, 0.0);
        assert_eq!(seen[1].elapsed, 1.5);
        assert_eq!(seen[1].delta, 0.5);
        assert_eq!(seen[1].frame, 1);
    }

    #[test]
    fn dropped_subscription_stops_callbacks() {
        let frames = FrameLoop::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sub = frames.subscribe(move |_| c.set(c.get() + 1));

        frames.tick(0.0);
        drop(sub);
        frames.tick(1.0);
        assert_eq!(count.get(), 1);
        assert_eq!(frames.subscriber_count(), 0);
    }

    #[test]
    fn callback_may_release_another_mid_frame() {
        let frames = FrameLoop::new();
        let victim_ran = Rc::new(Cell::new(false));
        let slot: Rc<RefCell<Option<FrameSubscription>>> = Rc::new(RefCell::new(None));

        let slot_for_killer = Rc::clone(&slot);
        let _killer = frames.subscribe(move |_| {
            slot_for_killer.borrow_mut().take();
        });
        let flag = Rc::clone(&victim_ran);
        *slot.borrow_mut() = Some(frames.subscribe(move |_| flag.set(true)));

        assert_eq!(frames.tick(0.0), 1);
        assert!(!victim_ran.get());
    }

    #[test]
    fn subscription_outlives_loop() {
        let frames = FrameLoop::new();
        let sub = frames.subscribe(|_| {});
        drop(frames);
        drop(sub);
    }

    #[test]
    fn clock_moves_forward() {
        let clock = FrameClock::start();
        assert!(clock.elapsed() >= 0.0);
    }
}
