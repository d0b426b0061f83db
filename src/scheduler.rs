//! Display-synchronized frame loop.
//!
//! The platform refresh primitive (`requestAnimationFrame`, winit's
//! `request_redraw`) hides behind [`FrameClock`]. [`FrameScheduler`] owns the
//! start/stop lifecycle on top of it: the host forwards each platform
//! callback to [`FrameScheduler::fire`], which re-arms the clock and runs the
//! tick.
//!
//! ```ignore
//! let mut scheduler = FrameScheduler::new(clock);
//! scheduler.start(move |frame| backdrop.borrow_mut().tick(frame))?;
//!
//! // inside the platform callback
//! scheduler.fire(now_ms);
//!
//! // on teardown
//! scheduler.stop();
//! ```

use crate::error::SchedulerError;
use std::fmt;
use tracing::debug;

/// Timing passed to every tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    /// Ticks since the scheduler was created, starting at 1.
    pub frame: u64,
    /// Monotonic milliseconds supplied by the host.
    pub now_ms: f64,
}

/// Platform primitive that calls back once on the next display refresh.
pub trait FrameClock {
    /// Identifies one outstanding request.
    type Handle: Copy + fmt::Debug;

    /// Ask for one callback on the next refresh.
    fn request_frame(&mut self) -> Self::Handle;

    /// Withdraw a request. Cancelling an already-delivered handle is harmless.
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Start/stop lifecycle around a [`FrameClock`].
pub struct FrameScheduler<C: FrameClock> {
    clock: C,
    tick: Option<Box<dyn FnMut(FrameInfo)>>,
    pending: Option<C::Handle>,
    frame: u64,
}

impl<C: FrameClock> FrameScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            tick: None,
            pending: None,
            frame: 0,
        }
    }

    /// Begin invoking `tick` once per refresh.
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] if a loop is active; the
    /// running tick is left untouched.
    pub fn start<F>(&mut self, tick: F) -> Result<(), SchedulerError>
    where
        F: FnMut(FrameInfo) + 'static,
    {
        if self.tick.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        self.tick = Some(Box::new(tick));
        self.pending = Some(self.clock.request_frame());
        debug!(frame = self.frame, "frame loop started");
        Ok(())
    }

    /// Cancel the outstanding request and drop the tick.
    ///
    /// Idempotent. Once this returns, [`fire`](Self::fire) never runs the
    /// old tick again, even if the platform still delivers a callback.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.clock.cancel_frame(handle);
        }
        if self.tick.take().is_some() {
            debug!(frame = self.frame, "frame loop stopped");
        }
    }

    /// Handle a platform callback: re-arm, then run the tick.
    ///
    /// Returns `false` (and does nothing) when no frame was pending, which
    /// covers callbacks arriving after [`stop`](Self::stop).
    pub fn fire(&mut self, now_ms: f64) -> bool {
        let Some(tick) = self.tick.as_mut() else {
            return false;
        };
        if self.pending.take().is_none() {
            return false;
        }
        self.pending = Some(self.clock.request_frame());
        self.frame += 1;
        tick(FrameInfo {
            frame: self.frame,
            now_ms,
        });
        true
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.tick.is_some()
    }

    /// Number of ticks run so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

impl<C: FrameClock> Drop for FrameScheduler<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<C: FrameClock + fmt::Debug> fmt::Debug for FrameScheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("clock", &self.clock)
            .field("running", &self.is_running())
            .field("pending", &self.pending)
            .field("frame", &self.frame)
            .finish()
    }
}

/// Latest-value mailbox with a pending flag.
///
/// Input handlers `push` on every event; the frame `take`s once. `push`
/// reports `true` only for the first value since the last `take`, so a
/// host that is not already looping schedules at most one frame per burst.
#[derive(Debug, Clone, Default)]
pub struct Coalescer<T> {
    latest: Option<T>,
}

impl<T> Coalescer<T> {
    pub fn new() -> Self {
        Self { latest: None }
    }

    /// Store `value`, replacing any unconsumed one.
    pub fn push(&mut self, value: T) -> bool {
        self.latest.replace(value).is_none()
    }

    pub fn take(&mut self) -> Option<T> {
        self.latest.take()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct ManualClock {
        next: u32,
        requested: Vec<u32>,
        cancelled: Vec<u32>,
    }

    impl FrameClock for ManualClock {
        type Handle = u32;

        fn request_frame(&mut self) -> u32 {
            self.next += 1;
            self.requested.push(self.next);
            self.next
        }

        fn cancel_frame(&mut self, handle: u32) {
            self.cancelled.push(handle);
        }
    }

    fn counting_tick() -> (Rc<RefCell<Vec<FrameInfo>>>, impl FnMut(FrameInfo) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |info| sink.borrow_mut().push(info))
    }

    #[test]
    fn test_fire_runs_tick_and_rearms() {
        let mut scheduler = FrameScheduler::new(ManualClock::default());
        let (seen, tick) = counting_tick();
        scheduler.start(tick).unwrap();
        assert_eq!(scheduler.clock().requested, vec![1]);

        assert!(scheduler.fire(16.0));
        assert!(scheduler.fire(33.0));

        assert_eq!(scheduler.clock().requested, vec![1, 2, 3]);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], FrameInfo { frame: 1, now_ms: 16.0 });
        assert_eq!(seen[1].frame, 2);
    }

    #[test]
    fn test_no_tick_after_stop() {
        let mut scheduler = FrameScheduler::new(ManualClock::default());
        let (seen, tick) = counting_tick();
        scheduler.start(tick).unwrap();
        scheduler.fire(16.0);
        scheduler.stop();

        // a late platform callback must not reach the tick
        assert!(!scheduler.fire(33.0));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(scheduler.clock().cancelled, vec![2]);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut scheduler = FrameScheduler::new(ManualClock::default());
        scheduler.stop();
        scheduler.start(|_| {}).unwrap();
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.clock().cancelled, vec![1]);
    }

    #[test]
    fn test_nested_start_rejected() {
        let mut scheduler = FrameScheduler::new(ManualClock::default());
        let (seen, tick) = counting_tick();
        scheduler.start(tick).unwrap();
        assert_eq!(
            scheduler.start(|_| panic!("replacement tick must not run")),
            Err(SchedulerError::AlreadyRunning)
        );
        scheduler.fire(1.0);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(scheduler.clock().requested.len(), 2);
    }

    #[test]
    fn test_restart_keeps_frame_count() {
        let mut scheduler = FrameScheduler::new(ManualClock::default());
        scheduler.start(|_| {}).unwrap();
        scheduler.fire(0.0);
        scheduler.fire(0.0);
        scheduler.stop();

        let (seen, tick) = counting_tick();
        scheduler.start(tick).unwrap();
        scheduler.fire(50.0);
        assert_eq!(seen.borrow()[0].frame, 3);
    }

    #[test]
    fn test_drop_cancels_pending() {
        let clock = Rc::new(RefCell::new(Vec::new()));

        struct SharedClock(Rc<RefCell<Vec<u8>>>);
        impl FrameClock for SharedClock {
            type Handle = u8;
            fn request_frame(&mut self) -> u8 {
                7
            }
            fn cancel_frame(&mut self, handle: u8) {
                self.0.borrow_mut().push(handle);
            }
        }

        {
            let mut scheduler = FrameScheduler::new(SharedClock(clock.clone()));
            scheduler.start(|_| {}).unwrap();
        }
        assert_eq!(*clock.borrow(), vec![7]);
    }

    #[test]
    fn test_coalescer_pending_flag() {
        let mut scroll = Coalescer::new();
        assert!(scroll.push(10.0));
        assert!(!scroll.push(20.0));
        assert!(!scroll.push(30.0));
        assert!(scroll.is_pending());
        assert_eq!(scroll.take(), Some(30.0));
        assert_eq!(scroll.take(), None);
        assert!(scroll.push(40.0));
    }
}
