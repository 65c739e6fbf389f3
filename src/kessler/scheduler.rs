//! Tick scheduling for the cascade.
//!
//! The simulator itself only knows how to advance by a timestamp; a
//! [`TickScheduler`] decides when the next tick is due. At most one tick is
//! ever outstanding, and pausing or closing cancels it.

use rand::Rng;
use rand::rngs::StdRng;

use super::{CascadeState, DebrisCascade};
use crate::types::ControlError;

/// Identifies one requested tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

/// Source of "run the next tick now" signals.
pub trait TickScheduler {
    /// Ask for one tick after `now` (seconds).
    fn request_tick(&mut self, now: f64) -> TickHandle;

    /// Drop a requested tick. Unknown or already-fired handles are ignored.
    fn cancel_tick(&mut self, handle: TickHandle);

    /// Consume the outstanding tick if it is due at `now`.
    fn take_due(&mut self, now: f64) -> Option<TickHandle>;
}

/// Fires on the next frame after a request.
#[derive(Clone, Debug, Default)]
pub struct FrameScheduler {
    issued: u64,
    pending: Option<TickHandle>,
}

impl TickScheduler for FrameScheduler {
    fn request_tick(&mut self, _now: f64) -> TickHandle {
        self.issued += 1;
        let handle = TickHandle(self.issued);
        self.pending = Some(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn take_due(&mut self, _now: f64) -> Option<TickHandle> {
        self.pending.take()
    }
}

/// Fires once `period` seconds have passed since the request.
#[derive(Clone, Debug)]
pub struct IntervalScheduler {
    period: f64,
    issued: u64,
    pending: Option<(TickHandle, f64)>,
}

impl IntervalScheduler {
    pub fn new(period: f64) -> Self {
        Self {
            period,
            issued: 0,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl TickScheduler for IntervalScheduler {
    fn request_tick(&mut self, now: f64) -> TickHandle {
        self.issued += 1;
        let handle = TickHandle(self.issued);
        self.pending = Some((handle, now + self.period));
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if matches!(self.pending, Some((h, _)) if h == handle) {
            self.pending = None;
        }
    }

    fn take_due(&mut self, now: f64) -> Option<TickHandle> {
        match self.pending {
            Some((handle, due_at)) if now >= due_at => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}

/// A cascade paired with the scheduler that drives it.
///
/// Ticks are re-requested only while the cascade is running, so a paused or
/// terminated run schedules nothing.
pub struct CascadeRunner<S: TickScheduler, R: Rng = StdRng> {
    cascade: DebrisCascade<R>,
    scheduler: S,
    pending: Option<TickHandle>,
}

impl<S: TickScheduler, R: Rng> CascadeRunner<S, R> {
    pub fn new(cascade: DebrisCascade<R>, scheduler: S) -> Self {
        Self {
            cascade,
            scheduler,
            pending: None,
        }
    }

    pub fn cascade(&self) -> &DebrisCascade<R> {
        &self.cascade
    }

    /// A tick is outstanding.
    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    pub fn start(&mut self, now: f64) -> bool {
        let started = self.cascade.start(now);
        if started {
            self.arm(now);
        }
        started
    }

    pub fn pause(&mut self) -> bool {
        self.cancel();
        self.cascade.pause()
    }

    pub fn resume(&mut self, now: f64) -> bool {
        let resumed = self.cascade.resume(now);
        if resumed {
            self.arm(now);
        }
        resumed
    }

    pub fn restart(&mut self, now: f64) {
        self.cancel();
        self.cascade.restart(now);
        self.arm(now);
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), ControlError> {
        self.cascade.set_speed(speed)
    }

    /// Run the outstanding tick if the scheduler says it is due.
    ///
    /// Returns whether a tick ran.
    pub fn frame(&mut self, now: f64) -> bool {
        let Some(expected) = self.pending else {
            return false;
        };
        if self.scheduler.take_due(now) != Some(expected) {
            return false;
        }

        self.pending = None;
        self.cascade.tick(now);
        if self.cascade.state() == CascadeState::Running {
            self.arm(now);
        }
        true
    }

    /// Cancel any outstanding tick; the cascade keeps its state.
    pub fn close(&mut self) {
        self.cancel();
    }

    fn arm(&mut self, now: f64) {
        self.cancel();
        self.pending = Some(self.scheduler.request_tick(now));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
    }
}

impl<S: TickScheduler, R: Rng> Drop for CascadeRunner<S, R> {
    fn drop(&mut self) {
        self.cancel();
    }
}
