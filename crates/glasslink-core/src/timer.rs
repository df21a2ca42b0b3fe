//! Timer and wall-clock capabilities.
//!
//! The session never owns a thread. One-shot timers are scheduled through
//! the injected [`Timer`]; when one fires, the runtime re-enters the single
//! processing context via `DisplaySession::handle_timer`. State is never
//! mutated from a timer thread.
//!
//! Cancellation is explicit: a pending timer is removed exactly when its
//! triggering condition disappears (pointer up, a real move past the
//! micro-move threshold, session reset), never as a side effect of
//! unrelated widget mutation.

use std::time::Duration;

/// The two one-shot timers the protocol needs. Both are global: at most one
/// autorepeat chain and one pending long-touch exist system-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Long-touch recognition delay
    LongTouch,
    /// Next autorepeat fire
    Autorepeat,
}

/// One-shot timer scheduling capability.
///
/// Scheduling an id that is already pending replaces the earlier deadline.
/// Cancelling an id that is not pending is a no-op.
pub trait Timer {
    /// Arrange for `DisplaySession::handle_timer(id)` after `delay`.
    fn schedule_once(&mut self, id: TimerId, delay: Duration);

    /// Remove a pending timer, if any.
    fn cancel(&mut self, id: TimerId);
}

/// A host wall-clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    /// Seconds since the UNIX epoch, UTC
    pub unix_seconds: u32,
    /// Offset of local time from UTC in milliseconds, DST included
    pub utc_offset_millis: i32,
    /// Whether the local timezone observes daylight saving time
    pub uses_daylight_time: bool,
}

/// Wall-clock capability for time query results.
pub trait WallClock {
    /// Current host time.
    fn now(&self) -> WallTime;
}
