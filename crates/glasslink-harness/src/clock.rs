//! Virtual time for deterministic timer tests.

use std::time::Duration;

use glasslink_core::{Timer, TimerId, WallClock, WallTime};

/// Virtual timer queue implementing the [`Timer`] capability.
///
/// Tests drive time explicitly: schedule through the session as usual,
/// then repeatedly take due fires with [`SimTimers::pop_due`] and feed
/// them back into `DisplaySession::handle_timer`. Fires the session
/// schedules while handling earlier fires land in the same queue, so
/// autorepeat chains play out exactly.
#[derive(Debug, Default)]
pub struct SimTimers {
    now: Duration,
    pending: Vec<(TimerId, Duration)>,
}

impl SimTimers {
    /// Create a clock at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Whether a timer id is currently scheduled.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|(pending_id, _)| *pending_id == id)
    }

    /// Deadline of a pending timer.
    #[must_use]
    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.pending.iter().find(|(pending_id, _)| *pending_id == id).map(|(_, at)| *at)
    }

    /// Remove and return the earliest pending fire with a deadline at or
    /// before `until`, advancing virtual time to that deadline. Returns
    /// `None` (and advances to `until`) when nothing is due.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        let earliest = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, at))| *at <= until)
            .min_by_key(|(_, (_, at))| *at)
            .map(|(i, _)| i);
        match earliest {
            Some(slot) => {
                let (id, at) = self.pending.remove(slot);
                self.now = at;
                Some(id)
            }
            None => {
                self.now = until;
                None
            }
        }
    }
}

impl Timer for SimTimers {
    fn schedule_once(&mut self, id: TimerId, delay: Duration) {
        // re-scheduling replaces the pending deadline
        self.pending.retain(|(pending_id, _)| *pending_id != id);
        self.pending.push((id, self.now + delay));
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(pending_id, _)| *pending_id != id);
    }
}

/// Wall clock frozen at a configurable reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    /// The reading handed to the session
    pub wall: WallTime,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self {
            wall: WallTime {
                unix_seconds: 1_700_000_000,
                utc_offset_millis: 3_600_000,
                uses_daylight_time: false,
            },
        }
    }
}

impl FixedClock {
    /// Create a clock with the default reading.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WallClock for FixedClock {
    fn now(&self) -> WallTime {
        self.wall
    }
}
