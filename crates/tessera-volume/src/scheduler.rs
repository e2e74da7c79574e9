//! Rate gate for the change-tracking update tick.

use std::time::{Duration, Instant};

/// Default update frequency (Hz).
pub const DEFAULT_UPDATE_HZ: f64 = 30.0;

/// Lets the update tick run at most once per interval.
///
/// A frequency of zero (or anything non-finite or negative) disables the
/// scheduler; callers then regenerate meshes manually. So does a frequency
/// whose interval does not fit in a [`Duration`].
#[derive(Clone, Debug)]
pub struct UpdateScheduler {
    interval: Option<Duration>,
    last_tick: Option<Instant>,
    tick_count: u64,
}

impl UpdateScheduler {
    pub fn new(frequency_hz: f64) -> Self {
        Self {
            interval: interval_for(frequency_hz),
            last_tick: None,
            tick_count: 0,
        }
    }

    /// Returns `true` if ticks run at all.
    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Returns `true` if a tick is due at `now`. The first tick is due
    /// immediately.
    pub fn is_due(&self, now: Instant) -> bool {
        match (self.interval, self.last_tick) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
        }
    }

    /// Claims the tick at `now` if it is due.
    pub fn try_tick(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last_tick = Some(now);
        self.tick_count += 1;
        true
    }

    /// Number of ticks claimed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_HZ)
    }
}

fn interval_for(frequency_hz: f64) -> Option<Duration> {
    if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
        return None;
    }
    let interval = Duration::try_from_secs_f64(1.0 / frequency_hz).ok();
    if interval.is_none() {
        tracing::warn!(frequency_hz, "update frequency too low, change tracking disabled");
    }
    interval
}
