//! Counter record: event count plus the time of the last reset.
//!
//! # Responsibilities
//! - Count signal events with a single atomic add
//! - Zero the count and stamp the reset time as one logical reset
//! - Distinguish "never reset" from every real timestamp

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Raw value held in `last_reset` before the first reset.
const NOT_YET_RESET: i64 = i64::MIN;

/// Wall-clock time of a reset, in nanoseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct ResetTime(i64);

impl From<i64> for ResetTime {
    fn from(nanos: i64) -> Self {
        Self::from_nanos(nanos)
    }
}

impl From<ResetTime> for i64 {
    fn from(time: ResetTime) -> Self {
        time.0
    }
}

impl ResetTime {
    /// Current wall-clock time.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Convert a system time, saturating at the representable range.
    ///
    /// The result is never the "not yet reset" sentinel.
    pub fn from_system_time(time: SystemTime) -> Self {
        let nanos = match time.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_nanos())
                .map(|n| -n)
                .unwrap_or(i64::MIN),
        };
        Self(nanos.max(NOT_YET_RESET + 1))
    }

    /// Build from raw nanoseconds since the epoch.
    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos.max(NOT_YET_RESET + 1))
    }

    /// Nanoseconds since the UNIX epoch.
    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Back to a `SystemTime`.
    pub fn to_system_time(&self) -> SystemTime {
        let magnitude = Duration::from_nanos(self.0.unsigned_abs());
        if self.0 >= 0 {
            UNIX_EPOCH + magnitude
        } else {
            UNIX_EPOCH - magnitude
        }
    }
}

/// Answer to "when was the counter last reset?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastReset {
    /// A reset has happened; this is the most recent stamp.
    At(ResetTime),
    /// No reset has been issued since the service started.
    NotYetReset,
}

impl LastReset {
    pub fn time(&self) -> Option<ResetTime> {
        match self {
            LastReset::At(t) => Some(*t),
            LastReset::NotYetReset => None,
        }
    }
}

/// Outcome of a reset: when the new epoch began and what the old one counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch {
    /// Stamp recorded for this reset.
    pub started_at: ResetTime,
    /// Events counted by the epoch that was just closed.
    pub previous_count: u64,
}

/// Process-wide counter state, shared by the fast path and the control path.
#[derive(Debug)]
pub struct CounterRecord {
    count: AtomicU64,
    last_reset: AtomicI64,
}

impl CounterRecord {
    pub fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            last_reset: AtomicI64::new(NOT_YET_RESET),
        }
    }

    /// Count one event. Wraps on overflow.
    ///
    /// Safe to call from a signal handler: a single lock-free atomic add.
    #[inline]
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Current count.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    /// Zero the count and stamp the reset time with the wall clock.
    pub fn reset(&self) -> ResetTime {
        self.reset_at(ResetTime::now()).started_at
    }

    /// Zero the count and stamp the reset time with `now`.
    ///
    /// The stored stamp never moves backwards: if `now` is earlier than the
    /// previous stamp (wall clock stepped back), the previous stamp is kept.
    pub fn reset_at(&self, now: ResetTime) -> Epoch {
        let previous_stamp = self.last_reset.fetch_max(now.0, Ordering::AcqRel);
        let previous_count = self.count.swap(0, Ordering::AcqRel);
        Epoch {
            started_at: ResetTime(previous_stamp.max(now.0)),
            previous_count,
        }
    }

    /// Time of the most recent reset, if any.
    pub fn last_reset(&self) -> LastReset {
        match self.last_reset.load(Ordering::Acquire) {
            NOT_YET_RESET => LastReset::NotYetReset,
            nanos => LastReset::At(ResetTime(nanos)),
        }
    }
}

impl Default for CounterRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counts_every_increment() {
        let record = CounterRecord::new();
        for _ in 0..250 {
            record.increment();
        }
        assert_eq!(record.count(), 250);
    }

    #[test]
    fn never_reset_until_first_reset() {
        let record = CounterRecord::new();
        assert_eq!(record.last_reset(), LastReset::NotYetReset);

        record.increment();
        let stamp = record.reset();
        assert_eq!(record.count(), 0);
        assert_eq!(record.last_reset(), LastReset::At(stamp));
    }

    #[test]
    fn reset_reports_closed_epoch() {
        let record = CounterRecord::new();
        record.increment();
        record.increment();

        let epoch = record.reset_at(ResetTime::from_nanos(1_000));
        assert_eq!(epoch.previous_count, 2);
        assert_eq!(epoch.started_at, ResetTime::from_nanos(1_000));
    }

    #[test]
    fn stamp_does_not_move_backwards() {
        let record = CounterRecord::new();
        record.reset_at(ResetTime::from_nanos(5_000));
        let epoch = record.reset_at(ResetTime::from_nanos(4_000));

        assert_eq!(epoch.started_at, ResetTime::from_nanos(5_000));
        assert_eq!(record.last_reset(), LastReset::At(ResetTime::from_nanos(5_000)));
    }

    #[test]
    fn successive_resets_are_ordered() {
        let record = CounterRecord::new();
        let first = record.reset();
        let second = record.reset();
        assert!(second >= first);
    }

    #[test]
    fn pre_epoch_times_are_not_the_sentinel() {
        let stamp = ResetTime::from_system_time(UNIX_EPOCH - Duration::from_secs(10));
        assert_eq!(stamp.as_nanos(), -10_000_000_000);
        assert_eq!(stamp.to_system_time(), UNIX_EPOCH - Duration::from_secs(10));
        assert_ne!(ResetTime::from_nanos(i64::MIN).as_nanos(), i64::MIN);
    }

    #[test]
    fn deserialized_time_is_never_the_sentinel() {
        let stamp: ResetTime = serde_json::from_str(&i64::MIN.to_string()).unwrap();
        assert_eq!(stamp.as_nanos(), i64::MIN + 1);

        let stamp: ResetTime = serde_json::from_str("42").unwrap();
        assert_eq!(serde_json::to_string(&stamp).unwrap(), "42");
    }

    #[test]
    fn count_wraps_on_overflow() {
        let record = CounterRecord::new();
        record.count.store(u64::MAX, Ordering::Relaxed);
        record.increment();
        assert_eq!(record.count(), 0);
    }

    #[test]
    fn no_increment_lost_across_concurrent_resets() {
        let record = Arc::new(CounterRecord::new());
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let record = record.clone();
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        record.increment();
                    }
                })
            })
            .collect();

        let mut drained = 0;
        for i in 0..200 {
            drained += record.reset_at(ResetTime::from_nanos(i)).previous_count;
        }
        for w in writers {
            w.join().unwrap();
        }

        assert_eq!(drained + record.count(), 40_000);
    }
}
