//! Lock-wait instrumentation
//!
//! Both lock components record how often an acquisition had to wait and for
//! how long. A [`ContentionMeter`] accumulates atomically; [`WaitStats`] is
//! the snapshot handed to callers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Atomic accumulator for lock acquisitions
///
/// Records every acquisition, the subset that found the lock contended, and
/// the total time spent waiting. Uncontended acquisitions count a wait of
/// zero, so the average is over all acquisitions (not just contended ones).
#[derive(Debug, Default)]
pub struct ContentionMeter {
    acquisitions: AtomicU64,
    contended: AtomicU64,
    total_wait_nanos: AtomicU64,
}

impl ContentionMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one uncontended acquisition
    pub fn record_immediate(&self) {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one acquisition that had to wait
    pub fn record_contended(&self, waited: Duration) {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        self.contended.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(waited.as_nanos()).unwrap_or(u64::MAX);
        self.total_wait_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    /// Snapshot the counters
    pub fn snapshot(&self) -> WaitStats {
        WaitStats {
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            contended: self.contended.load(Ordering::Relaxed),
            total_wait: Duration::from_nanos(self.total_wait_nanos.load(Ordering::Relaxed)),
        }
    }
}

/// A point-in-time view of a [`ContentionMeter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitStats {
    /// Total acquisitions, contended or not
    pub acquisitions: u64,
    /// Acquisitions that found the lock held by another thread
    pub contended: u64,
    /// Accumulated wait time across all contended acquisitions
    pub total_wait: Duration,
}

impl WaitStats {
    /// Average wait per acquisition (zero when nothing was acquired)
    pub fn avg_wait(&self) -> Duration {
        if self.acquisitions == 0 {
            Duration::ZERO
        } else {
            self.total_wait / u32::try_from(self.acquisitions).unwrap_or(u32::MAX)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_meter_reports_zero() {
        let stats = ContentionMeter::new().snapshot();
        assert_eq!(stats.acquisitions, 0);
        assert_eq!(stats.contended, 0);
        assert_eq!(stats.avg_wait(), Duration::ZERO);
    }

    #[test]
    fn test_immediate_acquisitions_do_not_count_as_contended() {
        let meter = ContentionMeter::new();
        meter.record_immediate();
        meter.record_immediate();

        let stats = meter.snapshot();
        assert_eq!(stats.acquisitions, 2);
        assert_eq!(stats.contended, 0);
        assert_eq!(stats.total_wait, Duration::ZERO);
    }

    #[test]
    fn test_average_is_over_all_acquisitions() {
        let meter = ContentionMeter::new();
        meter.record_immediate();
        meter.record_contended(Duration::from_millis(10));

        let stats = meter.snapshot();
        assert_eq!(stats.acquisitions, 2);
        assert_eq!(stats.contended, 1);
        assert_eq!(stats.avg_wait(), Duration::from_millis(5));
    }
}
