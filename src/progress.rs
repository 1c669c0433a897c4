//! Progress reporting abstraction for crawl operations.
//!
//! The crawl emits a monotonically non-decreasing fraction in `[0, 1]` with
//! fixed checkpoints, plus one-off advisory notices. Reporting is an
//! observation interface only; implementations must not block the crawl.

use tracing::info;

/// Fraction reported once the keyword search has been issued.
pub const SEARCH_ISSUED: f64 = 0.2;

/// Fraction reported once the listing has been enumerated.
pub const LISTING_ENUMERATED: f64 = 0.3;

/// Fraction for `completed` of `total` items, interpolated linearly from the
/// enumeration checkpoint to 1.0.
pub fn item_fraction(completed: usize, total: usize) -> f64 {
    if total == 0 || completed >= total {
        return 1.0;
    }
    let done = completed as f64 / total as f64;
    LISTING_ENUMERATED + (1.0 - LISTING_ENUMERATED) * done
}

/// Receiver for crawl progress and advisories.
pub trait ProgressReporter: Send + Sync {
    /// Monotonically non-decreasing fraction in `[0, 1]`.
    fn report_progress(&self, fraction: f64);

    /// One-off user-visible notice (e.g. the item cap advisory).
    fn report_advisory(&self, message: &str);
}

/// Progress reporter that does nothing.
///
/// Used by the simple `crawl()` API; all methods are no-ops and inline away.
#[derive(Debug, Clone, Copy)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_progress(&self, _fraction: f64) {}

    #[inline(always)]
    fn report_advisory(&self, _message: &str) {}
}

/// Progress reporter backed by the tracing subscriber.
#[derive(Debug, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report_progress(&self, fraction: f64) {
        info!("progress: {:.0}%", fraction * 100.0);
    }

    fn report_advisory(&self, message: &str) {
        info!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoints_bracket_item_processing() {
        assert!(SEARCH_ISSUED < LISTING_ENUMERATED);
        assert_eq!(item_fraction(0, 10), LISTING_ENUMERATED);
        assert_eq!(item_fraction(10, 10), 1.0);
    }

    #[test]
    fn interpolation_is_monotonic() {
        let total = 37;
        let mut last = 0.0;
        for done in 0..=total {
            let f = item_fraction(done, total);
            assert!(f >= last, "fraction regressed at {done}");
            assert!((0.0..=1.0).contains(&f));
            last = f;
        }
    }

    #[test]
    fn empty_listing_jumps_to_done() {
        assert_eq!(item_fraction(0, 0), 1.0);
    }

    #[test]
    fn completed_is_clamped_to_total() {
        assert_eq!(item_fraction(12, 10), 1.0);
    }
}
