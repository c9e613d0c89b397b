// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import progress side channel.
//!
//! Importers report the number of processed lines against an estimated
//! total. Reporting is best effort and never influences the import result.

/// Receives progress updates from an import
pub trait ProgressObserver: Sync {
    /// Called with the processed line count and the current total estimate
    fn on_progress(&self, processed: u64, total: u64);
}

/// Observer that ignores all updates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    #[inline]
    fn on_progress(&self, _processed: u64, _total: u64) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(u64, u64) + Sync,
{
    #[inline]
    fn on_progress(&self, processed: u64, total: u64) {
        self(processed, total)
    }
}

/// Rate-limits progress updates to roughly one per percent of the estimate
pub struct ProgressTracker<'a> {
    observer: &'a dyn ProgressObserver,
    processed: u64,
    total: u64,
    step: u64,
    next_report: u64,
}

impl<'a> ProgressTracker<'a> {
    /// Create a tracker for an operation of `estimated_total` units
    pub fn new(observer: &'a dyn ProgressObserver, estimated_total: u64) -> Self {
        let step = (estimated_total / 100).max(1);
        Self {
            observer,
            processed: 0,
            total: estimated_total,
            step,
            next_report: step,
        }
    }

    /// Record `count` more processed units
    #[inline]
    pub fn advance(&mut self, count: u64) {
        self.processed += count;
        if self.processed >= self.next_report {
            // Estimates can be low; grow the total so reports stay monotonic
            self.total = self.total.max(self.processed);
            self.observer.on_progress(self.processed, self.total);
            self.next_report = self.processed + self.step;
        }
    }

    /// Emit a final report with processed == total
    pub fn finish(&mut self) {
        self.total = self.processed;
        self.observer.on_progress(self.processed, self.total);
    }

    /// Units processed so far
    #[inline]
    pub fn processed(&self) -> u64 {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_reports_are_bounded() {
        let reports = Mutex::new(Vec::new());
        let observer = |processed: u64, total: u64| {
            reports.lock().unwrap().push((processed, total));
        };
        let mut tracker = ProgressTracker::new(&observer, 10_000);
        for _ in 0..10_000 {
            tracker.advance(1);
        }
        tracker.finish();

        let reports = reports.into_inner().unwrap();
        assert!(reports.len() <= 102);
        assert_eq!(reports.last(), Some(&(10_000, 10_000)));
        assert!(reports.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_low_estimate_stays_monotonic() {
        let reports = Mutex::new(Vec::new());
        let observer = |processed: u64, total: u64| {
            reports.lock().unwrap().push((processed, total));
        };
        let mut tracker = ProgressTracker::new(&observer, 10);
        for _ in 0..50 {
            tracker.advance(1);
        }
        let reports = reports.into_inner().unwrap();
        assert!(reports.iter().all(|(processed, total)| processed <= total));
        assert!(reports.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_no_progress() {
        let mut tracker = ProgressTracker::new(&NoProgress, 0);
        tracker.advance(5);
        tracker.finish();
        assert_eq!(tracker.processed(), 5);
    }
}
