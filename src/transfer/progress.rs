/// Transfer progress as shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// 0 – 100, rounded half up.
    pub percent: u8,
    /// Zero-based index of the file the transfer is probably sending.
    ///
    /// This is a linear estimate that assumes every file costs the same
    /// number of bytes. The upload is a single multipart body and the server
    /// reports nothing per file, so the real boundary is unknown here.
    pub estimated_file_index: usize,
    pub transferred_bytes: u64,
    pub total_bytes: u64,
}

impl ProgressSnapshot {
    /// 0.0 – 1.0 fraction for gauges.
    pub fn fraction(&self) -> f64 {
        f64::from(self.percent) / 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= 100
    }
}

/// Turns raw byte counts from the transport into percentages.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker {
    file_count: usize,
}

impl ProgressTracker {
    pub fn new(file_count: usize) -> Self {
        Self { file_count }
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// `total_bytes == 0` yields 0 percent; transferred counts above the
    /// total are clamped to 100.
    pub fn on_progress(&self, transferred_bytes: u64, total_bytes: u64) -> ProgressSnapshot {
        let percent = percent_of(transferred_bytes, total_bytes);
        let estimated_file_index = if self.file_count == 0 {
            0
        } else {
            (usize::from(percent) * self.file_count / 100).min(self.file_count - 1)
        };
        ProgressSnapshot {
            percent,
            estimated_file_index,
            transferred_bytes,
            total_bytes,
        }
    }
}

fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = u128::from(done.min(total));
    let total = u128::from(total);
    // round(100 * done / total), half up, in integers
    ((200 * done + total) / (2 * total)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_is_zero_percent() {
        let tracker = ProgressTracker::new(3);
        for transferred in [0, 1, 10_000, u64::MAX] {
            let snap = tracker.on_progress(transferred, 0);
            assert_eq!(snap.percent, 0);
            assert_eq!(snap.estimated_file_index, 0);
        }
    }

    #[test]
    fn percent_rounds_half_up() {
        let tracker = ProgressTracker::new(1);
        assert_eq!(tracker.on_progress(1, 200).percent, 1); // 0.5 %
        assert_eq!(tracker.on_progress(1, 3).percent, 33);
        assert_eq!(tracker.on_progress(2, 3).percent, 67);
        assert_eq!(tracker.on_progress(3, 3).percent, 100);
    }

    #[test]
    fn percent_is_monotonic_in_transferred_bytes() {
        let tracker = ProgressTracker::new(4);
        let total = 9_973;
        let mut last = 0;
        for transferred in 0..=total {
            let percent = tracker.on_progress(transferred, total).percent;
            assert!(percent >= last, "{transferred}: {percent} < {last}");
            last = percent;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn overshoot_is_clamped() {
        let tracker = ProgressTracker::new(2);
        let snap = tracker.on_progress(500, 100);
        assert_eq!(snap.percent, 100);
        assert!(snap.is_complete());
        assert_eq!(snap.estimated_file_index, 1);
    }

    #[test]
    fn estimated_index_is_linear_and_capped() {
        let tracker = ProgressTracker::new(4);
        assert_eq!(tracker.on_progress(0, 100).estimated_file_index, 0);
        assert_eq!(tracker.on_progress(24, 100).estimated_file_index, 0);
        assert_eq!(tracker.on_progress(25, 100).estimated_file_index, 1);
        assert_eq!(tracker.on_progress(74, 100).estimated_file_index, 2);
        assert_eq!(tracker.on_progress(100, 100).estimated_file_index, 3);
    }

    #[test]
    fn no_files_never_underflows() {
        let snap = ProgressTracker::new(0).on_progress(50, 100);
        assert_eq!(snap.percent, 50);
        assert_eq!(snap.estimated_file_index, 0);
    }
}
