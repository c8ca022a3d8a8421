use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Item counts observed at each stage of one detection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub points_indexed: usize,
    pub candidate_pairs: usize,
    pub cross_line_pairs: usize,
    pub crossings: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<StageCounts>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StageCounts::default()),
        }
    }

    pub fn record_indexed(&self, count: usize) {
        self.update(|counts| counts.points_indexed += count);
    }

    pub fn record_candidates(&self, count: usize) {
        self.update(|counts| counts.candidate_pairs += count);
    }

    pub fn record_cross_line(&self, count: usize) {
        self.update(|counts| counts.cross_line_pairs += count);
    }

    pub fn record_crossings(&self, count: usize) {
        self.update(|counts| counts.crossings += count);
    }

    pub fn snapshot(&self) -> StageCounts {
        if let Ok(counts) = self.inner.lock() {
            *counts
        } else {
            StageCounts::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut StageCounts)) {
        if let Ok(mut counts) = self.inner.lock() {
            apply(&mut counts);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_across_threads() {
        let recorder = MetricsRecorder::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| recorder.record_candidates(5));
            }
        });
        recorder.record_crossings(2);
        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.candidate_pairs, 20);
        assert_eq!(snapshot.crossings, 2);
        assert_eq!(snapshot.points_indexed, 0);
    }
}
