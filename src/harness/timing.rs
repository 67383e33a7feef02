//! Wall-clock statistics for repeated search runs.

use std::time::Duration;

use serde::Serialize;

/// Collects per-run durations, discarding the first `warmup` of them.
#[derive(Debug)]
pub struct TimingStats {
    warmup: usize,
    seen: usize,
    samples_ms: Vec<f64>,
}

/// Aggregated view of a [`TimingStats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingSummary {
    pub runs: usize,
    pub mean_ms: f64,
    pub std_ms: f64,
    pub p50_ms: f64,
    pub p99_ms: f64,
}

impl TimingStats {
    pub fn new(warmup: usize) -> Self {
        Self {
            warmup,
            seen: 0,
            samples_ms: Vec::new(),
        }
    }

    /// Warmup of one fifth of `runs`.
    pub fn for_runs(runs: usize) -> Self {
        Self::new(runs / 5)
    }

    /// Record one run.
    pub fn record(&mut self, duration: Duration) {
        self.seen += 1;
        if self.seen > self.warmup {
            self.samples_ms.push(duration.as_secs_f64() * 1000.0);
        }
    }

    /// Recorded runs after warmup.
    pub fn len(&self) -> usize {
        self.samples_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples_ms.is_empty()
    }

    pub fn mean_ms(&self) -> f64 {
        if self.samples_ms.is_empty() {
            return 0.0;
        }
        self.samples_ms.iter().sum::<f64>() / self.samples_ms.len() as f64
    }

    /// Population standard deviation.
    pub fn std_ms(&self) -> f64 {
        if self.samples_ms.is_empty() {
            return 0.0;
        }
        let mean = self.mean_ms();
        let var = self
            .samples_ms
            .iter()
            .map(|x| (x - mean) * (x - mean))
            .sum::<f64>()
            / self.samples_ms.len() as f64;
        var.sqrt()
    }

    /// Nearest-rank percentile (e.g., 50.0, 99.0).
    pub fn percentile_ms(&self, percentile: f64) -> f64 {
        if self.samples_ms.is_empty() {
            return 0.0;
        }

        let mut sorted = self.samples_ms.clone();
        sorted.sort_by(f64::total_cmp);

        let index = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }

    pub fn summary(&self) -> TimingSummary {
        TimingSummary {
            runs: self.len(),
            mean_ms: self.mean_ms(),
            std_ms: self.std_ms(),
            p50_ms: self.percentile_ms(50.0),
            p99_ms: self.percentile_ms(99.0),
        }
    }
}
