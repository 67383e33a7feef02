//! Benchmark harness: synthetic data, repeated timed searches, and summaries.
//!
//! The index never depends on anything in here.

pub mod dataset;
pub mod timing;

pub use dataset::SyntheticDataset;
pub use timing::{TimingStats, TimingSummary};

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::IndexConfig;
use crate::distance::Metric;
use crate::error::Result;
use crate::flat_index::FlatIndex;

/// Parameters of one benchmark sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    pub dims: Vec<usize>,
    pub nb: usize,
    pub nq: usize,
    pub ks: Vec<usize>,
    pub runs: usize,
    /// Search workers; `0` uses every CPU.
    pub threads: usize,
    pub metric: Metric,
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            dims: vec![16, 32, 64, 128],
            nb: 10_000,
            nq: 100,
            ks: vec![1, 10, 100],
            runs: 10,
            threads: 1,
            metric: Metric::L2,
            seed: 1234,
        }
    }
}

/// Timing of one `(d, k)` cell of the sweep.
#[derive(Debug, Clone, Serialize)]
pub struct BenchRow {
    pub d: usize,
    pub k: usize,
    /// Shortest result set returned by the last run.
    pub results_per_query: usize,
    pub timing: TimingSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub config: BenchConfig,
    pub rows: Vec<BenchRow>,
}

impl BenchReport {
    /// Mean milliseconds as a `dims x ks` matrix, row per dimension.
    pub fn mean_matrix(&self) -> Vec<Vec<f64>> {
        self.config
            .dims
            .iter()
            .map(|&d| {
                self.rows
                    .iter()
                    .filter(|r| r.d == d)
                    .map(|r| r.timing.mean_ms)
                    .collect()
            })
            .collect()
    }
}

/// Build one index per dimension and time `runs` batched searches per `k`.
pub fn run_benchmark(config: &BenchConfig) -> Result<BenchReport> {
    let mut rows = Vec::with_capacity(config.dims.len() * config.ks.len());

    for &d in &config.dims {
        let ds = SyntheticDataset::new(d, config.nb, config.nq, config.seed);
        info!(%ds, metric = %config.metric, threads = config.threads, "building index");

        let index_config = IndexConfig::with_auto_threads(config.threads);
        let mut index = FlatIndex::with_config(d, config.metric, index_config)?;
        index.add(ds.database())?;

        for &k in &config.ks {
            let mut stats = TimingStats::for_runs(config.runs);
            let mut results_per_query = 0;
            for _ in 0..config.runs {
                let t0 = Instant::now();
                let results = index.search(ds.queries(), k)?;
                stats.record(t0.elapsed());
                results_per_query = results.iter().map(Vec::len).min().unwrap_or(0);
            }
            rows.push(BenchRow {
                d,
                k,
                results_per_query,
                timing: stats.summary(),
            });
        }
    }

    Ok(BenchReport {
        config: config.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_sweep() {
        let config = BenchConfig {
            dims: vec![4, 8],
            nb: 50,
            nq: 3,
            ks: vec![1, 100],
            runs: 5,
            ..BenchConfig::default()
        };
        let report = run_benchmark(&config).unwrap();

        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.rows[0].results_per_query, 1);
        // k larger than the database returns every vector
        assert_eq!(report.rows[1].results_per_query, 50);
        assert_eq!(report.rows[0].timing.runs, 4);

        let matrix = report.mean_matrix();
        assert_eq!(matrix.len(), 2);
        assert!(matrix.iter().all(|row| row.len() == 2));
    }

    #[test]
    fn test_zero_threads_uses_all_cores() {
        let config = BenchConfig {
            dims: vec![4],
            nb: 20,
            nq: 4,
            ks: vec![3],
            runs: 1,
            threads: 0,
            ..BenchConfig::default()
        };
        let report = run_benchmark(&config).unwrap();
        assert_eq!(report.rows[0].results_per_query, 3);
    }

    #[test]
    fn test_invalid_k_propagates() {
        let config = BenchConfig {
            dims: vec![4],
            nb: 10,
            nq: 1,
            ks: vec![0],
            runs: 1,
            ..BenchConfig::default()
        };
        assert!(run_benchmark(&config).is_err());
    }
}
