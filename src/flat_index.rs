//! Brute-force flat index: exact k-NN search in O(n log k) per query

use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::config::{IndexConfig, InterruptFlag};
use crate::distance::{self, Metric};
use crate::error::{FlatIndexError, Result};
use crate::neighbor::{self, Neighbor, ResultSet, TopK};

/// A flat index that compares every query against every stored vector.
///
/// Vectors are kept row-major in a single buffer and identified by their
/// insertion position. `add` needs `&mut self` and every search method takes
/// `&self`, so concurrent searches may share the index (e.g. behind an
/// `Arc<RwLock<FlatIndex>>`) while appends get exclusive access.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    metric: Metric,
    data: Vec<f32>,
    config: IndexConfig,
    pool: Option<ThreadPool>,
}

impl FlatIndex {
    /// Create an empty index that searches serially on the calling thread.
    pub fn new(dimension: usize, metric: Metric) -> Result<Self> {
        Self::with_config(dimension, metric, IndexConfig::default())
    }

    /// Create an empty index with an explicit configuration.
    pub fn with_config(dimension: usize, metric: Metric, config: IndexConfig) -> Result<Self> {
        if dimension == 0 {
            return Err(FlatIndexError::InvalidDimension { dimension });
        }
        config.validate()?;

        let pool = if config.threads > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .thread_name(|idx| format!("flatknn-search-{idx}"))
                .build()
                .map_err(|e| FlatIndexError::ThreadPool(e.to_string()))?;
            debug!(threads = config.threads, "built search pool");
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            dimension,
            metric,
            data: Vec::new(),
            config,
            pool,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Stored vector for `id`. Under [`Metric::Cosine`] this is the
    /// normalized form.
    pub fn reconstruct(&self, id: usize) -> Option<&[f32]> {
        let start = id.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.data.get(start..end)
    }

    /// Append vectors, assigning ids `len()..len() + vectors.len()`.
    ///
    /// Every row is checked before anything is stored, so a failed call
    /// leaves the index unchanged.
    pub fn add<V: AsRef<[f32]>>(&mut self, vectors: &[V]) -> Result<()> {
        self.check_rows(vectors)?;

        let start = self.data.len();
        self.data.reserve(vectors.len() * self.dimension);
        for v in vectors {
            self.data.extend_from_slice(v.as_ref());
        }
        self.finish_append(start);
        Ok(())
    }

    /// Append vectors packed row-major in one buffer.
    pub fn add_flat(&mut self, rows: &[f32]) -> Result<()> {
        let rem = rows.len() % self.dimension;
        if rem != 0 {
            return Err(FlatIndexError::DimensionMismatch {
                row: rows.len() / self.dimension,
                expected: self.dimension,
                actual: rem,
            });
        }

        let start = self.data.len();
        self.data.extend_from_slice(rows);
        self.finish_append(start);
        Ok(())
    }

    fn finish_append(&mut self, start: usize) {
        if self.metric.normalizes() {
            distance::renormalize(&mut self.data[start..], self.dimension);
        }
        debug!(
            added = (self.data.len() - start) / self.dimension,
            total = self.len(),
            "appended vectors"
        );
    }

    /// The `k` nearest stored vectors for each query, nearest first.
    ///
    /// When fewer than `k` vectors are stored, each result holds all of them.
    pub fn search<V>(&self, queries: &[V], k: usize) -> Result<Vec<ResultSet>>
    where
        V: AsRef<[f32]> + Sync,
    {
        self.knn_batch(queries, k, None)
    }

    /// Like [`search`](Self::search), but stops before the next query once
    /// `interrupt` is raised and returns [`FlatIndexError::Interrupted`].
    pub fn search_with_interrupt<V>(
        &self,
        queries: &[V],
        k: usize,
        interrupt: &InterruptFlag,
    ) -> Result<Vec<ResultSet>>
    where
        V: AsRef<[f32]> + Sync,
    {
        self.knn_batch(queries, k, Some(interrupt))
    }

    fn knn_batch<V>(
        &self,
        queries: &[V],
        k: usize,
        interrupt: Option<&InterruptFlag>,
    ) -> Result<Vec<ResultSet>>
    where
        V: AsRef<[f32]> + Sync,
    {
        if k == 0 {
            return Err(FlatIndexError::InvalidK { k });
        }
        self.check_rows(queries)?;
        debug!(queries = queries.len(), k, n = self.len(), "knn search");

        self.run_batch(queries, interrupt, |q| self.knn_one(q, k))
    }

    fn knn_one(&self, query: &[f32], k: usize) -> ResultSet {
        let mut top = TopK::new(k.min(self.len()), self.metric.is_similarity());
        for (id, row) in self.rows().enumerate() {
            top.push(id, self.metric.score(query, row));
        }
        top.into_sorted_vec()
    }

    /// Every stored vector within `radius` of each query, nearest first.
    ///
    /// For [`Metric::L2`] a hit has squared distance `< radius`; for the
    /// similarity metrics a hit has score `> radius`.
    pub fn range_search<V>(&self, queries: &[V], radius: f32) -> Result<Vec<ResultSet>>
    where
        V: AsRef<[f32]> + Sync,
    {
        self.check_rows(queries)?;
        debug!(queries = queries.len(), radius, "range search");

        self.run_batch(queries, None, |q| {
            let mut hits: ResultSet = self
                .rows()
                .enumerate()
                .filter_map(|(id, row)| {
                    let score = self.metric.score(q, row);
                    self.metric
                        .within(score, radius)
                        .then(|| Neighbor::new(id, score))
                })
                .collect();
            neighbor::sort_nearest_first(&mut hits, self.metric.is_similarity());
            hits
        })
    }

    /// The `k` nearest vectors among `ids` only. Repeated ids are scored,
    /// and may be returned, more than once.
    pub fn search_subset(&self, query: &[f32], ids: &[usize], k: usize) -> Result<ResultSet> {
        if k == 0 {
            return Err(FlatIndexError::InvalidK { k });
        }
        let scores = self.compute_distances(query, ids)?;

        let mut top = TopK::new(k.min(ids.len()), self.metric.is_similarity());
        for (&id, score) in ids.iter().zip(scores) {
            top.push(id, score);
        }
        Ok(top.into_sorted_vec())
    }

    /// Metric values between `query` and each vector in `ids`, in order.
    pub fn compute_distances(&self, query: &[f32], ids: &[usize]) -> Result<Vec<f32>> {
        self.check_rows(&[query])?;
        let len = self.len();
        if let Some(&id) = ids.iter().find(|&&id| id >= len) {
            return Err(FlatIndexError::IdOutOfRange { id, len });
        }

        let query = self.prepare_query(query);
        Ok(ids
            .iter()
            .map(|&id| {
                let start = id * self.dimension;
                self.metric
                    .score(&query, &self.data[start..start + self.dimension])
            })
            .collect())
    }

    /// Run `per_query` over every query, on the pool when one is configured.
    /// Output order always matches input order.
    fn run_batch<V, F>(
        &self,
        queries: &[V],
        interrupt: Option<&InterruptFlag>,
        per_query: F,
    ) -> Result<Vec<ResultSet>>
    where
        V: AsRef<[f32]> + Sync,
        F: Fn(&[f32]) -> ResultSet + Sync + Send,
    {
        let completed = AtomicUsize::new(0);
        let run_one = |q: &V| -> Result<ResultSet> {
            if interrupt.is_some_and(InterruptFlag::is_interrupted) {
                return Err(FlatIndexError::Interrupted {
                    completed: completed.load(Ordering::Relaxed),
                });
            }
            let result = per_query(&*self.prepare_query(q.as_ref()));
            completed.fetch_add(1, Ordering::Relaxed);
            Ok(result)
        };

        match &self.pool {
            Some(pool) => pool.install(|| queries.par_iter().map(run_one).collect()),
            None => queries.iter().map(run_one).collect(),
        }
    }

    fn prepare_query<'a>(&self, query: &'a [f32]) -> Cow<'a, [f32]> {
        if self.metric.normalizes() {
            let mut owned = query.to_vec();
            distance::renormalize(&mut owned, self.dimension);
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(query)
        }
    }

    fn rows(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.dimension)
    }

    fn check_rows<V: AsRef<[f32]>>(&self, rows: &[V]) -> Result<()> {
        for (row, v) in rows.iter().enumerate() {
            let actual = v.as_ref().len();
            if actual != self.dimension {
                return Err(FlatIndexError::DimensionMismatch {
                    row,
                    expected: self.dimension,
                    actual,
                });
            }
        }
        Ok(())
    }
}
