//! Distance kernels and the metrics built on them.
//!
//! All kernels work on plain `f32` slices. Squared Euclidean distance is
//! accumulated directly from element differences, four lanes at a time, so
//! nearly identical vectors come out at (or extremely close to) zero instead
//! of suffering the cancellation of the `|x|^2 + |y|^2 - 2<x,y>` expansion.

use serde::{Deserialize, Serialize};

/// Metric used to rank database vectors against a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Squared Euclidean distance; smaller is nearer
    #[default]
    L2,
    /// Inner product; larger is nearer
    InnerProduct,
    /// Inner product of L2-normalized vectors; larger is nearer
    Cosine,
}

impl Metric {
    /// Raw metric value between two equal-length vectors.
    ///
    /// For [`Metric::Cosine`] the inputs are expected to be normalized
    /// already; the index normalizes on the way in.
    #[inline]
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::L2 => l2_sqr(a, b),
            Metric::InnerProduct | Metric::Cosine => inner_product(a, b),
        }
    }

    /// Whether larger values mean nearer
    pub fn is_similarity(self) -> bool {
        !matches!(self, Metric::L2)
    }

    /// Whether stored and query vectors are normalized before scoring
    pub fn normalizes(self) -> bool {
        matches!(self, Metric::Cosine)
    }

    /// Whether `score` falls inside a range query of the given radius.
    pub fn within(self, score: f32, radius: f32) -> bool {
        if self.is_similarity() {
            score > radius
        } else {
            score < radius
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Metric::L2 => "l2",
            Metric::InnerProduct => "inner_product",
            Metric::Cosine => "cosine",
        };
        f.write_str(name)
    }
}

/// Squared Euclidean distance between two vectors
#[inline]
pub fn l2_sqr(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = [0.0f32; 4];
    let chunks_a = a.chunks_exact(4);
    let chunks_b = b.chunks_exact(4);
    let tail: f32 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    for (ca, cb) in chunks_a.zip(chunks_b) {
        for lane in 0..4 {
            let d = ca[lane] - cb[lane];
            acc[lane] += d * d;
        }
    }
    (acc[0] + acc[1]) + (acc[2] + acc[3]) + tail
}

/// Inner product of two vectors
#[inline]
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = [0.0f32; 4];
    let chunks_a = a.chunks_exact(4);
    let chunks_b = b.chunks_exact(4);
    let tail: f32 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| x * y)
        .sum();
    for (ca, cb) in chunks_a.zip(chunks_b) {
        for lane in 0..4 {
            acc[lane] += ca[lane] * cb[lane];
        }
    }
    (acc[0] + acc[1]) + (acc[2] + acc[3]) + tail
}

/// Squared L2 norm
#[inline]
pub fn norm_l2_sqr(a: &[f32]) -> f32 {
    inner_product(a, a)
}

/// L2 norm
#[inline]
pub fn norm_l2(a: &[f32]) -> f32 {
    norm_l2_sqr(a).sqrt()
}

/// Normalize every `d`-length row of `rows` to unit L2 norm in place.
/// Zero rows are left untouched.
pub fn renormalize(rows: &mut [f32], d: usize) {
    debug_assert!(d > 0 && rows.len() % d == 0);
    for row in rows.chunks_exact_mut(d) {
        let norm = norm_l2(row);
        if norm > 0.0 {
            let inv = 1.0 / norm;
            row.iter_mut().for_each(|x| *x *= inv);
        }
    }
}

/// Full `nx x ny` matrix of squared distances between the rows of `xs` and
/// `ys`, both row-major with row length `d`. Row `i` of the output holds the
/// distances from `xs[i]` to every row of `ys`.
pub fn pairwise_l2_sqr(xs: &[f32], ys: &[f32], d: usize) -> Vec<f32> {
    debug_assert!(d > 0);
    let ny = ys.len() / d;
    let mut out = Vec::with_capacity(xs.len() / d * ny);
    for x in xs.chunks_exact(d) {
        out.extend(ys.chunks_exact(d).map(|y| l2_sqr(x, y)));
    }
    out
}
