//! Bounded top-k selection over scored database entries.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

/// A search hit: database identifier and its metric value against the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: usize,
    pub distance: f32,
}

impl Neighbor {
    pub fn new(id: usize, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// Per-query result: nearest first.
pub type ResultSet = Vec<Neighbor>;

/// Heap entry ordered by `(key, id)`, where a smaller key is nearer.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    key: f32,
    id: usize,
    score: f32,
}

impl Ranked {
    fn new(id: usize, score: f32, similarity: bool) -> Self {
        // `+ 0.0` folds -0.0 into 0.0 so equal values tie on id
        let key = if score.is_nan() {
            f32::INFINITY
        } else if similarity {
            -score + 0.0
        } else {
            score + 0.0
        };
        Self { key, id, score }
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Keeps the `k` nearest entries seen so far in a max-heap whose root is the
/// current worst kept entry. Each push is O(log k).
#[derive(Debug)]
pub struct TopK {
    heap: BinaryHeap<Ranked>,
    k: usize,
    similarity: bool,
}

impl TopK {
    /// `similarity` selects the k largest scores instead of the k smallest.
    pub fn new(k: usize, similarity: bool) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k),
            k,
            similarity,
        }
    }

    /// Offer a candidate; it is kept only if it beats the current worst.
    #[inline]
    pub fn push(&mut self, id: usize, score: f32) {
        if self.k == 0 {
            return;
        }
        let candidate = Ranked::new(id, score, self.similarity);
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if candidate < *worst {
                *worst = candidate;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain into a Vec ordered nearest first, ties by ascending id.
    pub fn into_sorted_vec(self) -> ResultSet {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|r| Neighbor::new(r.id, r.score))
            .collect()
    }
}

/// Sort hits nearest first with the same ordering [`TopK`] uses.
pub fn sort_nearest_first(hits: &mut [Neighbor], similarity: bool) {
    hits.sort_unstable_by(|a, b| {
        Ranked::new(a.id, a.distance, similarity).cmp(&Ranked::new(b.id, b.distance, similarity))
    });
}
