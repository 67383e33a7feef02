//! # flatknn
//!
//! Exact k-nearest-neighbor search over dense, fixed-dimension `f32` vectors.
//!
//! This library provides:
//! - A brute-force flat index with bounded top-k selection
//! - Squared Euclidean, inner product and cosine metrics
//! - Batched search spread over a dedicated thread pool, with interruption
//! - Range search and search restricted to a subset of ids
//! - A small benchmark harness (synthetic data and timing statistics)
//!
//! ## Example
//!
//! ```rust
//! use flatknn::{FlatIndex, Metric};
//!
//! let mut index = FlatIndex::new(2, Metric::L2).unwrap();
//! index
//!     .add(&[[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0], [5.0, 5.0]])
//!     .unwrap();
//!
//! let results = index.search(&[[0.0f32, 0.0]], 2).unwrap();
//! assert_eq!(results[0][0].id, 0);
//! assert_eq!(results[0][1].id, 1);
//! ```

pub mod config;
pub mod distance;
pub mod error;
pub mod flat_index;
pub mod harness;
pub mod neighbor;
pub mod vector;

pub use config::{IndexConfig, InterruptFlag};
pub use distance::Metric;
pub use error::{FlatIndexError, Result};
pub use flat_index::FlatIndex;
pub use neighbor::{Neighbor, ResultSet};
pub use vector::Vector;
