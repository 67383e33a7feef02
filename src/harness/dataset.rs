//! Seeded synthetic vectors for benchmarking.
//!
//! Points are drawn from a 10-dimensional latent space, projected to `d`
//! dimensions through a random matrix, scaled per dimension and passed through
//! `sin`, which gives data with low intrinsic dimension rather than uniform
//! noise. Database and queries come from the same distribution.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LATENT_DIM: usize = 10;

/// A database and a query batch of the same dimension.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    d: usize,
    database: Vec<Vec<f32>>,
    queries: Vec<Vec<f32>>,
}

impl SyntheticDataset {
    /// Generate `nb` database vectors and `nq` queries of dimension `d`.
    /// The same seed always yields the same data.
    pub fn new(d: usize, nb: usize, nq: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let projection: Vec<f32> = (0..LATENT_DIM * d).map(|_| rng.gen()).collect();
        let scale: Vec<f32> = (0..d).map(|_| rng.gen::<f32>() * 4.0 + 0.1).collect();

        let sample = |rng: &mut StdRng| -> Vec<f32> {
            let latent: Vec<f32> = (0..LATENT_DIM).map(|_| rng.gen_range(-1.0..1.0)).collect();
            (0..d)
                .map(|j| {
                    let x: f32 = latent
                        .iter()
                        .enumerate()
                        .map(|(i, z)| z * projection[i * d + j])
                        .sum();
                    (x * scale[j]).sin()
                })
                .collect()
        };

        let database = (0..nb).map(|_| sample(&mut rng)).collect();
        let queries = (0..nq).map(|_| sample(&mut rng)).collect();

        Self {
            d,
            database,
            queries,
        }
    }

    pub fn dimension(&self) -> usize {
        self.d
    }

    pub fn database(&self) -> &[Vec<f32>] {
        &self.database
    }

    pub fn queries(&self) -> &[Vec<f32>] {
        &self.queries
    }
}

impl std::fmt::Display for SyntheticDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SyntheticDataset(d={}, nb={}, nq={})",
            self.d,
            self.database.len(),
            self.queries.len()
        )
    }
}
