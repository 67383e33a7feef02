//! Vector type and operations

use crate::error::{FlatIndexError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A dense vector of `f32` components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    /// Create a new vector from a Vec<f32>
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the dimension of the vector
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get the underlying data as a slice
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Parse a vector from a comma-separated string such as `"1.0, 2.0, 3.0"`.
impl FromStr for Vector {
    type Err = FlatIndexError;

    fn from_str(s: &str) -> Result<Self> {
        let data = s
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<f32>()
                    .map_err(|_| FlatIndexError::InvalidVector {
                        reason: format!("Invalid float: {:?}", x.trim()),
                    })
            })
            .collect::<Result<Vec<f32>>>()?;
        Ok(Vector::new(data))
    }
}

impl AsRef<[f32]> for Vector {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}
