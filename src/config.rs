//! Index configuration and search interruption.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FlatIndexError, Result};

/// Configuration for a [`FlatIndex`](crate::FlatIndex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Worker threads used to spread the queries of one batch.
    /// `1` searches serially on the calling thread.
    pub threads: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

impl IndexConfig {
    pub fn new(threads: usize) -> Self {
        Self { threads }
    }

    /// One worker per available CPU.
    pub fn all_cores() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self { threads }
    }

    /// `threads == 0` picks one worker per CPU, anything else is taken as is.
    pub fn with_auto_threads(threads: usize) -> Self {
        if threads == 0 {
            Self::all_cores()
        } else {
            Self::new(threads)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(FlatIndexError::InvalidThreadCount {
                threads: self.threads,
            });
        }
        Ok(())
    }
}

/// Shared cancellation switch checked between queries of a batch.
///
/// Cloning yields a handle to the same flag, so one clone can be moved to
/// another thread and raised while a search is running.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask in-flight searches to stop before their next query.
    pub fn interrupt(&self) {
        self.raised.store(true, Ordering::Release);
    }

    pub fn is_interrupted(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Lower the flag so it can be reused for another search.
    pub fn reset(&self) {
        self.raised.store(false, Ordering::Release);
    }
}
