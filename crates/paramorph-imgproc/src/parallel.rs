use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of samples from which [`ExecutionStrategy::Auto`] goes parallel.
pub const AUTO_PARALLEL_THRESHOLD: usize = 1 << 16;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how the lines of an axis pass are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Parallel on the global Rayon pool for images with at least
    /// [`AUTO_PARALLEL_THRESHOLD`] samples, serial otherwise.
    #[default]
    Auto,

    /// Use the global Rayon thread pool regardless of the image size.
    Parallel,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every filter invocation, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Whether lines should be dispatched to a thread pool for an image of `num_elements` samples.
    pub fn is_parallel(&self, num_elements: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Auto => num_elements >= AUTO_PARALLEL_THRESHOLD,
            ExecutionStrategy::Parallel | ExecutionStrategy::Fixed(_) => true,
        }
    }

    /// Check the strategy parameters.
    pub fn validate(&self) -> Result<(), ParallelError> {
        match self {
            ExecutionStrategy::Fixed(0) => Err(ParallelError::InvalidThreadCount(0)),
            _ => Ok(()),
        }
    }

    /// Run `op` inside the pool this strategy asks for.
    ///
    /// Only [`ExecutionStrategy::Fixed`] builds a pool; the other variants run `op`
    /// on the calling thread, from where Rayon uses the global pool.
    pub fn install<R, F>(&self, op: F) -> Result<R, ParallelError>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self {
            ExecutionStrategy::Fixed(n) => {
                if *n == 0 {
                    return Err(ParallelError::InvalidThreadCount(*n));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?;
                Ok(pool.install(op))
            }
            _ => Ok(op()),
        }
    }
}

/// Cooperative cancellation flag shared between a caller and a running filter.
///
/// Filters poll the flag between lines; a line that has started always completes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every operation observing this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_parallel() {
        assert!(!ExecutionStrategy::Serial.is_parallel(usize::MAX));
        assert!(!ExecutionStrategy::Auto.is_parallel(AUTO_PARALLEL_THRESHOLD - 1));
        assert!(ExecutionStrategy::Auto.is_parallel(AUTO_PARALLEL_THRESHOLD));
        assert!(ExecutionStrategy::Parallel.is_parallel(1));
        assert!(ExecutionStrategy::Fixed(2).is_parallel(1));
    }

    #[test]
    fn test_install_fixed_success() {
        let threads = ExecutionStrategy::Fixed(2)
            .install(rayon::current_num_threads)
            .unwrap();
        assert_eq!(threads, 2);
    }

    #[test]
    fn test_install_fixed_error() {
        let res = ExecutionStrategy::Fixed(0).install(|| ());
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
        assert!(ExecutionStrategy::Fixed(0).validate().is_err());
    }

    #[test]
    fn test_install_serial() {
        assert_eq!(ExecutionStrategy::Serial.install(|| 7).unwrap(), 7);
    }

    #[test]
    fn test_cancellation_token_shared() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }
}
