//! Generation tokens for cancelling superseded fetch cycles.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::FetchError;

/// Monotonic counter shared between a session and its in-flight cycles.
///
/// Every filter or sort change advances it. A cycle captures a
/// [`GenerationGuard`] when it starts and checks it after each chunk.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    value: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Invalidate every outstanding guard and return the new generation.
    pub fn advance(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Guard bound to the current generation.
    pub fn guard(&self) -> GenerationGuard {
        GenerationGuard {
            counter: Arc::clone(&self.value),
            expected: self.current(),
        }
    }
}

/// Snapshot of a generation that later reports whether it is still current.
#[derive(Clone)]
pub struct GenerationGuard {
    counter: Arc<AtomicU64>,
    expected: u64,
}

impl GenerationGuard {
    /// A guard nothing can invalidate, for callers without a session.
    pub fn detached() -> Self {
        GenerationCounter::new().guard()
    }

    pub fn generation(&self) -> u64 {
        self.expected
    }

    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::Acquire) == self.expected
    }

    pub fn ensure_current(&self) -> Result<(), FetchError> {
        let current = self.counter.load(Ordering::Acquire);
        if current == self.expected {
            Ok(())
        } else {
            Err(FetchError::Superseded { current })
        }
    }
}

impl fmt::Debug for GenerationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationGuard")
            .field("expected", &self.expected)
            .field("current", &self.counter.load(Ordering::Acquire))
            .finish()
    }
}
