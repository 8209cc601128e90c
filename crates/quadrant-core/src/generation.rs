//! Generation tokens for cooperative, last-request-wins cancellation.
//!
//! A [`GenerationCounter`] hands out [`CancellationToken`]s stamped with a
//! monotonically increasing generation. Issuing a new token supersedes every
//! token issued before it: the older tokens report themselves as cancelled
//! from that point on. Work running on a pool thread polls
//! [`CancellationToken::is_cancelled`] at coarse checkpoints, and the
//! delivery step on the main context calls [`CancellationToken::is_current`]
//! before applying a result.
//!
//! # Example
//!
//! ```
//! use quadrant_core::generation::GenerationCounter;
//!
//! let counter = GenerationCounter::new();
//! let first = counter.issue();
//! assert!(first.is_current());
//!
//! let second = counter.issue();
//! assert!(first.is_cancelled());
//! assert!(second.is_current());
//! assert!(second.generation() > first.generation());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues generation-stamped cancellation tokens.
///
/// The counter should only be advanced from the context that owns the state
/// it protects. Tokens may be cloned and read from any thread.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    latest: Arc<AtomicU64>,
}

impl GenerationCounter {
    /// Create a counter. No token is current until the first [`issue`](Self::issue).
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every previously issued token.
    pub fn issue(&self) -> CancellationToken {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        CancellationToken {
            generation,
            latest: self.latest.clone(),
        }
    }

    /// Supersede all outstanding tokens without issuing a new one.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }

    /// The most recently issued (or invalidated) generation.
    #[inline]
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}

/// A token identifying one unit of work by its generation.
///
/// The token is cancelled as soon as its counter moves past its generation,
/// either because newer work was issued or because someone called
/// [`cancel`](Self::cancel).
#[derive(Debug, Clone)]
pub struct CancellationToken {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl CancellationToken {
    /// A token that belongs to no counter and is never cancelled.
    ///
    /// Used for synchronous evaluation where nothing can supersede the call.
    pub fn never() -> Self {
        Self {
            generation: 0,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The generation this token was issued with.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this token is still the latest one issued by its counter.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }

    /// Whether newer work has superseded this token.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        !self.is_current()
    }

    /// Request cancellation of this token.
    ///
    /// Has no effect if the token has already been superseded, so cancelling
    /// a stale token never disturbs newer work.
    pub fn cancel(&self) {
        let _ = self.latest.compare_exchange(
            self.generation,
            self.generation + 1,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
