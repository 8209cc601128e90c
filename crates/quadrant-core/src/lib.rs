//! Core runtime plumbing for Quadrant.
//!
//! This crate provides the domain-independent pieces the filter/sort/search
//! engine is built on:
//!
//! - **Main Context**: a serialized execution context owned by one thread,
//!   where all displayed state is mutated and results are applied
//! - **Thread Pool**: rayon-backed workers with delivery back to the context
//! - **Generation Tokens**: monotonically increasing request markers used for
//!   cooperative cancellation
//! - **Recomputer**: cancel-and-replace runner with "last request wins"
//!   delivery
//! - **Signal/Slot System**: change notification for consumers
//! - **Thread Affinity**: checks for state owned by the main context
//!
//! # Example
//!
//! ```
//! use quadrant_core::{MainContext, Recomputer, Signal};
//! use quadrant_core::threadpool::{ThreadPool, ThreadPoolConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let context = MainContext::new();
//! let pool = Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(2)).unwrap());
//! let evaluations = Recomputer::new("rows", pool, context.handle());
//!
//! let rows_changed = Arc::new(Signal::<usize>::new());
//! rows_changed.connect(|rows| println!("showing {rows} rows"));
//!
//! let signal = rows_changed.clone();
//! evaluations.submit(|_token| Some(3usize), move |rows| signal.emit(rows));
//!
//! context.process_until(Duration::from_secs(2), || evaluations.is_idle());
//! ```

pub mod context;
mod error;
pub mod generation;
pub mod logging;
pub mod recompute;
pub mod signal;
pub mod thread_check;
pub mod threadpool;

pub use context::{ContextHandle, MainContext, QueuedInvocation};
pub use error::{ContextError, CoreError, Result, ThreadPoolError};
pub use generation::{CancellationToken, GenerationCounter};
pub use logging::PerfSpan;
pub use recompute::Recomputer;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
pub use threadpool::{ThreadPool, ThreadPoolConfig};
