//! Cancel-and-replace recomputation.
//!
//! A [`Recomputer`] runs one logical stream of work (table evaluation, keyword
//! search, ...) on a [`ThreadPool`] and delivers results to a
//! [`MainContext`](crate::MainContext) with "last request wins" semantics:
//!
//! - Every [`submit`](Recomputer::submit) issues a new generation token and
//!   thereby cancels all earlier requests of the same stream.
//! - Work receives its token and may stop early at coarse checkpoints by
//!   returning `None`.
//! - The delivery closure runs on the main context, and only if the token is
//!   still current at that moment. Stale results are dropped silently.
//!
//! Independent streams use independent recomputers; there is no ordering
//! between them.
//!
//! # Example
//!
//! ```
//! use quadrant_core::{MainContext, Recomputer};
//! use quadrant_core::threadpool::{ThreadPool, ThreadPoolConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use parking_lot::Mutex;
//!
//! let context = MainContext::new();
//! let pool = Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(2)).unwrap());
//! let stream = Recomputer::new("example", pool, context.handle());
//! let shown = Arc::new(Mutex::new(Vec::new()));
//!
//! for request in 0..3 {
//!     let shown = shown.clone();
//!     stream.submit(move |_token| Some(request), move |value| shown.lock().push(value));
//! }
//!
//! context.process_until(Duration::from_secs(2), || stream.is_idle());
//! assert_eq!(*shown.lock(), vec![2]);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::ContextHandle;
use crate::generation::{CancellationToken, GenerationCounter};
use crate::logging::targets;
use crate::threadpool::ThreadPool;

/// Runs one stream of cancellable work and delivers only the latest result.
pub struct Recomputer {
    stream: &'static str,
    generations: GenerationCounter,
    pool: Arc<ThreadPool>,
    context: ContextHandle,
    /// Generation of the most recent request that reached the main context,
    /// whether it was applied or discarded.
    settled: Arc<AtomicU64>,
}

impl Recomputer {
    /// Create a recomputer named `stream` for log output.
    pub fn new(stream: &'static str, pool: Arc<ThreadPool>, context: ContextHandle) -> Self {
        Self {
            stream,
            generations: GenerationCounter::new(),
            pool,
            context,
            settled: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Issue a new request, superseding any request still in flight.
    ///
    /// `work` runs on the pool with the request's token and returns `None`
    /// when it stops early because the token was cancelled. `deliver` runs
    /// on the main context only if the request is still the latest one.
    ///
    /// Returns the request's token.
    ///
    /// `work` must not panic. A request whose work panics never reaches the
    /// main context, so [`is_idle`](Self::is_idle) stays `false` until a
    /// newer request settles or the stream is cancelled.
    pub fn submit<W, T, D>(&self, work: W, deliver: D) -> CancellationToken
    where
        W: FnOnce(&CancellationToken) -> Option<T> + Send + 'static,
        T: Send + 'static,
        D: FnOnce(T) + Send + 'static,
    {
        let token = self.generations.issue();
        let generation = token.generation();
        tracing::debug!(target: targets::RECOMPUTE, stream = self.stream, generation, "request issued");

        let stream = self.stream;
        let settled = self.settled.clone();
        let work_token = token.clone();
        let delivery_token = token.clone();

        self.pool.spawn_with_callback(
            move || {
                if work_token.is_cancelled() {
                    return None;
                }
                work(&work_token)
            },
            &self.context,
            move |outcome| {
                settled.fetch_max(generation, Ordering::AcqRel);
                match outcome {
                    Some(result) if delivery_token.is_current() => {
                        tracing::debug!(target: targets::RECOMPUTE, stream, generation, "result applied");
                        deliver(result);
                    }
                    Some(_) => {
                        tracing::debug!(
                            target: targets::RECOMPUTE,
                            stream,
                            generation,
                            "discarding stale result"
                        );
                    }
                    None => {
                        tracing::trace!(
                            target: targets::RECOMPUTE,
                            stream,
                            generation,
                            "request cancelled before completion"
                        );
                    }
                }
            },
        );

        token
    }

    /// Cancel every outstanding request of this stream.
    pub fn cancel(&self) {
        tracing::debug!(target: targets::RECOMPUTE, stream = self.stream, "stream cancelled");
        self.generations.invalidate();
        self.settled
            .fetch_max(self.generations.current(), Ordering::AcqRel);
    }

    /// The generation of the most recent request.
    pub fn current_generation(&self) -> u64 {
        self.generations.current()
    }

    /// Whether the most recent request has come back to the main context.
    pub fn is_idle(&self) -> bool {
        self.settled.load(Ordering::Acquire) >= self.generations.current()
    }

    /// The name of this stream.
    pub fn stream(&self) -> &'static str {
        self.stream
    }
}

impl std::fmt::Debug for Recomputer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recomputer")
            .field("stream", &self.stream)
            .field("generation", &self.current_generation())
            .field("idle", &self.is_idle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MainContext;
    use crate::threadpool::ThreadPoolConfig;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
    use std::time::Duration;

    fn pool(threads: usize) -> Arc<ThreadPool> {
        Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(threads)).unwrap())
    }

    #[test]
    fn test_single_request_delivers() {
        let context = MainContext::new();
        let stream = Recomputer::new("test", pool(2), context.handle());
        let shown = Arc::new(Mutex::new(None));

        let shown_clone = shown.clone();
        stream.submit(|_| Some("done"), move |v| *shown_clone.lock() = Some(v));

        assert!(context.process_until(Duration::from_secs(2), || stream.is_idle()));
        assert_eq!(*shown.lock(), Some("done"));
    }

    #[test]
    fn test_last_request_wins_when_first_finishes_late() {
        let context = MainContext::new();
        let workers = pool(2);
        let stream = Recomputer::new("test", workers.clone(), context.handle());
        let shown = Arc::new(Mutex::new(Vec::new()));
        let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);
        let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(1);
        let r1_finished = Arc::new(AtomicBool::new(false));

        // R1 is already running when R2 is issued, ignores its token and
        // finishes with a result that is stale by then.
        let shown_r1 = shown.clone();
        let finished = r1_finished.clone();
        stream.submit(
            move |_| {
                let _ = started_tx.send(());
                let _ = release_rx.recv_timeout(Duration::from_secs(5));
                finished.store(true, AtomicOrdering::SeqCst);
                Some("r1")
            },
            move |v| shown_r1.lock().push(v),
        );
        started_rx.recv_timeout(Duration::from_secs(2)).unwrap();

        let shown_r2 = shown.clone();
        stream.submit(|_| Some("r2"), move |v| shown_r2.lock().push(v));

        assert!(context.process_until(Duration::from_secs(2), || !shown.lock().is_empty()));
        release_tx.send(()).unwrap();
        assert!(context.process_until(Duration::from_secs(2), || workers.active_tasks() == 0));
        context.process_pending();

        assert!(r1_finished.load(AtomicOrdering::SeqCst));
        assert_eq!(*shown.lock(), vec!["r2"]);
        assert!(stream.is_idle());
    }

    #[test]
    fn test_work_sees_cancellation_at_checkpoint() {
        let context = MainContext::new();
        let stream = Recomputer::new("test", pool(1), context.handle());
        let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);
        let stopped_early = Arc::new(Mutex::new(false));

        let stopped_clone = stopped_early.clone();
        stream.submit(
            move |token| {
                let _ = started_tx.send(());
                for _ in 0..10_000 {
                    if token.is_cancelled() {
                        *stopped_clone.lock() = true;
                        return None;
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
                Some(())
            },
            |_| panic!("cancelled work must not be delivered"),
        );

        started_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        stream.cancel();

        assert!(context.process_until(Duration::from_secs(5), || *stopped_early.lock()));
    }

    #[test]
    fn test_delivery_skipped_when_cancelled_before_drain() {
        let context = MainContext::new();
        let stream = Recomputer::new("test", pool(1), context.handle());
        let delivered = Arc::new(Mutex::new(false));

        let delivered_clone = delivered.clone();
        stream.submit(|_| Some(1), move |_| *delivered_clone.lock() = true);

        // Wait for the result to be queued, then cancel before draining.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while context.pending_count() == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        stream.cancel();
        context.process_pending();

        assert!(!*delivered.lock());
        assert!(stream.is_idle());
    }

    #[test]
    fn test_generations_increase() {
        let context = MainContext::new();
        let stream = Recomputer::new("test", pool(1), context.handle());
        let first = stream.submit(|_| Some(()), |_| {});
        let second = stream.submit(|_| Some(()), |_| {});
        assert!(second.generation() > first.generation());
        assert!(first.is_cancelled());
        assert_eq!(stream.current_generation(), second.generation());
        assert_eq!(stream.stream(), "test");
        context.process_until(Duration::from_secs(2), || stream.is_idle());
    }
}
