//! The UI-owning, serialized execution context.
//!
//! A [`MainContext`] is created on the thread that owns view state. Worker
//! threads hold cloneable [`ContextHandle`]s and post closures to it; the
//! owning thread drains the queue and runs those closures one at a time, so
//! every write to view-owned state happens on a single thread and never
//! interleaves with another write.
//!
//! # How It Works
//!
//! 1. A worker finishes a computation and wraps "apply the result" in a
//!    closure.
//!
//! 2. The closure is posted through a [`ContextHandle`] as a
//!    [`QueuedInvocation`].
//!
//! 3. The owning thread calls [`MainContext::process_pending`] (or one of
//!    the blocking variants) and each invocation executes in posting order.
//!
//! # Example
//!
//! ```
//! use quadrant_core::MainContext;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! let context = MainContext::new();
//! let handle = context.handle();
//! let ran = Arc::new(AtomicBool::new(false));
//!
//! let ran_clone = ran.clone();
//! std::thread::spawn(move || {
//!     handle.post(move || ran_clone.store(true, Ordering::SeqCst)).unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(context.process_pending(), 1);
//! assert!(ran.load(Ordering::SeqCst));
//! ```

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};

use crate::error::ContextError;
use crate::logging::targets;
use crate::thread_check::ThreadAffinity;

/// A type-erased closure waiting to run on the main context.
pub struct QueuedInvocation {
    invoke: Box<dyn FnOnce() + Send>,
}

impl QueuedInvocation {
    /// Wrap a closure for deferred execution.
    pub fn new<F>(invoke: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            invoke: Box::new(invoke),
        }
    }

    /// Execute the invocation.
    pub fn execute(self) {
        (self.invoke)();
    }
}

impl std::fmt::Debug for QueuedInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedInvocation").finish_non_exhaustive()
    }
}

/// The serialized execution context that owns view state.
///
/// Only the thread that created the context may drain it.
pub struct MainContext {
    sender: Sender<QueuedInvocation>,
    receiver: Receiver<QueuedInvocation>,
    affinity: ThreadAffinity,
}

impl MainContext {
    /// Create a context owned by the current thread.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            affinity: ThreadAffinity::current(),
        }
    }

    /// A cloneable handle that other threads use to post work here.
    pub fn handle(&self) -> ContextHandle {
        ContextHandle {
            sender: self.sender.clone(),
        }
    }

    /// The thread affinity of this context.
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// Whether the calling thread is the one that owns this context.
    pub fn is_owning_thread(&self) -> bool {
        self.affinity.is_same_thread()
    }

    /// Post a closure from the owning thread itself.
    pub fn post<F>(&self, invoke: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // The receiver lives in `self`, so this send cannot fail.
        let _ = self.sender.send(QueuedInvocation::new(invoke));
    }

    /// Number of invocations waiting to run.
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Run every invocation queued at this moment, without blocking.
    ///
    /// Returns the number of invocations executed.
    pub fn process_pending(&self) -> usize {
        self.affinity
            .assert_same_thread_with_msg("MainContext drained from a thread that does not own it");

        let mut processed = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(invocation) => {
                    invocation.execute();
                    processed += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if processed > 0 {
            tracing::trace!(target: targets::CONTEXT, processed, "drained main context");
        }
        processed
    }

    /// Wait up to `timeout` for one invocation and run it.
    ///
    /// Returns `true` if an invocation ran.
    pub fn process_next(&self, timeout: Duration) -> bool {
        self.affinity
            .assert_same_thread_with_msg("MainContext drained from a thread that does not own it");

        match self.receiver.recv_timeout(timeout) {
            Ok(invocation) => {
                invocation.execute();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Keep running invocations until `done` returns `true` or `timeout` elapses.
    ///
    /// `done` is checked before each wait and after each invocation. Returns
    /// the final value of `done`.
    pub fn process_until<F>(&self, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if done() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.process_next(deadline - now);
        }
    }
}

impl Default for MainContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MainContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainContext")
            .field("pending", &self.pending_count())
            .field("thread", &self.affinity.thread_id())
            .finish()
    }
}

/// A cloneable, thread-safe handle for posting to a [`MainContext`].
#[derive(Clone)]
pub struct ContextHandle {
    sender: Sender<QueuedInvocation>,
}

impl ContextHandle {
    /// Queue a closure to run on the owning thread.
    ///
    /// Fails with [`ContextError::Closed`] once the context has been dropped.
    pub fn post<F>(&self, invoke: F) -> Result<(), ContextError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(QueuedInvocation::new(invoke))
            .map_err(|_| ContextError::Closed)
    }
}

impl std::fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextHandle").finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(ContextHandle: Send, Sync);
