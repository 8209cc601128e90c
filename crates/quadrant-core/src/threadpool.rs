//! Thread pool for background evaluation and search.
//!
//! A rayon pool with work-stealing scheduling. Results never come back
//! through a handle: each task carries a callback that is posted to a
//! [`MainContext`](crate::MainContext) and runs there, on the thread that
//! owns the displayed state.
//!
//! # Example
//!
//! ```
//! use quadrant_core::MainContext;
//! use quadrant_core::threadpool::{ThreadPool, ThreadPoolConfig};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! let context = MainContext::new();
//! let pool = ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap();
//! let applied = Arc::new(AtomicUsize::new(0));
//!
//! let applied_clone = applied.clone();
//! pool.spawn_with_callback(
//!     || 6 * 7,
//!     &context.handle(),
//!     move |value| applied_clone.store(value, Ordering::SeqCst),
//! );
//! context.process_until(Duration::from_secs(2), || applied.load(Ordering::SeqCst) == 42);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use rayon::{ThreadPool as RayonThreadPool, ThreadPoolBuilder};

use crate::context::ContextHandle;
use crate::error::{CoreError, ThreadPoolError};
use crate::logging::targets;

/// Global thread pool instance.
static GLOBAL_POOL: OnceLock<Arc<ThreadPool>> = OnceLock::new();

/// Configuration for creating a thread pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPoolConfig {
    /// Number of worker threads. `None` means use the number of CPU cores.
    pub num_threads: Option<usize>,
    /// Name prefix for worker threads.
    pub thread_name: String,
    /// Stack size for worker threads in bytes.
    pub stack_size: Option<usize>,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name: "quadrant-worker".to_string(),
            stack_size: None,
        }
    }
}

impl ThreadPoolConfig {
    /// Create a new configuration with custom thread count.
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
            ..Default::default()
        }
    }
}

/// A pool of worker threads for evaluation and search work.
pub struct ThreadPool {
    pool: RayonThreadPool,
    active_tasks: Arc<AtomicUsize>,
}

impl ThreadPool {
    /// Get the global thread pool, creating it with default settings on first use.
    ///
    /// # Panics
    ///
    /// Panics if the default pool cannot be created.
    pub fn global() -> Arc<ThreadPool> {
        GLOBAL_POOL
            .get_or_init(|| {
                Arc::new(
                    ThreadPool::new(ThreadPoolConfig::default())
                        .expect("failed to create global thread pool"),
                )
            })
            .clone()
    }

    /// Initialize the global thread pool with custom configuration.
    ///
    /// Returns an error if the pool has already been initialized.
    pub fn init_global(config: ThreadPoolConfig) -> Result<Arc<ThreadPool>, CoreError> {
        let pool = Arc::new(ThreadPool::new(config)?);
        GLOBAL_POOL
            .set(pool.clone())
            .map_err(|_| ThreadPoolError::AlreadyInitialized)?;
        Ok(pool)
    }

    /// Create a new thread pool with the given configuration.
    pub fn new(config: ThreadPoolConfig) -> Result<Self, CoreError> {
        let thread_name = config.thread_name.clone();
        let mut builder =
            ThreadPoolBuilder::new().thread_name(move |index| format!("{thread_name}-{index}"));

        if let Some(num_threads) = config.num_threads {
            builder = builder.num_threads(num_threads);
        }

        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let pool = builder
            .build()
            .map_err(|e| ThreadPoolError::CreationFailed(e.to_string()))?;

        tracing::debug!(
            target: targets::THREADPOOL,
            threads = pool.current_num_threads(),
            name = %config.thread_name,
            "thread pool created"
        );

        Ok(Self {
            pool,
            active_tasks: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Get the number of threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Get the number of currently active (queued or running) tasks.
    pub fn active_tasks(&self) -> usize {
        self.active_tasks.load(Ordering::Acquire)
    }

    /// Spawn a task and deliver its result to a main context.
    ///
    /// The callback runs on the context's owning thread when it next drains
    /// its queue. If the context has been closed, the result is dropped.
    pub fn spawn_with_callback<F, T, C>(&self, task: F, context: &ContextHandle, callback: C)
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        self.active_tasks.fetch_add(1, Ordering::AcqRel);
        let active_tasks = self.active_tasks.clone();
        let context = context.clone();

        self.pool.spawn(move || {
            let result = task();

            if let Err(err) = context.post(move || callback(result)) {
                tracing::debug!(target: targets::THREADPOOL, %err, "dropping task result");
            }

            active_tasks.fetch_sub(1, Ordering::AcqRel);
        });
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.num_threads())
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}
