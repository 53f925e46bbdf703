//! Background task execution pool.
//!
//! Asset loads run here so that `AssetManager::load` never blocks the caller.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use async_executor::{Executor, Task};

/// A thread pool for executing async tasks.
///
/// # Example
///
/// ```
/// use ares_core::TaskPool;
///
/// let pool = TaskPool::new(2);
/// let task = pool.spawn(async { 40 + 2 });
/// assert_eq!(futures_lite::future::block_on(task), 42);
/// ```
pub struct TaskPool {
    executor: Arc<Executor<'static>>,
    threads: Vec<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl TaskPool {
    /// Create a new task pool with the specified number of threads.
    ///
    /// # Panics
    ///
    /// Panics if `num_threads` is 0 or a worker thread cannot be spawned.
    pub fn new(num_threads: usize) -> Self {
        assert!(num_threads > 0, "TaskPool must have at least one thread");

        let executor = Arc::new(Executor::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut threads = Vec::with_capacity(num_threads);

        for i in 0..num_threads {
            let exec = executor.clone();
            let shutdown_flag = shutdown.clone();

            let handle = thread::Builder::new()
                .name(format!("ares-task-{}", i))
                .spawn(move || {
                    while !shutdown_flag.load(Ordering::Relaxed) {
                        if !exec.try_tick() {
                            thread::sleep(Duration::from_millis(1));
                        }
                    }
                })
                .expect("Failed to spawn task pool thread");

            threads.push(handle);
        }

        tracing::debug!("TaskPool created with {} threads", num_threads);

        Self {
            executor,
            threads,
            shutdown,
        }
    }

    /// Create a task pool with `max(1, num_cpus - 1)` threads, leaving one
    /// core for the main thread.
    pub fn default_threads() -> Self {
        let num_threads = (num_cpus::get().saturating_sub(1)).max(1);
        Self::new(num_threads)
    }

    /// Spawn an async task on the pool.
    ///
    /// Dropping the returned `Task` cancels it; call `detach()` to let it run
    /// to completion in the background.
    pub fn spawn<T>(&self, future: impl Future<Output = T> + Send + 'static) -> Task<T>
    where
        T: Send + 'static,
    {
        self.executor.spawn(future)
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Whether `shutdown` has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Stop the worker threads and wait for them to exit.
    ///
    /// Tasks that have not been polled to completion by then are dropped.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if self.threads.is_empty() {
            return;
        }

        tracing::debug!("Shutting down TaskPool with {} threads", self.threads.len());
        self.shutdown.store(true, Ordering::Relaxed);

        for handle in std::mem::take(&mut self.threads) {
            if let Err(e) = handle.join() {
                tracing::error!("Task pool thread panicked: {:?}", e);
            }
        }
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::default_threads()
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("threads", &self.threads.len())
            .field("shutdown", &self.is_shutting_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_pool_creation() {
        let pool = TaskPool::new(2);
        assert_eq!(pool.thread_count(), 2);
    }

    #[test]
    fn test_spawn_and_await() {
        let pool = TaskPool::new(2);
        let task = pool.spawn(async { 42 });
        assert_eq!(pollster::block_on(task), 42);
    }

    #[test]
    fn test_multiple_tasks() {
        let pool = TaskPool::new(4);

        let tasks: Vec<_> = (0..10).map(|i| pool.spawn(async move { i * 2 })).collect();
        let results: Vec<_> = tasks.into_iter().map(pollster::block_on).collect();

        assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
    }

    #[test]
    fn test_detached_task_runs() {
        let pool = TaskPool::new(1);
        let (tx, rx) = std::sync::mpsc::channel();
        pool.spawn(async move {
            tx.send(7).unwrap();
        })
        .detach();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    }

    #[test]
    #[should_panic(expected = "TaskPool must have at least one thread")]
    fn test_zero_threads_panics() {
        TaskPool::new(0);
    }

    #[test]
    fn test_shutdown() {
        let pool = TaskPool::new(2);
        let _task = pool.spawn(async { 1 });
        pool.shutdown();
    }
}
