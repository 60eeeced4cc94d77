//! Bounded execution of grammar match attempts.
//!
//! Every attempt runs on an elastic pool of named worker threads and carries
//! a [`Deadline`]. The caller waits for the result with a timeout; when the
//! timeout passes it flags the deadline as cancelled and treats the attempt
//! as a non-match. The matchers poll the deadline cooperatively, so an
//! abandoned attempt stops at its next check and its worker returns to the
//! pool.
//!
//! The pool grows on demand up to `max_workers` and idle workers exit after
//! the keep-alive period, leaving no threads behind when the parser is idle.

use log::{debug, warn};
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

const THREAD_NAME_PREFIX: &str = "sciname-worker";

/// Signal raised by [`Deadline::check`] once an attempt must stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl std::fmt::Display for Interrupted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interrupted!")
    }
}

impl std::error::Error for Interrupted {}

/// Expiry instant plus a cancel flag shared with the waiting caller.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Instant,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now() + timeout,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A deadline that never expires on its own.
    pub fn unbounded() -> Self {
        Self::after(Duration::from_secs(60 * 60 * 24 * 365))
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() || Instant::now() >= self.expires_at {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }
}

type Task = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    queue: VecDeque<Task>,
    workers: usize,
    idle: usize,
    spawned: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    available: Condvar,
    max_workers: usize,
    keep_alive: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Elastic pool of worker threads hosting deadline bound tasks.
pub struct WorkerPool {
    shared: Arc<Shared>,
}

impl WorkerPool {
    pub fn new(max_workers: usize, keep_alive: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState {
                    queue: VecDeque::new(),
                    workers: 0,
                    idle: 0,
                    spawned: 0,
                    shutdown: false,
                }),
                available: Condvar::new(),
                max_workers: max_workers.max(1),
                keep_alive,
            }),
        }
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.shared.lock().workers
    }

    fn submit(&self, task: Task) {
        let mut state = self.shared.lock();
        if state.shutdown {
            return;
        }
        state.queue.push_back(task);
        if state.idle == 0 && state.workers < self.shared.max_workers {
            state.workers += 1;
            state.spawned += 1;
            let name = format!("{}-{}", THREAD_NAME_PREFIX, state.spawned);
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(shared));
            match spawned {
                Ok(_) => debug!("Started {}", name),
                Err(e) => {
                    state.workers -= 1;
                    warn!("Failed to start {}: {}", name, e);
                }
            }
        } else {
            self.shared.available.notify_one();
        }
    }

    /// Runs `job` on a worker and waits at most `timeout` for its result.
    ///
    /// Returns `None` when the job timed out, was interrupted or panicked.
    pub fn run_with_deadline<T, F>(&self, timeout: Duration, label: &str, job: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&Deadline) -> Result<T, Interrupted> + Send + 'static,
    {
        let deadline = Deadline::after(timeout);
        let task_deadline = deadline.clone();
        let (tx, rx) = mpsc::channel();
        self.submit(Box::new(move || {
            let _ = tx.send(job(&task_deadline));
        }));

        match rx.recv_timeout(timeout) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(Interrupted)) => {
                warn!("Parsing timeout for: {}", label);
                None
            }
            Err(RecvTimeoutError::Timeout) => {
                deadline.cancel();
                warn!("Parsing timeout for: {}", label);
                None
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Parsing attempt aborted for: {}", label);
                None
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.shutdown = true;
        let discarded = state.queue.len();
        state.queue.clear();
        drop(state);
        self.shared.available.notify_all();
        if discarded > 0 {
            warn!(
                "Shutting down name parser workers, discarding {} queued attempts",
                discarded
            );
        }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    let mut state = shared.lock();
    loop {
        if let Some(task) = state.queue.pop_front() {
            drop(state);
            if catch_unwind(AssertUnwindSafe(task)).is_err() {
                warn!("Grammar attempt panicked");
            }
            state = shared.lock();
            continue;
        }
        if state.shutdown {
            break;
        }
        state.idle += 1;
        let (guard, wait) = shared
            .available
            .wait_timeout(state, shared.keep_alive)
            .unwrap_or_else(PoisonError::into_inner);
        state = guard;
        state.idle -= 1;
        if wait.timed_out() && state.queue.is_empty() {
            break;
        }
    }
    state.workers -= 1;
    debug!(
        "{} exits, {} workers left",
        thread::current().name().unwrap_or(THREAD_NAME_PREFIX),
        state.workers
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_result_within_deadline() {
        let pool = WorkerPool::new(4, Duration::from_millis(50));
        let result = pool.run_with_deadline(Duration::from_secs(5), "sum", |d| {
            d.check()?;
            Ok(21 * 2)
        });
        assert_eq!(result, Some(42));
    }

    #[test]
    fn test_timeout_cancels_cooperative_job() {
        let pool = WorkerPool::new(2, Duration::from_millis(50));
        let started = Instant::now();
        let result: Option<()> = pool.run_with_deadline(Duration::from_millis(20), "spin", |d| {
            loop {
                d.check()?;
                thread::sleep(Duration::from_millis(1));
            }
        });
        assert_eq!(result, None);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_panicking_job_is_a_non_match() {
        let pool = WorkerPool::new(1, Duration::from_millis(50));
        let result: Option<u8> =
            pool.run_with_deadline(Duration::from_secs(5), "boom", |_| panic!("boom"));
        assert_eq!(result, None);
        // the worker survives and serves the next attempt
        let result = pool.run_with_deadline(Duration::from_secs(5), "ok", |_| Ok(1u8));
        assert_eq!(result, Some(1));
    }

    #[test]
    fn test_idle_workers_exit() {
        let pool = WorkerPool::new(3, Duration::from_millis(20));
        let _ = pool.run_with_deadline(Duration::from_secs(5), "one", |_| Ok(()));
        let deadline = Instant::now() + Duration::from_secs(5);
        while pool.worker_count() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn test_deadline_cancel_flag() {
        let deadline = Deadline::unbounded();
        assert!(deadline.check().is_ok());
        deadline.clone().cancel();
        assert_eq!(deadline.check(), Err(Interrupted));
    }
}
