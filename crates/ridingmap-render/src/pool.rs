//! Worker pool for CPU-bound cache jobs and the repaint signal channel.

use parking_lot::{Condvar, Mutex};
use ridingmap_core::RenderError;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Runtime};
use tokio::task::AbortHandle;

/// Which cache produced a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Transform,
    Merge,
}

/// Signal sent by a worker after it commits a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepaintRequest {
    pub cache: CacheKind,
}

/// Channel carrying repaint requests from workers to the render thread.
pub fn repaint_channel() -> (Sender<RepaintRequest>, Receiver<RepaintRequest>) {
    mpsc::channel()
}

#[derive(Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

/// Decrements the in-flight count when dropped, even for aborted jobs that
/// never started.
struct JobGuard {
    in_flight: Arc<InFlight>,
}

impl JobGuard {
    fn new(in_flight: Arc<InFlight>) -> Self {
        *in_flight.count.lock() += 1;
        Self { in_flight }
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        let mut count = self.in_flight.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.in_flight.idle.notify_all();
        }
    }
}

/// Multi-threaded executor for simplify and merge jobs.
pub struct WorkerPool {
    runtime: Runtime,
    in_flight: Arc<InFlight>,
    max_threads: usize,
}

impl WorkerPool {
    /// Start a pool with at most `max_threads` concurrent jobs.
    pub fn new(max_threads: usize) -> Result<Self, RenderError> {
        let max_threads = max_threads.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(max_threads)
            .thread_name("ridingmap-worker")
            .build()
            .map_err(|e| RenderError::WorkerPool {
                reason: e.to_string(),
            })?;

        tracing::debug!("Worker pool started with {} threads", max_threads);
        Ok(Self {
            runtime,
            in_flight: Arc::new(InFlight::default()),
            max_threads,
        })
    }

    /// Submit a job. The returned handle prevents the job from starting if
    /// aborted before a thread picks it up.
    pub fn spawn<F>(&self, job: F) -> AbortHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = JobGuard::new(Arc::clone(&self.in_flight));
        let handle = self.runtime.spawn_blocking(move || {
            let _guard = guard;
            job();
        });
        handle.abort_handle()
    }

    /// Jobs submitted and not yet finished or discarded.
    pub fn in_flight(&self) -> usize {
        *self.in_flight.count.lock()
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Block until no job is in flight. Returns false on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.in_flight.count.lock();
        while *count > 0 {
            if self
                .in_flight
                .idle
                .wait_until(&mut count, deadline)
                .timed_out()
            {
                return *count == 0;
            }
        }
        true
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("max_threads", &self.max_threads)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
