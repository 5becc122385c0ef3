//! Generic memo whose values are computed on the worker pool.
//!
//! Each key maps to a slot that moves from `Pending` to `Ready` or `Failed`
//! exactly once per generation. [`AsyncMemo::clear`] bumps the generation,
//! drops every slot and cancels in-flight jobs; a job that finishes anyway
//! sees the new generation (or its cancel flag) and discards its result.

use ridingmap_core::{thread_safe, ThreadSafe};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::{trace, warn};

use crate::pool::{CacheKind, RepaintRequest, WorkerPool};

/// Outcome of looking up a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<V> {
    Ready(V),
    /// A job is scheduled or running.
    Pending,
    /// The job panicked; not retried until the memo is cleared.
    Failed,
}

impl<V> Resolution<V> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Resolution::Failed)
    }

    pub fn ready(self) -> Option<V> {
        match self {
            Resolution::Ready(value) => Some(value),
            _ => None,
        }
    }
}

struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    /// Attached once the pool has accepted the job.
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }
}

enum Slot<V> {
    Pending(TaskHandle),
    Ready(V),
    Failed,
}

struct MemoState<K, V> {
    generation: u64,
    slots: HashMap<K, Slot<V>>,
    /// Jobs scheduled over the memo's lifetime.
    scheduled: u64,
}

/// Snapshot of slot counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub ready: usize,
    pub pending: usize,
    pub failed: usize,
}

/// Key to value memo filled by background jobs.
pub struct AsyncMemo<K, V> {
    kind: CacheKind,
    state: ThreadSafe<MemoState<K, V>>,
    repaint: Sender<RepaintRequest>,
}

impl<K, V> AsyncMemo<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Clone + Send + 'static,
{
    pub fn new(kind: CacheKind, repaint: Sender<RepaintRequest>) -> Self {
        Self {
            kind,
            state: thread_safe(MemoState {
                generation: 0,
                slots: HashMap::new(),
                scheduled: 0,
            }),
            repaint,
        }
    }

    /// Return the stored value for `key`, or schedule `compute` on the pool.
    ///
    /// At most one job per key is scheduled per generation; later calls see
    /// `Pending` until it commits.
    pub fn resolve<F>(&self, key: K, pool: &WorkerPool, compute: F) -> Resolution<V>
    where
        F: FnOnce() -> V + Send + 'static,
    {
        let (job, cancelled) = {
            let mut state = self.state.lock();
            match state.slots.get(&key) {
                Some(Slot::Ready(value)) => return Resolution::Ready(value.clone()),
                Some(Slot::Pending(_)) => return Resolution::Pending,
                Some(Slot::Failed) => return Resolution::Failed,
                None => {}
            }

            let cancelled = Arc::new(AtomicBool::new(false));
            let job = Job {
                kind: self.kind,
                key: key.clone(),
                generation: state.generation,
                cancelled: Arc::clone(&cancelled),
                state: Arc::clone(&self.state),
                repaint: self.repaint.clone(),
            };
            state.slots.insert(
                key.clone(),
                Slot::Pending(TaskHandle {
                    cancelled: Arc::clone(&cancelled),
                    abort: None,
                }),
            );
            state.scheduled += 1;
            (job, cancelled)
        };

        // Spawning may start a thread, so it happens with the memo unlocked.
        let abort = pool.spawn(move || job.run(compute));

        let mut state = self.state.lock();
        match state.slots.get_mut(&key) {
            Some(Slot::Pending(task)) if Arc::ptr_eq(&task.cancelled, &cancelled) => {
                task.abort = Some(abort);
            }
            // Committed already, or cleared before the handle existed.
            _ => {
                if cancelled.load(Ordering::Acquire) {
                    abort.abort();
                }
            }
        }
        Resolution::Pending
    }

    /// Current value without scheduling anything.
    pub fn peek(&self, key: &K) -> Option<Resolution<V>> {
        self.state.lock().slots.get(key).map(|slot| match slot {
            Slot::Ready(value) => Resolution::Ready(value.clone()),
            Slot::Pending(_) => Resolution::Pending,
            Slot::Failed => Resolution::Failed,
        })
    }

    /// Drop every slot and cancel in-flight jobs. Returns the number of
    /// jobs cancelled.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        state.generation += 1;
        let mut cancelled = 0;
        for (_, slot) in state.slots.drain() {
            if let Slot::Pending(task) = slot {
                task.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().slots.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Total jobs scheduled since construction.
    pub fn scheduled_count(&self) -> u64 {
        self.state.lock().scheduled
    }

    pub fn stats(&self) -> MemoStats {
        let state = self.state.lock();
        let mut stats = MemoStats::default();
        for slot in state.slots.values() {
            match slot {
                Slot::Ready(_) => stats.ready += 1,
                Slot::Pending(_) => stats.pending += 1,
                Slot::Failed => stats.failed += 1,
            }
        }
        stats
    }
}

impl<K, V> Drop for AsyncMemo<K, V> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.generation += 1;
        for (_, slot) in state.slots.drain() {
            if let Slot::Pending(task) = slot {
                task.cancel();
            }
        }
    }
}

/// Everything a background job needs to commit its result.
struct Job<K, V> {
    kind: CacheKind,
    key: K,
    generation: u64,
    cancelled: Arc<AtomicBool>,
    state: ThreadSafe<MemoState<K, V>>,
    repaint: Sender<RepaintRequest>,
}

impl<K, V> Job<K, V>
where
    K: Eq + Hash + Debug,
{
    fn run<F>(self, compute: F)
    where
        F: FnOnce() -> V,
    {
        if self.cancelled.load(Ordering::Acquire) {
            trace!("{:?} job for {:?} cancelled before start", self.kind, self.key);
            return;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(compute));

        let mut state = self.state.lock();
        if self.cancelled.load(Ordering::Acquire) || state.generation != self.generation {
            trace!(
                "Discarding stale {:?} result for {:?} (generation {} -> {})",
                self.kind,
                self.key,
                self.generation,
                state.generation
            );
            return;
        }

        let slot = match outcome {
            Ok(value) => Slot::Ready(value),
            Err(payload) => {
                warn!(
                    "{:?} job for {:?} failed: {}",
                    self.kind,
                    self.key,
                    panic_message(payload.as_ref())
                );
                Slot::Failed
            }
        };
        state.slots.insert(self.key, slot);
        drop(state);

        // The receiver is gone once the view is dropped.
        let _ = self.repaint.send(RepaintRequest { cache: self.kind });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
