//! Type aliases for thread-safe shared state.
//!
//! The render caches are written from worker threads and read from the
//! render thread, so everything here is `Arc` + `parking_lot` based.
//!
//! ```rust,ignore
//! use ridingmap_core::types::*;
//!
//! let state: ThreadSafe<Vec<u64>> = thread_safe(Vec::new());
//! state.lock().push(1);
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex`, which does not poison when a worker panics.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A simple callback with no parameters or return value.
///
/// Thread-safe, suitable for cross-thread wake-up notification.
pub type Callback = Box<dyn Fn() + Send + Sync>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}
