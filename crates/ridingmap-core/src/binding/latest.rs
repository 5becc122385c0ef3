//! Latest-value binding implementation.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::types::Callback;

struct Inner<T> {
    value: Mutex<Option<T>>,
    /// Count of values published so far, including superseded ones.
    published: AtomicU64,
    notifier: Mutex<Option<Callback>>,
    receiver_alive: AtomicBool,
}

/// Producer half of a latest-value binding. Cloning shares the slot.
pub struct LatestSender<T> {
    inner: Arc<Inner<T>>,
}

/// Consumer half of a latest-value binding. There is exactly one.
pub struct LatestReceiver<T> {
    inner: Arc<Inner<T>>,
}

/// Create a connected sender/receiver pair with an empty slot.
pub fn latest<T>() -> (LatestSender<T>, LatestReceiver<T>) {
    let inner = Arc::new(Inner {
        value: Mutex::new(None),
        published: AtomicU64::new(0),
        notifier: Mutex::new(None),
        receiver_alive: AtomicBool::new(true),
    });
    (
        LatestSender {
            inner: Arc::clone(&inner),
        },
        LatestReceiver { inner },
    )
}

impl<T> LatestSender<T> {
    /// Publish a value, replacing any value the consumer has not taken yet.
    ///
    /// Returns true if an unconsumed value was superseded.
    pub fn publish(&self, value: T) -> bool {
        let superseded = self.inner.value.lock().replace(value).is_some();
        self.inner.published.fetch_add(1, Ordering::Relaxed);
        if superseded {
            tracing::trace!("Unconsumed binding value superseded");
        }

        // Notifier runs outside the value lock.
        if let Some(notify) = self.inner.notifier.lock().as_ref() {
            notify();
        }
        superseded
    }

    /// True when the consumer half has been dropped.
    pub fn is_closed(&self) -> bool {
        !self.inner.receiver_alive.load(Ordering::Acquire)
    }
}

impl<T> Clone for LatestSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> LatestReceiver<T> {
    /// Take the most recent unconsumed value, if any.
    pub fn take(&self) -> Option<T> {
        self.inner.value.lock().take()
    }

    /// True when a value is waiting to be taken.
    pub fn has_pending(&self) -> bool {
        self.inner.value.lock().is_some()
    }

    /// Total number of values published, including superseded ones.
    pub fn published_count(&self) -> u64 {
        self.inner.published.load(Ordering::Relaxed)
    }

    /// Install a callback invoked on every publish, e.g. to wake a render loop.
    pub fn set_notifier<F>(&self, notify: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.inner.notifier.lock() = Some(Box::new(notify));
    }
}

impl<T> Drop for LatestReceiver<T> {
    fn drop(&mut self) {
        self.inner.receiver_alive.store(false, Ordering::Release);
    }
}

impl<T> std::fmt::Debug for LatestReceiver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestReceiver")
            .field("pending", &self.has_pending())
            .field("published", &self.published_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_latest_value_wins() {
        let (tx, rx) = latest();
        assert!(!tx.publish(1));
        assert!(tx.publish(2));
        assert!(rx.has_pending());
        assert_eq!(rx.take(), Some(2));
        assert_eq!(rx.take(), None);
        assert_eq!(rx.published_count(), 2);
    }

    #[test]
    fn test_notifier_called_per_publish() {
        let (tx, rx) = latest::<u8>();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        rx.set_notifier(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        tx.publish(1);
        tx.clone().publish(2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_sender_sees_closed_receiver() {
        let (tx, rx) = latest::<u8>();
        assert!(!tx.is_closed());
        drop(rx);
        assert!(tx.is_closed());
    }

    #[test]
    fn test_publish_from_other_thread() {
        let (tx, rx) = latest::<String>();
        std::thread::spawn(move || {
            tx.publish("from worker".to_string());
        })
        .join()
        .unwrap();
        assert_eq!(rx.take().as_deref(), Some("from worker"));
    }
}
