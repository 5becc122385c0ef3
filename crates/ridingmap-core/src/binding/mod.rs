//! # Latest-Value Binding
//!
//! The interface through which map inputs (shape list, focus box, outline,
//! header, border color, viewport size) reach the renderer.
//!
//! A binding is push-based and single-subscriber:
//! - Producers publish values from any thread
//! - Only the most recent unconsumed value is kept; newer values supersede
//!   older ones
//! - A single consumer (the render thread) takes values serially
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ridingmap_core::binding::latest;
//!
//! let (tx, rx) = latest::<String>();
//! tx.publish("first".into());
//! tx.publish("second".into());
//! assert_eq!(rx.take().as_deref(), Some("second"));
//! assert_eq!(rx.take(), None);
//! ```

mod latest;

pub use latest::{latest, LatestReceiver, LatestSender};
