//! # RidingMap Core
//!
//! Core types, errors, and utilities shared by the RidingMap crates.
//! Provides the color model, the layered error types, thread-safe
//! shared-state aliases, and the latest-value binding used to feed map
//! inputs into the renderer.

pub mod binding;
pub mod color;
pub mod error;
pub mod types;

pub use binding::{latest, LatestReceiver, LatestSender};
pub use color::{Color, ColorParseError};
pub use error::{Error, GeometryError, RenderError, Result};

pub use types::{thread_safe, Callback, ThreadSafe};
