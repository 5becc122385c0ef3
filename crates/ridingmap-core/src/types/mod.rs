//! Type aliases for shared state.
//!
//! - [`aliases`]: `Arc<Mutex<T>>` alias used by the render caches, and `Callback`.

pub mod aliases;

pub use aliases::*;
