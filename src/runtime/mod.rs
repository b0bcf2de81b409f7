//! Process-level setup for applications built on this crate.
//!
//! The library never installs a subscriber on its own; binaries and tests
//! call [`setup_tracing`] once at startup.

pub mod tracing;

pub use tracing::*;
