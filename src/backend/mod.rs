//! Backend abstraction layer
//!
//! Provides the [`GpuBackend`] trait, native handle types and the value types
//! shared by every backend. [`DummyBackend`] is an in-memory implementation
//! used for tests and headless runs.

pub mod dummy;
pub mod traits;
pub mod types;

pub use dummy::{DummyAdapter, DummyBackend};
pub use traits::*;
pub use types::*;
