//! Storage collaborator for shot records.
//!
//! The core reads shots through the [`ShotStore`] trait and never owns the
//! backing database. [`MemoryShotStore`] is the in-process implementation
//! used by tests, benches and offline runs.

pub mod memory;
pub mod traits;

pub use self::memory::MemoryShotStore;
pub use self::traits::ShotStore;
