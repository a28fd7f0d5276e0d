//! Working sets: bounded, ranked candidate shots for one query.
//!
//! # Module Structure
//!
//! - `config`: weights, bonuses and size limits
//! - `scorer`: the [`ShotScore`] value type and [`HybridScorer`]
//! - `builder`: [`WorkingSetBuilder`] and the [`WorkingSet`] it returns

pub mod builder;
pub mod config;
pub mod scorer;

pub use self::builder::{BeatContext, WorkingSet, WorkingSetBuilder, beat_query};
pub use self::config::WorkingSetConfig;
pub use self::scorer::{HybridScorer, ScoringMode, ShotScore};
