//! Sequence grouping: partitions of shots by location, capture time and
//! visual similarity, with size bounds and a miscellaneous overflow group.

pub mod config;
pub mod dbscan;
pub mod engine;
pub mod filter;
pub mod location;
pub mod metadata;
pub mod method;
pub mod naming;
pub mod temporal;
pub mod visual;

pub use config::SequenceConfig;
pub use engine::{Sequence, SequenceEngine, SequenceSet};
pub use metadata::SequenceMetadata;
pub use method::GroupingMethod;
pub use naming::{MISCELLANEOUS, RawGroups};
