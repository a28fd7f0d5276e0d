//! Top-level pipeline configuration.
//!
//! [`PipelineConfig`] bundles the index, working-set and sequence settings
//! into one serde document. Every section is optional in JSON; missing
//! sections and fields take their defaults.
//!
//! ```
//! use shotpick::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(
//!     r#"{ "sequences": { "max_shots_per_sequence": 6 } }"#,
//! ).unwrap();
//! assert_eq!(config.sequences.max_shots_per_sequence, 6);
//! assert_eq!(config.sequences.min_shots_per_sequence, 2);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::sequence::SequenceConfig;
use crate::vector::IndexConfig;
use crate::working_set::WorkingSetConfig;

/// Configuration for the whole retrieval and grouping pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub index: IndexConfig,
    pub working_set: WorkingSetConfig,
    pub sequences: SequenceConfig,
}

impl PipelineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading pipeline config");
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.index.validate()?;
        self.working_set.validate()?;
        self.sequences.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::ShotpickError;
    use crate::vector::BackendKind;

    #[test]
    fn test_default_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.index.text_dimension, 384);
        assert_eq!(config.working_set.default_max_shots, 50);
        assert_eq!(config.sequences.max_shots_per_sequence, 8);
    }

    #[test]
    fn test_partial_document() {
        let json = r#"{
            "index": { "backend": "hnsw", "hnsw": { "m": 8 } },
            "sequences": { "temporal_window_secs": 120.0 }
        }"#;
        let config = PipelineConfig::from_json_str(json).unwrap();
        assert_eq!(config.index.backend, BackendKind::Hnsw);
        assert_eq!(config.index.hnsw.m, 8);
        assert_eq!(config.index.hnsw.ef_construction, 200);
        assert_eq!(config.sequences.temporal_window_secs, 120.0);
        assert_eq!(config.working_set, WorkingSetConfig::default());
    }

    #[test]
    fn test_invalid_documents() {
        let bounds = r#"{ "sequences": { "min_shots_per_sequence": 5, "max_shots_per_sequence": 3 } }"#;
        assert!(matches!(
            PipelineConfig::from_json_str(bounds),
            Err(ShotpickError::InvalidConfig(_))
        ));

        assert!(matches!(
            PipelineConfig::from_json_str("{ not json"),
            Err(ShotpickError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "working_set": {{ "beat_max_shots": 12 }} }}"#).unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.working_set.beat_max_shots, 12);

        let missing = PipelineConfig::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ShotpickError::Io(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PipelineConfig::default();
        let json = config.to_json_string().unwrap();
        let parsed = PipelineConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.sequences, config.sequences);
    }
}
