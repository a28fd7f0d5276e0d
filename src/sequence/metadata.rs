//! Summary statistics for a sequence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::shot::{Shot, ShotType};

/// Derived facts about a group of shots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SequenceMetadata {
    pub shot_count: usize,
    pub total_duration_ms: u64,
    /// Seconds between the earliest and latest capture.
    pub time_span_secs: f64,
    pub first_capture_ts: Option<f64>,
    pub last_capture_ts: Option<f64>,
    pub shot_type_counts: BTreeMap<ShotType, usize>,
    /// Whether any shot is an on-camera statement.
    pub has_statement: bool,
}

impl SequenceMetadata {
    pub fn from_shots(shots: &[Shot]) -> Self {
        let mut metadata = SequenceMetadata {
            shot_count: shots.len(),
            ..Default::default()
        };

        for shot in shots {
            metadata.total_duration_ms += shot.duration_ms;
            *metadata.shot_type_counts.entry(shot.shot_type).or_insert(0) += 1;
            metadata.has_statement |= shot.is_statement();

            let ts = shot.capture_ts;
            metadata.first_capture_ts = Some(metadata.first_capture_ts.map_or(ts, |f| f.min(ts)));
            metadata.last_capture_ts = Some(metadata.last_capture_ts.map_or(ts, |l| l.max(ts)));
        }

        if let (Some(first), Some(last)) = (metadata.first_capture_ts, metadata.last_capture_ts) {
            metadata.time_span_secs = last - first;
        }
        metadata
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.total_duration_ms as f64 / 1000.0
    }

    pub fn time_span_minutes(&self) -> f64 {
        self.time_span_secs / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata() {
        let shots = vec![
            Shot::builder(1, "s")
                .capture_ts(200.0)
                .duration_ms(4_000)
                .shot_type(ShotType::OnCameraStatement)
                .build(),
            Shot::builder(2, "s")
                .capture_ts(80.0)
                .duration_ms(2_500)
                .shot_type(ShotType::GeneralView)
                .build(),
            Shot::builder(3, "s").capture_ts(140.0).duration_ms(1_000).build(),
        ];
        let metadata = SequenceMetadata::from_shots(&shots);

        assert_eq!(metadata.shot_count, 3);
        assert_eq!(metadata.total_duration_ms, 7_500);
        assert_eq!(metadata.first_capture_ts, Some(80.0));
        assert_eq!(metadata.last_capture_ts, Some(200.0));
        assert!((metadata.time_span_minutes() - 2.0).abs() < 1e-9);
        assert!(metadata.has_statement);
        assert_eq!(metadata.shot_type_counts[&ShotType::Unknown], 1);
    }

    #[test]
    fn test_empty_sequence() {
        let metadata = SequenceMetadata::from_shots(&[]);
        assert_eq!(metadata, SequenceMetadata::default());
        assert_eq!(metadata.first_capture_ts, None);
        assert!(!metadata.has_statement);
    }
}
