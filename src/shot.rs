//! The shot model shared by retrieval and sequence grouping.
//!
//! A [`Shot`] is one continuous camera take. Shots are immutable once built;
//! scores computed for a request live beside them (see
//! [`crate::working_set::scorer::ShotScore`]) rather than inside them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Story-scoped shot identifier.
pub type ShotId = u64;

/// Story identifier (slug).
pub type StoryId = String;

/// Editorial classification of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
pub enum ShotType {
    /// Someone speaking to camera (sound on tape).
    #[serde(rename = "SOT")]
    OnCameraStatement,
    /// Establishing / general view.
    #[serde(rename = "GV")]
    GeneralView,
    /// Cutaway or insert.
    #[serde(rename = "CUTAWAY")]
    Cutaway,
    /// Not classified.
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl ShotType {
    /// Short label used in logs and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShotType::OnCameraStatement => "SOT",
            ShotType::GeneralView => "GV",
            ShotType::Cutaway => "CUTAWAY",
            ShotType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShotType {
    type Err = std::convert::Infallible;

    /// Parsing never fails; unrecognised labels map to [`ShotType::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "SOT" | "ON_CAMERA_STATEMENT" | "STATEMENT" => ShotType::OnCameraStatement,
            "GV" | "GENERAL_VIEW" => ShotType::GeneralView,
            "CUTAWAY" => ShotType::Cutaway,
            _ => ShotType::Unknown,
        })
    }
}

impl<'de> Deserialize<'de> for ShotType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(label.parse().unwrap_or_default())
    }
}

/// Optional enriched visual description of a shot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualDescriptors {
    pub shot_size: Option<String>,
    pub composition: Option<String>,
    pub camera_movement: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    pub quality: Option<String>,
}

impl VisualDescriptors {
    /// All descriptors joined into a single space-separated string.
    pub fn describe(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for value in [
            &self.shot_size,
            &self.composition,
            &self.camera_movement,
            &self.quality,
        ]
        .into_iter()
        .flatten()
        {
            parts.push(value.as_str());
        }
        parts.extend(self.subjects.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// A continuous camera take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: ShotId,
    pub story_id: StoryId,
    pub source_path: String,
    /// Capture time in seconds since the Unix epoch.
    pub capture_ts: f64,
    pub tc_in: String,
    pub tc_out: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub shot_type: ShotType,
    pub location: Option<String>,
    #[serde(default)]
    pub has_face: bool,
    #[serde(default)]
    pub transcript: String,
    pub transcript_summary: Option<String>,
    /// Free-form scene description produced during ingest.
    pub context: Option<String>,
    pub visual: Option<VisualDescriptors>,
    pub text_embedding: Option<Vec<f32>>,
    pub visual_embedding: Option<Vec<f32>>,
}

impl Shot {
    /// Start building a shot with the given id and story.
    pub fn builder(id: ShotId, story_id: impl Into<StoryId>) -> ShotBuilder {
        ShotBuilder::new(id, story_id)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    /// Capture time as a UTC timestamp, if representable.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        if !self.capture_ts.is_finite() {
            return None;
        }
        let secs = self.capture_ts.floor();
        let nanos = ((self.capture_ts - secs) * 1e9).round() as u32;
        DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
    }

    /// The trimmed location label, or `None` when absent or blank.
    pub fn location_label(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }

    pub fn is_statement(&self) -> bool {
        self.shot_type == ShotType::OnCameraStatement
    }

    /// Descriptive text used for coarse indoor/outdoor signals.
    pub(crate) fn context_text(&self) -> String {
        let mut text = self.context.clone().unwrap_or_default();
        if let Some(visual) = &self.visual {
            let described = visual.describe();
            if !described.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&described);
            }
        }
        text.to_lowercase()
    }
}

/// Builder for [`Shot`].
#[derive(Debug, Clone)]
pub struct ShotBuilder {
    shot: Shot,
}

impl ShotBuilder {
    pub fn new(id: ShotId, story_id: impl Into<StoryId>) -> Self {
        Self {
            shot: Shot {
                id,
                story_id: story_id.into(),
                source_path: String::new(),
                capture_ts: 0.0,
                tc_in: "00:00:00:00".to_string(),
                tc_out: "00:00:00:00".to_string(),
                duration_ms: 0,
                shot_type: ShotType::Unknown,
                location: None,
                has_face: false,
                transcript: String::new(),
                transcript_summary: None,
                context: None,
                visual: None,
                text_embedding: None,
                visual_embedding: None,
            },
        }
    }

    pub fn source_path(mut self, path: impl Into<String>) -> Self {
        self.shot.source_path = path.into();
        self
    }

    pub fn capture_ts(mut self, ts: f64) -> Self {
        self.shot.capture_ts = ts;
        self
    }

    pub fn timecode(mut self, tc_in: impl Into<String>, tc_out: impl Into<String>) -> Self {
        self.shot.tc_in = tc_in.into();
        self.shot.tc_out = tc_out.into();
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.shot.duration_ms = duration_ms;
        self
    }

    pub fn shot_type(mut self, shot_type: ShotType) -> Self {
        self.shot.shot_type = shot_type;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.shot.location = Some(location.into());
        self
    }

    pub fn has_face(mut self, has_face: bool) -> Self {
        self.shot.has_face = has_face;
        self
    }

    pub fn transcript(mut self, transcript: impl Into<String>) -> Self {
        self.shot.transcript = transcript.into();
        self
    }

    pub fn transcript_summary(mut self, summary: impl Into<String>) -> Self {
        self.shot.transcript_summary = Some(summary.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.shot.context = Some(context.into());
        self
    }

    pub fn visual(mut self, visual: VisualDescriptors) -> Self {
        self.shot.visual = Some(visual);
        self
    }

    pub fn text_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.shot.text_embedding = Some(embedding);
        self
    }

    pub fn visual_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.shot.visual_embedding = Some(embedding);
        self
    }

    pub fn build(self) -> Shot {
        self.shot
    }
}
