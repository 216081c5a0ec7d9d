use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed voice note: where the audio lives, its full metering
/// history, and how long it runs.
///
/// Immutable once created; the library owns it after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    /// Opaque resource locator reported by the device at stop
    pub audio_uri: String,
    /// Amplitude samples (dB) accumulated while the note was recorded
    pub metering: Vec<f32>,
    pub created_at: DateTime<Utc>,
    pub duration_millis: u64,
}

impl Note {
    pub fn new(audio_uri: String, metering: Vec<f32>, duration_millis: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            audio_uri,
            metering,
            created_at: Utc::now(),
            duration_millis,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_millis as f64 / 1000.0
    }
}

/// Format a millisecond count as a `m:ss` clock string for list display
pub fn format_millis(millis: u64) -> String {
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}
