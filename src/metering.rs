//! Amplitude metering buffer for an active recording.
//!
//! Device metering callbacks append here from their own thread; the
//! presentation layer snapshots the contents every tick for the live
//! waveform, and the recorder freezes one final snapshot into the
//! finished note.

use std::sync::{Arc, Mutex};

use crate::waveform::SILENCE_FLOOR_DB;

/// Shared append-only store of amplitude samples (dB) - thread-safe
#[derive(Clone, Default)]
pub struct MeteringBuffer {
    inner: Arc<Mutex<Vec<f32>>>,
}

impl MeteringBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear to empty; called when a capture becomes active
    pub fn reset(&self) {
        self.inner.lock().unwrap().clear();
    }

    /// Append one sample, clamped to the [-160, 0] dB amplitude range.
    /// Non-finite input is treated as the silence floor.
    pub fn append(&self, amplitude_db: f32) {
        let sample = if amplitude_db.is_finite() {
            amplitude_db.clamp(SILENCE_FLOOR_DB, 0.0)
        } else {
            SILENCE_FLOOR_DB
        };
        self.inner.lock().unwrap().push(sample);
    }

    /// Read-only copy of the current contents
    pub fn snapshot(&self) -> Vec<f32> {
        self.inner.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}
