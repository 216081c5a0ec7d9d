//! Murmur - a voice note capture and playback engine
//!
//! The engine owns the state machines for recording and playback, the
//! live metering pipeline, and the waveform bucketization used to draw
//! fixed-width amplitude bars. It talks to the platform audio layer
//! through the [`audio::AudioDevice`] capability, so any presentation
//! layer (or the bundled simulated device) can drive it.

pub mod audio;
pub mod cli;
pub mod error;
pub mod library;
pub mod metering;
pub mod models;
pub mod waveform;

pub use audio::{
    AudioDevice, Player, PlayerState, Recorder, RecorderState, SimulatedDevice,
};
pub use error::AudioError;
pub use library::NoteLibrary;
pub use metering::MeteringBuffer;
pub use models::Note;
