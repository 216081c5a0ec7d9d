//! Audio session engine
//!
//! This module provides:
//! - The device audio capability trait consumed by the sessions
//! - The recording session (capture lifecycle, live metering)
//! - Playback sessions with position/duration tracking
//! - A hardware-free simulated device

mod device;
mod playback;
mod recorder;
mod sim;
#[cfg(test)]
pub(crate) mod test_device;

pub use device::{
    AudioDevice, CaptureHandle, FinishedCapture, MeteringCallback, Permission, PlaybackHandle,
    PlaybackStatus, QualityPreset, StatusCallback, DEFAULT_METERING_INTERVAL_MILLIS,
    DEFAULT_PROGRESS_INTERVAL_MILLIS, HIGH_RES_METERING_INTERVAL_MILLIS,
};
pub use playback::{Player, PlayerState};
pub use recorder::{Recorder, RecorderState};
pub use sim::SimulatedDevice;
