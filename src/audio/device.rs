//! Device audio capability consumed by the session engine.
//!
//! The engine never talks to audio hardware directly; it drives an
//! [`AudioDevice`] implementation that performs capture and playback
//! and reports back through registered callbacks. Callbacks may arrive
//! from a device-owned thread, so anything they touch is mutex-guarded.

use std::sync::Arc;

use crate::error::AudioError;

/// Metering tick interval for the standard live visualization
pub const DEFAULT_METERING_INTERVAL_MILLIS: u64 = 100;

/// Metering tick interval for high-resolution visualization (~60 Hz)
pub const HIGH_RES_METERING_INTERVAL_MILLIS: u64 = 1000 / 60;

/// Playback status tick interval (~60 Hz)
pub const DEFAULT_PROGRESS_INTERVAL_MILLIS: u64 = 1000 / 60;

/// Result of a capture permission request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Capture quality preset forwarded to the device
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QualityPreset {
    #[default]
    High,
    Low,
}

/// What the device hands back when a capture is finalized
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishedCapture {
    /// Opaque locator for the captured audio resource
    pub uri: String,
    pub duration_millis: u64,
}

/// One playback status tick from the device
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackStatus {
    pub position_millis: u64,
    /// None while the device has not yet determined the duration
    pub duration_millis: Option<u64>,
    pub is_playing: bool,
    /// Set once, on the tick where playback reaches the end
    pub did_finish: bool,
}

/// Receives one amplitude sample (dB) per metering tick
pub type MeteringCallback = Arc<dyn Fn(f32) + Send + Sync>;

/// Receives playback status ticks
pub type StatusCallback = Arc<dyn Fn(PlaybackStatus) + Send + Sync>;

/// Platform audio layer as seen by the engine
pub trait AudioDevice: Send + Sync {
    /// Ask the platform for recording permission. May block on a
    /// user prompt.
    fn request_capture_permission(&self) -> Result<Permission, AudioError>;

    /// Toggle the process-wide recording audio mode
    fn configure_for_capture(&self, enable: bool) -> Result<(), AudioError>;

    /// Begin capturing. The device emits one amplitude sample through
    /// `on_metering` every `metering_interval_millis` until the handle
    /// is stopped.
    fn start_capture(
        &self,
        preset: QualityPreset,
        metering_interval_millis: u64,
        on_metering: MeteringCallback,
    ) -> Result<Box<dyn CaptureHandle>, AudioError>;

    /// Load a resource for playback. The device emits status through
    /// `on_status` while the handle is alive.
    fn load_for_playback(
        &self,
        uri: &str,
        progress_interval_millis: u64,
        on_status: StatusCallback,
    ) -> Result<Box<dyn PlaybackHandle>, AudioError>;
}

/// An in-progress capture. Stopping consumes the handle; the device
/// finalizes the resource and stops emitting metering ticks.
pub trait CaptureHandle: Send {
    fn stop(self: Box<Self>) -> Result<FinishedCapture, AudioError>;
}

/// A loaded playback resource
pub trait PlaybackHandle: Send {
    fn play(&self) -> Result<(), AudioError>;
    fn pause(&self) -> Result<(), AudioError>;
    fn seek(&self, position_millis: u64) -> Result<(), AudioError>;
    /// Release the decoder resource and stop status ticks
    fn unload(&mut self);
}
