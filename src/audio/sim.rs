//! Simulated audio device.
//!
//! Implements the device capability without audio hardware: capture
//! emits a synthetic amplitude envelope and finalizes to a sine-tone
//! WAV file; playback advances a position clock against a WAV file's
//! real duration. Each handle owns a worker thread driven by a command
//! channel. Used by the demo binary and anywhere a deterministic,
//! hardware-free device is wanted.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use hound::{WavSpec, WavWriter};
use log::{debug, info};

use crate::audio::device::{
    AudioDevice, CaptureHandle, FinishedCapture, MeteringCallback, Permission, PlaybackHandle,
    PlaybackStatus, QualityPreset, StatusCallback,
};
use crate::error::AudioError;

const SAMPLE_RATE: u32 = 16_000;
const TONE_HZ: f32 = 440.0;

/// Hardware-free device: synthetic metering, WAV-backed durations
pub struct SimulatedDevice {
    recordings_dir: PathBuf,
    deny_permission: bool,
    capture_busy: Arc<AtomicBool>,
    recording_mode: Arc<AtomicBool>,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        let recordings_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("murmur")
            .join("recordings");
        Self {
            recordings_dir,
            deny_permission: false,
            capture_busy: Arc::new(AtomicBool::new(false)),
            recording_mode: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set where finalized captures are written
    pub fn with_recordings_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.recordings_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Make permission requests report denied
    pub fn with_permission_denied(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    pub fn recordings_dir(&self) -> &Path {
        &self.recordings_dir
    }

    fn generate_filename(&self) -> PathBuf {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let uuid = uuid::Uuid::new_v4().to_string()[..8].to_string();
        self.recordings_dir
            .join(format!("note_{}_{}.wav", timestamp, uuid))
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDevice for SimulatedDevice {
    fn request_capture_permission(&self) -> Result<Permission, AudioError> {
        if self.deny_permission {
            Ok(Permission::Denied)
        } else {
            Ok(Permission::Granted)
        }
    }

    fn configure_for_capture(&self, enable: bool) -> Result<(), AudioError> {
        self.recording_mode.store(enable, Ordering::SeqCst);
        debug!("Recording audio mode: {}", enable);
        Ok(())
    }

    fn start_capture(
        &self,
        preset: QualityPreset,
        metering_interval_millis: u64,
        on_metering: MeteringCallback,
    ) -> Result<Box<dyn CaptureHandle>, AudioError> {
        if self.capture_busy.swap(true, Ordering::SeqCst) {
            return Err(AudioError::DeviceBusy(
                "another capture is active".to_string(),
            ));
        }

        let interval = Duration::from_millis(metering_interval_millis.max(1));
        let (tx, rx) = unbounded::<CaptureCommand>();

        let worker = thread::spawn(move || {
            let mut tick: u64 = 0;
            loop {
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        on_metering(envelope_db(tick));
                        tick += 1;
                    }
                    Ok(CaptureCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        info!(
            "Simulated capture started ({:?}, {} ms metering)",
            preset, metering_interval_millis
        );
        Ok(Box::new(SimCaptureHandle {
            tx,
            worker: Some(worker),
            started: Instant::now(),
            output_path: self.generate_filename(),
            capture_busy: self.capture_busy.clone(),
        }))
    }

    fn load_for_playback(
        &self,
        uri: &str,
        progress_interval_millis: u64,
        on_status: StatusCallback,
    ) -> Result<Box<dyn PlaybackHandle>, AudioError> {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        if !Path::new(path).exists() {
            return Err(AudioError::ResourceUnavailable(uri.to_string()));
        }

        let reader = hound::WavReader::open(path)
            .map_err(|e| AudioError::Decode(format!("{}: {}", uri, e)))?;
        let spec = reader.spec();
        // hound reports duration in frames (samples per channel)
        let frames = reader.duration() as u64;
        let duration_millis = frames * 1000 / spec.sample_rate.max(1) as u64;

        let interval_millis = progress_interval_millis.max(1);
        let (tx, rx) = unbounded::<PlaybackCommand>();

        let worker = thread::spawn(move || {
            let interval = Duration::from_millis(interval_millis);
            let mut position: u64 = 0;
            let mut playing = false;

            let emit = |position: u64, playing: bool, did_finish: bool| {
                on_status(PlaybackStatus {
                    position_millis: position,
                    duration_millis: Some(duration_millis),
                    is_playing: playing,
                    did_finish,
                });
            };

            // Report duration as soon as the resource is loaded
            emit(0, false, false);

            loop {
                match rx.recv_timeout(interval) {
                    Ok(PlaybackCommand::Play) => {
                        if position >= duration_millis {
                            position = 0;
                        }
                        playing = true;
                        emit(position, playing, false);
                    }
                    Ok(PlaybackCommand::Pause) => {
                        playing = false;
                        emit(position, playing, false);
                    }
                    Ok(PlaybackCommand::Seek(millis)) => {
                        position = millis.min(duration_millis);
                        emit(position, playing, false);
                    }
                    Ok(PlaybackCommand::Unload) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        if playing {
                            position = (position + interval_millis).min(duration_millis);
                            let finished = position >= duration_millis;
                            if finished {
                                playing = false;
                            }
                            emit(position, playing, finished);
                        }
                    }
                }
            }
        });

        debug!("Simulated playback loaded {} ({} ms)", uri, duration_millis);
        Ok(Box::new(SimPlaybackHandle {
            tx,
            worker: Some(worker),
        }))
    }
}

/// Synthetic amplitude envelope (dB), a slow swell between roughly
/// -60 and -16 dB so waveforms have visible shape
fn envelope_db(tick: u64) -> f32 {
    -38.0 + 22.0 * (tick as f32 * 0.35).sin()
}

enum CaptureCommand {
    Stop,
}

struct SimCaptureHandle {
    tx: Sender<CaptureCommand>,
    worker: Option<JoinHandle<()>>,
    started: Instant,
    output_path: PathBuf,
    capture_busy: Arc<AtomicBool>,
}

impl CaptureHandle for SimCaptureHandle {
    fn stop(mut self: Box<Self>) -> Result<FinishedCapture, AudioError> {
        let _ = self.tx.send(CaptureCommand::Stop);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.capture_busy.store(false, Ordering::SeqCst);

        let duration_millis = self.started.elapsed().as_millis() as u64;
        write_tone(&self.output_path, duration_millis)?;

        info!(
            "Simulated capture finalized: {} ({} ms)",
            self.output_path.display(),
            duration_millis
        );
        Ok(FinishedCapture {
            uri: format!("file://{}", self.output_path.display()),
            duration_millis,
        })
    }
}

/// Write a sine tone of the given duration as a 16 kHz mono float WAV
fn write_tone(path: &Path, duration_millis: u64) -> Result<(), AudioError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AudioError::DeviceConfig(format!("Failed to create recordings directory: {}", e)))?;
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| AudioError::DeviceConfig(format!("Failed to create WAV file: {}", e)))?;

    let frames = SAMPLE_RATE as u64 * duration_millis / 1000;
    for i in 0..frames {
        let t = i as f32 / SAMPLE_RATE as f32;
        let sample = 0.5 * (2.0 * std::f32::consts::PI * TONE_HZ * t).sin();
        writer
            .write_sample(sample)
            .map_err(|e| AudioError::DeviceConfig(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioError::DeviceConfig(format!("Failed to finalize WAV file: {}", e)))
}

enum PlaybackCommand {
    Play,
    Pause,
    Seek(u64),
    Unload,
}

struct SimPlaybackHandle {
    tx: Sender<PlaybackCommand>,
    worker: Option<JoinHandle<()>>,
}

impl SimPlaybackHandle {
    fn send(&self, command: PlaybackCommand) -> Result<(), AudioError> {
        self.tx.send(command).map_err(|_| {
            AudioError::InvalidStateTransition("playback worker has shut down".to_string())
        })
    }
}

impl PlaybackHandle for SimPlaybackHandle {
    fn play(&self) -> Result<(), AudioError> {
        self.send(PlaybackCommand::Play)
    }

    fn pause(&self) -> Result<(), AudioError> {
        self.send(PlaybackCommand::Pause)
    }

    fn seek(&self, position_millis: u64) -> Result<(), AudioError> {
        self.send(PlaybackCommand::Seek(position_millis))
    }

    fn unload(&mut self) {
        let _ = self.tx.send(PlaybackCommand::Unload);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SimPlaybackHandle {
    fn drop(&mut self) {
        self.unload();
    }
}
