//! Recording session state machine.
//!
//! Owns one capture lifecycle: permission request, device
//! configuration, live metering accumulation, and finalization into a
//! [`Note`] that lands at the front of the [`NoteLibrary`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::audio::device::{
    AudioDevice, CaptureHandle, MeteringCallback, Permission, QualityPreset,
    DEFAULT_METERING_INTERVAL_MILLIS,
};
use crate::error::AudioError;
use crate::library::NoteLibrary;
use crate::metering::MeteringBuffer;
use crate::models::Note;

/// Current state of a recording session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Requesting,
    Active,
    Stopping,
}

/// Process-wide recording audio mode, reference counted so the device
/// flag only toggles on 0<->1 transitions.
struct CaptureMode {
    device: Arc<dyn AudioDevice>,
    refs: AtomicUsize,
}

impl CaptureMode {
    fn new(device: Arc<dyn AudioDevice>) -> Self {
        Self {
            device,
            refs: AtomicUsize::new(0),
        }
    }

    fn acquire(&self) -> Result<(), AudioError> {
        if self.refs.fetch_add(1, Ordering::SeqCst) == 0 {
            if let Err(e) = self.device.configure_for_capture(true) {
                self.refs.fetch_sub(1, Ordering::SeqCst);
                return Err(e);
            }
        }
        Ok(())
    }

    fn release(&self) {
        if self.refs.fetch_sub(1, Ordering::SeqCst) == 1 {
            if let Err(e) = self.device.configure_for_capture(false) {
                warn!("Failed to leave recording audio mode: {}", e);
            }
        }
    }
}

struct RecorderInner {
    state: RecorderState,
    started_at: Option<DateTime<Utc>>,
    handle: Option<Box<dyn CaptureHandle>>,
    /// Stop requested while the start was still resolving; applied
    /// once the capture becomes active
    pending_stop: bool,
}

/// Recording session manager
pub struct Recorder {
    device: Arc<dyn AudioDevice>,
    library: NoteLibrary,
    buffer: MeteringBuffer,
    capture_mode: CaptureMode,
    preset: QualityPreset,
    metering_interval_millis: u64,
    inner: Mutex<RecorderInner>,
}

impl Recorder {
    pub fn new(device: Arc<dyn AudioDevice>, library: NoteLibrary) -> Self {
        Self {
            capture_mode: CaptureMode::new(device.clone()),
            device,
            library,
            buffer: MeteringBuffer::new(),
            preset: QualityPreset::default(),
            metering_interval_millis: DEFAULT_METERING_INTERVAL_MILLIS,
            inner: Mutex::new(RecorderInner {
                state: RecorderState::Idle,
                started_at: None,
                handle: None,
                pending_stop: false,
            }),
        }
    }

    /// Set the capture quality preset
    pub fn with_preset(mut self, preset: QualityPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Set the metering tick interval
    pub fn with_metering_interval(mut self, millis: u64) -> Self {
        self.metering_interval_millis = millis;
        self
    }

    pub fn state(&self) -> RecorderState {
        self.inner.lock().unwrap().state
    }

    pub fn is_active(&self) -> bool {
        self.state() == RecorderState::Active
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().unwrap().started_at
    }

    /// Shared handle onto the live metering buffer
    pub fn metering(&self) -> MeteringBuffer {
        self.buffer.clone()
    }

    /// Read-only copy of the amplitude samples captured so far
    pub fn metering_snapshot(&self) -> Vec<f32> {
        self.buffer.snapshot()
    }

    /// Begin a recording.
    ///
    /// Acquires permission, enters recording audio mode, and starts
    /// capture; blocks until the device confirms or fails. A start
    /// while a session is already underway is ignored. Permission and
    /// device failures return the session to idle and surface the
    /// error once; no note is produced.
    pub fn start(&self) -> Result<(), AudioError> {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.state != RecorderState::Idle {
                warn!("Ignoring start while {:?}", inner.state);
                return Ok(());
            }
            inner.state = RecorderState::Requesting;
            inner.pending_stop = false;
        }

        match self.request_capture() {
            Ok(handle) => {
                let pending_stop = {
                    let mut inner = self.inner.lock().unwrap();
                    inner.state = RecorderState::Active;
                    inner.started_at = Some(Utc::now());
                    inner.handle = Some(handle);
                    std::mem::take(&mut inner.pending_stop)
                };
                info!("Recording started");
                if pending_stop {
                    info!("Applying stop queued during start");
                    self.stop().map(|_| ())
                } else {
                    Ok(())
                }
            }
            Err(e) => {
                let mut inner = self.inner.lock().unwrap();
                inner.state = RecorderState::Idle;
                inner.pending_stop = false;
                Err(e)
            }
        }
    }

    /// Stop the current recording and emit the finished note into the
    /// library.
    ///
    /// Returns `Ok(Some(note))` on success, `Ok(None)` when there was
    /// nothing to stop (no-op) or the stop was queued behind a start
    /// that is still resolving. On device failure the metering buffer
    /// is discarded and no note is emitted.
    pub fn stop(&self) -> Result<Option<Note>, AudioError> {
        let handle = {
            let mut inner = self.inner.lock().unwrap();
            match inner.state {
                RecorderState::Idle | RecorderState::Stopping => {
                    debug!("Ignoring stop while {:?}", inner.state);
                    return Ok(None);
                }
                RecorderState::Requesting => {
                    info!("Stop requested during start; queuing");
                    inner.pending_stop = true;
                    return Ok(None);
                }
                RecorderState::Active => {
                    inner.state = RecorderState::Stopping;
                    inner.handle.take()
                }
            }
        };

        let Some(handle) = handle else {
            self.finish_session();
            return Ok(None);
        };

        let result = handle.stop();
        self.capture_mode.release();

        match result {
            Ok(finished) => {
                let metering = self.buffer.snapshot();
                let note = Note::new(finished.uri, metering, finished.duration_millis);
                info!(
                    "Recording stopped: {} ({} samples, {} ms)",
                    note.audio_uri,
                    note.metering.len(),
                    note.duration_millis
                );
                self.library.prepend(note.clone());
                self.finish_session();
                Ok(Some(note))
            }
            Err(e) => {
                warn!("Failed to finalize recording: {}", e);
                self.buffer.reset();
                self.finish_session();
                Err(e)
            }
        }
    }

    /// Run the device side of a start request: permission, audio mode,
    /// capture. The metering buffer is reset as part of the transition
    /// to active, just before ticks begin.
    fn request_capture(&self) -> Result<Box<dyn CaptureHandle>, AudioError> {
        match self.device.request_capture_permission()? {
            Permission::Granted => {}
            Permission::Denied => return Err(AudioError::PermissionDenied),
        }

        self.capture_mode.acquire()?;

        self.buffer.reset();
        let buffer = self.buffer.clone();
        let on_metering: MeteringCallback = Arc::new(move |db| buffer.append(db));

        match self
            .device
            .start_capture(self.preset, self.metering_interval_millis, on_metering)
        {
            Ok(handle) => Ok(handle),
            Err(e) => {
                self.capture_mode.release();
                Err(e)
            }
        }
    }

    fn finish_session(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = RecorderState::Idle;
        inner.started_at = None;
        inner.pending_stop = false;
    }
}
