//! Scripted in-memory device for session tests.
//!
//! Records every call it receives, lets tests script failures and stop
//! results, and exposes the registered callbacks so tests can inject
//! metering and status ticks deterministically.

use std::sync::{Arc, Barrier, Mutex};

use crate::audio::device::{
    AudioDevice, CaptureHandle, FinishedCapture, MeteringCallback, Permission, PlaybackHandle,
    PlaybackStatus, QualityPreset, StatusCallback,
};
use crate::error::AudioError;

#[derive(Default)]
struct ScriptedInner {
    calls: Vec<String>,
    deny_permission: bool,
    fail_configure: bool,
    fail_start: bool,
    fail_load: bool,
    fail_play: bool,
    stop_result: Option<Result<FinishedCapture, AudioError>>,
    on_metering: Option<MeteringCallback>,
    on_status: Option<StatusCallback>,
}

pub struct ScriptedDevice {
    inner: Arc<Mutex<ScriptedInner>>,
    start_gate: Option<Arc<Barrier>>,
}

impl ScriptedDevice {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScriptedInner::default())),
            start_gate: None,
        }
    }

    /// Block inside `start_capture` until the gate is released
    pub fn with_start_gate(mut self, gate: Arc<Barrier>) -> Self {
        self.start_gate = Some(gate);
        self
    }

    pub fn set_deny_permission(&self, deny: bool) {
        self.inner.lock().unwrap().deny_permission = deny;
    }

    pub fn set_fail_configure(&self, fail: bool) {
        self.inner.lock().unwrap().fail_configure = fail;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.inner.lock().unwrap().fail_start = fail;
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.inner.lock().unwrap().fail_load = fail;
    }

    pub fn set_fail_play(&self, fail: bool) {
        self.inner.lock().unwrap().fail_play = fail;
    }

    pub fn set_stop_result(&self, result: Result<FinishedCapture, AudioError>) {
        self.inner.lock().unwrap().stop_result = Some(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Drive one metering tick through the registered callback
    pub fn emit_metering(&self, amplitude_db: f32) {
        let callback = self.inner.lock().unwrap().on_metering.clone();
        callback.expect("no metering callback registered")(amplitude_db);
    }

    /// Drive one status tick through the registered callback
    pub fn emit_status(&self, status: PlaybackStatus) {
        let callback = self.inner.lock().unwrap().on_status.clone();
        callback.expect("no status callback registered")(status);
    }
}

impl AudioDevice for ScriptedDevice {
    fn request_capture_permission(&self) -> Result<Permission, AudioError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("request_permission".to_string());
        if inner.deny_permission {
            Ok(Permission::Denied)
        } else {
            Ok(Permission::Granted)
        }
    }

    fn configure_for_capture(&self, enable: bool) -> Result<(), AudioError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("configure({})", enable));
        if inner.fail_configure {
            Err(AudioError::DeviceConfig("scripted configure failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn start_capture(
        &self,
        _preset: QualityPreset,
        _metering_interval_millis: u64,
        on_metering: MeteringCallback,
    ) -> Result<Box<dyn CaptureHandle>, AudioError> {
        self.inner.lock().unwrap().calls.push("start_capture".to_string());
        if let Some(gate) = &self.start_gate {
            gate.wait();
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_start {
            return Err(AudioError::DeviceBusy("scripted start failure".to_string()));
        }
        inner.on_metering = Some(on_metering);
        Ok(Box::new(ScriptedCaptureHandle {
            inner: self.inner.clone(),
        }))
    }

    fn load_for_playback(
        &self,
        uri: &str,
        _progress_interval_millis: u64,
        on_status: StatusCallback,
    ) -> Result<Box<dyn PlaybackHandle>, AudioError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("load({})", uri));
        if inner.fail_load {
            return Err(AudioError::ResourceUnavailable(uri.to_string()));
        }
        inner.on_status = Some(on_status);
        Ok(Box::new(ScriptedPlaybackHandle {
            inner: self.inner.clone(),
        }))
    }
}

struct ScriptedCaptureHandle {
    inner: Arc<Mutex<ScriptedInner>>,
}

impl CaptureHandle for ScriptedCaptureHandle {
    fn stop(self: Box<Self>) -> Result<FinishedCapture, AudioError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("stop_capture".to_string());
        inner.on_metering = None;
        inner.stop_result.take().unwrap_or_else(|| {
            Ok(FinishedCapture {
                uri: "file:///scripted.m4a".to_string(),
                duration_millis: 1000,
            })
        })
    }
}

struct ScriptedPlaybackHandle {
    inner: Arc<Mutex<ScriptedInner>>,
}

impl PlaybackHandle for ScriptedPlaybackHandle {
    fn play(&self) -> Result<(), AudioError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("play".to_string());
        if inner.fail_play {
            Err(AudioError::DeviceConfig("scripted play failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn pause(&self) -> Result<(), AudioError> {
        self.inner.lock().unwrap().calls.push("pause".to_string());
        Ok(())
    }

    fn seek(&self, position_millis: u64) -> Result<(), AudioError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("seek({})", position_millis));
        Ok(())
    }

    fn unload(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("unload".to_string());
        inner.on_status = None;
    }
}
