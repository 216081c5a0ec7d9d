//! Playback session state machine.
//!
//! One [`Player`] exists per visible note. It owns a decoder handle
//! obtained from the device, tracks position and duration from device
//! status ticks, and releases the handle on every exit path, including
//! Drop. Players are independent: several may be playing at once, and
//! one failing or being torn down never affects another.

use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::audio::device::{
    AudioDevice, PlaybackHandle, PlaybackStatus, StatusCallback, DEFAULT_PROGRESS_INTERVAL_MILLIS,
};
use crate::error::AudioError;
use crate::models::Note;

/// Current state of a playback session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Unloaded,
    Loading,
    Ready,
    Playing,
    Paused,
    Finished,
    Error,
}

struct PlayerInner {
    state: PlayerState,
    note_id: Option<Uuid>,
    audio_uri: Option<String>,
    position_millis: u64,
    duration_millis: Option<u64>,
    handle: Option<Box<dyn PlaybackHandle>>,
    last_error: Option<AudioError>,
}

/// Playback session for one note
pub struct Player {
    device: Arc<dyn AudioDevice>,
    progress_interval_millis: u64,
    inner: Arc<Mutex<PlayerInner>>,
}

impl Player {
    pub fn new(device: Arc<dyn AudioDevice>) -> Self {
        Self {
            device,
            progress_interval_millis: DEFAULT_PROGRESS_INTERVAL_MILLIS,
            inner: Arc::new(Mutex::new(PlayerInner {
                state: PlayerState::Unloaded,
                note_id: None,
                audio_uri: None,
                position_millis: 0,
                duration_millis: None,
                handle: None,
                last_error: None,
            })),
        }
    }

    /// Set the status tick interval requested from the device
    pub fn with_progress_interval(mut self, millis: u64) -> Self {
        self.progress_interval_millis = millis;
        self
    }

    pub fn state(&self) -> PlayerState {
        self.inner.lock().unwrap().state
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlayerState::Playing
    }

    pub fn position_millis(&self) -> u64 {
        self.inner.lock().unwrap().position_millis
    }

    pub fn duration_millis(&self) -> Option<u64> {
        self.inner.lock().unwrap().duration_millis
    }

    pub fn note_id(&self) -> Option<Uuid> {
        self.inner.lock().unwrap().note_id
    }

    pub fn last_error(&self) -> Option<AudioError> {
        self.inner.lock().unwrap().last_error.clone()
    }

    /// Playback progress in [0, 1]. Unknown or zero duration reads as 0.
    pub fn progress(&self) -> f32 {
        let inner = self.inner.lock().unwrap();
        match inner.duration_millis {
            Some(duration) if duration > 0 => {
                (inner.position_millis as f32 / duration as f32).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Load a note's audio for playback.
    ///
    /// Re-loading the note that is already bound is a no-op unless the
    /// session is in the error state. Loading a different note releases
    /// the previous decoder handle first.
    pub fn load(&self, note: &Note) -> Result<(), AudioError> {
        {
            let inner = self.inner.lock().unwrap();
            if inner.note_id == Some(note.id)
                && !matches!(inner.state, PlayerState::Unloaded | PlayerState::Error)
            {
                return Ok(());
            }
        }
        self.load_uri(note.id, note.audio_uri.clone())
    }

    /// Retry loading after a failure; a no-op when no note is bound
    pub fn reload(&self) -> Result<(), AudioError> {
        let bound = {
            let inner = self.inner.lock().unwrap();
            inner.note_id.zip(inner.audio_uri.clone())
        };
        match bound {
            Some((note_id, uri)) => self.load_uri(note_id, uri),
            None => {
                debug!("Ignoring reload with no note bound");
                Ok(())
            }
        }
    }

    fn load_uri(&self, note_id: Uuid, uri: String) -> Result<(), AudioError> {
        self.release_handle();
        {
            let mut inner = self.inner.lock().unwrap();
            inner.state = PlayerState::Loading;
            inner.note_id = Some(note_id);
            inner.audio_uri = Some(uri.clone());
            inner.position_millis = 0;
            inner.duration_millis = None;
            inner.last_error = None;
        }

        let weak = Arc::downgrade(&self.inner);
        let on_status: StatusCallback = Arc::new(move |status| {
            if let Some(inner) = weak.upgrade() {
                apply_status(&inner, status);
            }
        });

        match self
            .device
            .load_for_playback(&uri, self.progress_interval_millis, on_status)
        {
            Ok(handle) => {
                let mut inner = self.inner.lock().unwrap();
                inner.handle = Some(handle);
                // A status tick may already have run; don't clobber a
                // finish that somehow raced the load.
                if inner.state == PlayerState::Loading {
                    inner.state = PlayerState::Ready;
                }
                debug!("Loaded {} for playback", uri);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load {}: {}", uri, e);
                let mut inner = self.inner.lock().unwrap();
                inner.state = PlayerState::Error;
                inner.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Begin or resume playback. Valid from ready, paused, or finished
    /// (which replays from the start); otherwise a no-op.
    pub fn play(&self) -> Result<(), AudioError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            PlayerState::Ready | PlayerState::Paused | PlayerState::Finished => {}
            other => {
                debug!("Ignoring play while {:?}", other);
                return Ok(());
            }
        }
        let Some(handle) = inner.handle.as_ref() else {
            return Ok(());
        };

        // A finished session was already rewound to 0 on the device,
        // so replay is a plain play.
        match handle.play() {
            Ok(()) => {
                inner.state = PlayerState::Playing;
                info!("Playback started");
                Ok(())
            }
            Err(e) => {
                warn!("Playback failed: {}", e);
                inner.state = PlayerState::Error;
                inner.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Pause playback. A no-op unless currently playing.
    pub fn pause(&self) -> Result<(), AudioError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != PlayerState::Playing {
            debug!("Ignoring pause while {:?}", inner.state);
            return Ok(());
        }
        let Some(handle) = inner.handle.as_ref() else {
            return Ok(());
        };
        match handle.pause() {
            Ok(()) => {
                inner.state = PlayerState::Paused;
                Ok(())
            }
            Err(e) => {
                warn!("Pause failed: {}", e);
                inner.state = PlayerState::Error;
                inner.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Release the decoder handle and return to unloaded
    pub fn unload(&self) {
        self.release_handle();
        let mut inner = self.inner.lock().unwrap();
        inner.state = PlayerState::Unloaded;
        inner.position_millis = 0;
        inner.duration_millis = None;
    }

    fn release_handle(&self) {
        let handle = self.inner.lock().unwrap().handle.take();
        if let Some(mut handle) = handle {
            handle.unload();
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.release_handle();
    }
}

/// Apply one device status tick to the session state
fn apply_status(inner: &Mutex<PlayerInner>, status: PlaybackStatus) {
    let mut inner = inner.lock().unwrap();
    if matches!(
        inner.state,
        PlayerState::Unloaded | PlayerState::Error
    ) {
        // Stale tick from a handle that is being torn down
        return;
    }

    if let Some(duration) = status.duration_millis {
        inner.duration_millis = Some(duration);
    }

    if inner.state == PlayerState::Finished && !status.did_finish {
        // Echoes of the pause/rewind issued at finish carry stale
        // positions; stay rewound until the next play
        return;
    }

    let cap = inner.duration_millis.unwrap_or(u64::MAX);
    inner.position_millis = status.position_millis.min(cap);

    if status.did_finish {
        if let Some(handle) = inner.handle.as_ref() {
            if let Err(e) = handle.pause().and_then(|_| handle.seek(0)) {
                warn!("Failed to rewind finished playback: {}", e);
            }
        }
        inner.position_millis = 0;
        inner.state = PlayerState::Finished;
        info!("Playback finished");
    }
}
