//! In-memory library of completed voice notes.

use std::sync::{Arc, Mutex};

use log::debug;
use uuid::Uuid;

use crate::models::Note;

/// Ordered collection of completed notes, most recent first - thread-safe.
///
/// Cloned handles share the same list, so the recorder can prepend a
/// finished note while the presentation layer holds its own handle.
#[derive(Clone, Default)]
pub struct NoteLibrary {
    inner: Arc<Mutex<Vec<Note>>>,
}

impl NoteLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a note at the front. A note whose id is already present
    /// is rejected and the library is left unchanged.
    ///
    /// Returns whether the note was inserted.
    pub fn prepend(&self, note: Note) -> bool {
        let mut notes = self.inner.lock().unwrap();
        if notes.iter().any(|n| n.id == note.id) {
            debug!("Ignoring duplicate note {}", note.id);
            return false;
        }
        notes.insert(0, note);
        true
    }

    /// Read-only snapshot, most recent first
    pub fn all(&self) -> Vec<Note> {
        self.inner.lock().unwrap().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Note> {
        self.inner.lock().unwrap().iter().find(|n| n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}
