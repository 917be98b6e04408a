//! File state transitions for load and save.
//!
//! The reducer starts an operation with [`load_buffer`] / [`save_buffer`]; the
//! worker doing the I/O reports back with [`BufferIoEvent`]s, which
//! [`update_buffer`] folds into the buffer. Progress events for one operation
//! arrive in order and the terminal done/error event comes last.

use crate::{Buffer, ExistingFile, FileState, LoadingFile, SavingFile};
use core_text::{Coord, Text};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferIoEvent {
    LoadProgress(LoadingFile),
    LoadDone(ExistingFile),
    /// The file did not exist; the buffer is attached to the name with no content.
    LoadNew(ExistingFile),
    /// Load failed; `file.content` holds what was read before the failure.
    LoadError { file: ExistingFile, detail: String },
    SaveProgress(SavingFile),
    SaveDone(ExistingFile),
    /// Save failed; `file.content` is the best guess of what is on disk now.
    SaveError { file: ExistingFile, detail: String },
}

/// Everything a save worker needs.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub name: Arc<Path>,
    /// Content on disk before the save starts.
    pub old_content: Text,
    pub new_content: Text,
}

/// Fold an I/O event into `buf`, returning the status message to show.
pub fn update_buffer(mut buf: Buffer, event: BufferIoEvent) -> (Buffer, Option<String>) {
    let message = match event {
        BufferIoEvent::LoadProgress(file) => {
            debug!(target: "state.io", buffer = %buf.id, loaded = file.loaded_bytes, total = file.total_bytes, "load_progress");
            buf.content = file.content.clone();
            buf = clamp_to_content(buf);
            buf.file = FileState::Loading(file);
            None
        }
        BufferIoEvent::LoadDone(file) => {
            let msg = format!("loaded: {}", file.name.display());
            buf.content = file.content.clone();
            buf = clamp_to_content(buf);
            buf.file = FileState::Existing(file);
            Some(msg)
        }
        BufferIoEvent::LoadNew(file) => {
            let msg = format!("new file: {}", file.name.display());
            buf.content = file.content.clone();
            buf = clamp_to_content(buf);
            buf.file = FileState::Existing(file);
            Some(msg)
        }
        BufferIoEvent::LoadError { file, detail } => {
            let msg = format!("error while loading: {} ({detail})", file.name.display());
            buf.content = file.content.clone();
            buf = clamp_to_content(buf);
            buf.file = FileState::Existing(file);
            Some(msg)
        }
        BufferIoEvent::SaveProgress(file) => {
            debug!(target: "state.io", buffer = %buf.id, lines = file.saved_lines, "save_progress");
            buf.file = FileState::Saving(file);
            None
        }
        BufferIoEvent::SaveDone(file) => {
            let msg = format!("saved: {}", file.name.display());
            buf.file = FileState::Existing(file);
            Some(msg)
        }
        BufferIoEvent::SaveError { file, detail } => {
            let msg = format!("error while saving: {} ({detail})", file.name.display());
            buf.file = FileState::Existing(file);
            Some(msg)
        }
    };
    if let Some(msg) = &message {
        debug!(target: "state.io", buffer = %buf.id, dirty = buf.is_dirty(), "{msg}");
    }
    (buf, message)
}

/// Keep the cursor, scroll and selection anchor inside freshly replaced
/// content.
fn clamp_to_content(mut buf: Buffer) -> Buffer {
    let last = buf.content.len();
    buf.cursor.row = buf.cursor.row.min(last);
    buf.scroll.row = buf.scroll.row.min(buf.cursor.row);
    if let Some(anchor) = &mut buf.selection_anchor {
        anchor.row = anchor.row.min(last);
    }
    buf
}

/// Enter the loading state for `name`. Content is replaced as progress
/// arrives, so the view starts over at the origin with no selection.
pub fn load_buffer(mut buf: Buffer, name: &Path) -> Buffer {
    buf.cursor = Coord::default();
    buf.scroll = Coord::default();
    buf.selection_anchor = None;
    buf.file = FileState::Loading(LoadingFile {
        name: Arc::from(name),
        content: Text::new(),
        loaded_bytes: 0,
        total_bytes: 1,
    });
    buf
}

/// Enter the saving state. Only a buffer attached to an idle file can save.
pub fn save_buffer(mut buf: Buffer) -> Option<(Buffer, SaveRequest)> {
    let FileState::Existing(file) = &buf.file else {
        return None;
    };
    let request = SaveRequest {
        name: file.name.clone(),
        old_content: file.content.clone(),
        new_content: buf.content.clone(),
    };
    buf.file = FileState::Saving(SavingFile {
        name: request.name.clone(),
        content: request.new_content.clone(),
        saved_lines: 0,
    });
    Some((buf, request))
}
