//! Buffer state: file lifecycle, cursor and selection, undo history, and the
//! pure edit operations over them.
//!
//! Every operation in this crate takes a [`Buffer`] by value and returns a new
//! one (or a buffer plus the [`Text`] it removed). Cloning a buffer is cheap:
//! content is a persistent [`Text`] and history is an `Arc`-linked log, so the
//! reducer can keep the "before" value around for [`undo::record`] without
//! copying file contents.
//!
//! Cursor columns are "sticky": vertical motion keeps the stored column even
//! when the target line is shorter, and [`Buffer::actual_cursor`] clamps it
//! whenever a column is used for editing or drawing.
//!
//! Telemetry:
//! - `state.undo`: snapshot pushes, undo restores, edits rejected during load.
//! - `state.edit`: line splits/merges and clipboard sized payloads (sizes only).
//! - `state.io`: file state transitions driven by load/save events.

use core_text::{Coord, Text};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub mod edit;
pub mod io;
pub mod motion;
pub mod selection;
pub mod undo;

pub use edit::{
    cut_rest, delete_char, delete_char_right, insert_char, insert_new_line, insert_tab,
    insert_text,
};
pub use io::{BufferIoEvent, SaveRequest, load_buffer, save_buffer, update_buffer};
pub use motion::{
    move_buffer_end, move_buffer_start, move_cursor_down, move_cursor_left, move_cursor_right,
    move_cursor_up, move_line_end, move_line_start, page_down, page_up, scroll_to_cursor,
};
pub use selection::{
    clear_selection, copy, cut, select_whole_buffer, selected_region, selected_text,
    start_selection,
};
pub use undo::{EDIT_WHILE_LOADING, History, Snapshot, record, undo};

/// Display name of a buffer with no backing file.
pub const UNNAMED: &str = "*unnamed*";

/// Index of a buffer inside the application's buffer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub usize);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// File content as last confirmed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingFile {
    pub name: Arc<Path>,
    pub content: Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingFile {
    pub name: Arc<Path>,
    /// Lines read so far.
    pub content: Text,
    pub loaded_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavingFile {
    pub name: Arc<Path>,
    /// The content being written.
    pub content: Text,
    pub saved_lines: usize,
}

/// Lifecycle of the file behind a buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileState {
    #[default]
    Unattached,
    Existing(ExistingFile),
    Loading(LoadingFile),
    Saving(SavingFile),
}

impl FileState {
    pub fn path(&self) -> Option<&Arc<Path>> {
        match self {
            FileState::Unattached => None,
            FileState::Existing(f) => Some(&f.name),
            FileState::Loading(f) => Some(&f.name),
            FileState::Saving(f) => Some(&f.name),
        }
    }

    /// Name shown to the user.
    pub fn name(&self) -> String {
        match self.path() {
            Some(path) => path.display().to_string(),
            None => UNNAMED.to_string(),
        }
    }

    /// Content the file state vouches for. `None` for a detached buffer.
    pub fn content(&self) -> Option<&Text> {
        match self {
            FileState::Unattached => None,
            FileState::Existing(f) => Some(&f.content),
            FileState::Loading(f) => Some(&f.content),
            FileState::Saving(f) => Some(&f.content),
        }
    }

    pub fn io_in_progress(&self) -> bool {
        matches!(self, FileState::Loading(_) | FileState::Saving(_))
    }

    pub fn load_in_progress(&self) -> bool {
        matches!(self, FileState::Loading(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Buffer {
    pub id: BufferId,
    pub file: FileState,
    pub content: Text,
    /// Stored cursor; `col` may exceed the line length (sticky column).
    pub cursor: Coord,
    /// Top-left of the visible window, in display columns.
    pub scroll: Coord,
    pub selection_anchor: Option<Coord>,
    pub history: History,
    /// `None` at the tip of history; otherwise the index of the snapshot the
    /// last undo restored.
    pub history_pos: Option<usize>,
}

impl Buffer {
    pub fn new(id: BufferId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Detached buffer holding `content` (used by tests and scratch buffers).
    pub fn with_content(id: BufferId, content: Text) -> Self {
        Self {
            id,
            content,
            ..Self::default()
        }
    }

    pub fn name(&self) -> String {
        self.file.name()
    }

    /// Length in characters of line `row` (0 for the virtual line past the end).
    pub fn line_len(&self, row: usize) -> usize {
        self.content.line_len(row)
    }

    /// The cursor with its column clamped to the current line.
    pub fn actual_cursor(&self) -> Coord {
        let row = self.cursor.row.min(self.content.len());
        Coord::new(row, self.cursor.col.min(self.line_len(row)))
    }

    pub fn io_in_progress(&self) -> bool {
        self.file.io_in_progress()
    }

    /// True when the content differs from what the file state vouches for.
    pub fn is_dirty(&self) -> bool {
        match self.file.content() {
            Some(content) => self.content != *content,
            None => !self.content.is_empty(),
        }
    }
}
