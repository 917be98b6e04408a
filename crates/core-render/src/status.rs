//! Mode line and message line text.
//!
//! The mode line reads ` ** name  (col, row)`: a dirty mark (`**` modified,
//! `--` clean), the file name, and the cursor as display column and line.
//! While a load or save runs, a progress tag such as ` saving... 42% ` is
//! drawn over its right end.

use core_state::{Buffer, FileState};
use core_text::expand_tabs;

/// Room kept right of the progress label for the percentage.
const PROGRESS_TAIL: usize = 6;

pub fn mode_line(buf: &Buffer) -> String {
    let mark = if buf.is_dirty() { "**" } else { "--" };
    let col = expand_tabs(&buf.content.line(buf.cursor.row), buf.cursor.col);
    format!(" {mark} {}  ({col}, {})", buf.file.name(), buf.cursor.row)
}

/// Label and whole percentage of the running load or save, if any.
pub fn progress(file: &FileState) -> Option<(&'static str, u64)> {
    match file {
        FileState::Loading(f) => Some(("loading...", percent(f.loaded_bytes, f.total_bytes))),
        FileState::Saving(f) => Some((
            "saving...",
            percent(f.saved_lines as u64, f.content.len() as u64),
        )),
        FileState::Unattached | FileState::Existing(_) => None,
    }
}

fn percent(done: u64, total: u64) -> u64 {
    (done.saturating_mul(100) / total.max(1)).min(100)
}

/// Progress tag text and the column it starts at on a mode line `width`
/// columns wide.
pub fn progress_tag(file: &FileState, width: u16) -> Option<(u16, String)> {
    let (label, pct) = progress(file)?;
    let start = (width as usize).saturating_sub(label.len() + PROGRESS_TAIL);
    Some((start as u16, format!(" {label} {pct:>2}% ")))
}

/// Message line text: the message indented by one column.
pub fn message_line(text: &str) -> String {
    format!(" {text}")
}
