//! Committing edits.
//!
//! Every content-changing command goes through here: keep the cursor in
//! view, pass `(before, after)` through the undo log, and surface the log's
//! verdict as a message.

use super::put_message;
use crate::{Application, editor_size};
use core_state::{Buffer, record, scroll_to_cursor};
use core_text::Text;
use tracing::trace;

fn commit(app: &mut Application, after: Buffer) -> Option<&'static str> {
    let after = scroll_to_cursor(after, editor_size(app));
    let (buf, rejected) = record(&app.current, after);
    app.current = buf;
    rejected
}

pub(super) fn apply_edit(mut app: Application, after: Buffer) -> Application {
    match commit(&mut app, after) {
        Some(msg) => put_message(app, msg),
        None => app,
    }
}

/// Like [`apply_edit`], also keeping non-empty yielded text on the clipboard
/// when the edit went through.
pub(super) fn apply_yielding_edit(mut app: Application, (after, text): (Buffer, Text)) -> Application {
    if let Some(msg) = commit(&mut app, after) {
        return put_message(app, msg);
    }
    if !text.is_empty() {
        trace!(target: "actions.dispatch", lines = text.len(), depth = app.clipboard.len() + 1, "clipboard_push");
        app.clipboard.push(text);
    }
    app
}
