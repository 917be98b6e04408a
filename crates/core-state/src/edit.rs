//! Insertion and deletion at the cursor.
//!
//! All edits address the actual (clamped) cursor. They do not record undo
//! snapshots themselves; the caller passes `(before, after)` to
//! [`crate::record`].

use crate::Buffer;
use crate::motion::{move_cursor_down, move_cursor_left, move_cursor_right};
use core_text::{Coord, Line, Text};
use tracing::trace;

/// Insert `ch` before the cursor and advance past it. `'\n'` splits the line.
pub fn insert_char(mut buf: Buffer, ch: char) -> Buffer {
    if ch == '\n' {
        return insert_new_line(buf);
    }
    let cur = buf.actual_cursor();
    if cur.row == buf.content.len() {
        buf.content = buf.content.push_back(Line::new().insert_char(0, ch));
    } else {
        buf.content = buf.content.update(cur.row, |l| l.insert_char(cur.col, ch));
    }
    buf.cursor = Coord::new(cur.row, cur.col + 1);
    buf
}

pub fn insert_tab(buf: Buffer) -> Buffer {
    insert_char(buf, '\t')
}

/// Split the current line at the cursor and move to the start of the new line.
///
/// At the end of the last line there is nothing to split: the cursor moves to
/// the virtual line below, where the next insertion appends a real line.
pub fn insert_new_line(mut buf: Buffer) -> Buffer {
    let cur = buf.actual_cursor();
    let size = buf.content.len();
    if cur.row == size {
        buf.content = buf.content.push_back(Line::new());
        buf = move_cursor_down(buf);
        buf.cursor.col = 0;
        return buf;
    }
    let line = buf.content.line(cur.row);
    if cur.row + 1 < size || cur.col < line.len() {
        trace!(target: "state.edit", row = cur.row, col = cur.col, "split_line");
        buf.content = buf
            .content
            .set(cur.row, line.take(cur.col))
            .insert(cur.row + 1, line.skip(cur.col));
    }
    buf.cursor = Coord::new(cur.row + 1, 0);
    buf
}

/// Backspace: remove the character left of the cursor, joining with the
/// previous line at column 0.
pub fn delete_char(buf: Buffer) -> Buffer {
    let cur = buf.actual_cursor();
    let mut buf = move_cursor_left(buf);
    if buf.cursor.row == cur.row && buf.cursor.col != cur.col {
        let col = buf.cursor.col;
        buf.content = buf.content.update(cur.row, |l| l.remove_char(col));
    } else if cur.row > 0 && cur.row < buf.content.len() {
        trace!(target: "state.edit", row = cur.row, "join_lines");
        let joined = buf.content.line(cur.row - 1).concat(&buf.content.line(cur.row));
        buf.content = buf.content.set(cur.row - 1, joined).remove(cur.row);
    }
    buf
}

/// Delete: remove the character at the cursor, joining with the next line at
/// the end of a line.
pub fn delete_char_right(buf: Buffer) -> Buffer {
    let cur = buf.actual_cursor();
    let moved = move_cursor_right(buf.clone());
    if moved.actual_cursor() == cur {
        return buf;
    }
    delete_char(moved)
}

/// Kill to end of line. Returns the removed suffix; at the end of a line the
/// line break is deleted instead and nothing is returned.
pub fn cut_rest(mut buf: Buffer) -> (Buffer, Text) {
    let cur = buf.actual_cursor();
    if cur.row >= buf.content.len() {
        return (buf, Text::new());
    }
    let line = buf.content.line(cur.row);
    if cur.col < line.len() {
        buf.content = buf.content.set(cur.row, line.take(cur.col));
        return (buf, Text::from_lines([line.skip(cur.col)]));
    }
    (delete_char_right(buf), Text::new())
}

/// Splice `paste` in at the cursor. The first pasted line joins the text
/// before the cursor, the last one joins the text after it, and the cursor
/// ends up right after the pasted text.
pub fn insert_text(mut buf: Buffer, paste: &Text) -> Buffer {
    let Some(last) = paste.last() else {
        return buf;
    };
    let cur = buf.actual_cursor();
    let n = paste.len();
    if cur.row < buf.content.len() {
        let line = buf.content.line(cur.row);
        let tail = line.skip(cur.col);
        let first = line.take(cur.col).concat(&paste.line(0));
        buf.content = buf
            .content
            .take(cur.row)
            .push_back(first)
            .concat(&paste.skip(1))
            .concat(&buf.content.skip(cur.row + 1))
            .update(cur.row + n - 1, |l| l.concat(&tail));
    } else {
        buf.content = buf.content.concat(paste);
    }
    trace!(target: "state.edit", lines = n, "insert_text");
    let col = if n > 1 { last.len() } else { cur.col + last.len() };
    buf.cursor = Coord::new(cur.row + n - 1, col);
    buf
}
