//! Cursor motion and scrolling.
//!
//! Vertical motion only touches `cursor.row` and keeps the sticky column.
//! Horizontal motion starts from the actual (clamped) cursor and wraps across
//! line boundaries. Window sizes are `Coord { row: rows, col: columns }` of the
//! editing area.

use crate::Buffer;
use core_text::{Coord, expand_tabs};

pub fn move_cursor_up(mut buf: Buffer) -> Buffer {
    buf.cursor.row = buf.cursor.row.saturating_sub(1);
    buf
}

pub fn move_cursor_down(mut buf: Buffer) -> Buffer {
    buf.cursor.row = (buf.cursor.row + 1).min(buf.content.len());
    buf
}

pub fn move_cursor_left(mut buf: Buffer) -> Buffer {
    let cur = buf.actual_cursor();
    buf.cursor = match (cur.row, cur.col) {
        (0, 0) => cur,
        (row, 0) => Coord::new(row - 1, buf.line_len(row - 1)),
        (row, col) => Coord::new(row, col - 1),
    };
    buf
}

pub fn move_cursor_right(mut buf: Buffer) -> Buffer {
    let cur = buf.actual_cursor();
    if cur.col < buf.line_len(cur.row) {
        buf.cursor = Coord::new(cur.row, cur.col + 1);
    } else {
        buf = move_cursor_down(buf);
        buf.cursor.col = 0;
    }
    buf
}

pub fn move_line_start(mut buf: Buffer) -> Buffer {
    buf.cursor.col = 0;
    buf
}

pub fn move_line_end(mut buf: Buffer) -> Buffer {
    if buf.cursor.row < buf.content.len() {
        buf.cursor.col = buf.line_len(buf.cursor.row);
    }
    buf
}

pub fn move_buffer_start(mut buf: Buffer) -> Buffer {
    buf.cursor = Coord::origin();
    buf
}

pub fn move_buffer_end(mut buf: Buffer) -> Buffer {
    buf.cursor = Coord::new(buf.content.len(), 0);
    buf
}

/// Scroll one window up, keeping the cursor inside the new window.
pub fn page_up(mut buf: Buffer, size: Coord) -> Buffer {
    let rows = size.row;
    if buf.scroll.row > rows {
        buf.scroll.row -= rows;
        if buf.cursor.row >= buf.scroll.row + rows {
            buf.cursor.row = (buf.scroll.row + rows).saturating_sub(2);
        }
    } else if buf.scroll.row > 0 {
        buf.scroll.row = 0;
        if buf.cursor.row >= rows {
            buf.cursor.row = rows.saturating_sub(2);
        }
    } else {
        buf.cursor.row = 0;
    }
    buf
}

/// Scroll one window down; on the last page jump to the end instead.
pub fn page_down(mut buf: Buffer, size: Coord) -> Buffer {
    if buf.scroll.row + size.row < buf.content.len() {
        buf.scroll.row += size.row;
        if buf.cursor.row < buf.scroll.row {
            buf.cursor.row = buf.scroll.row + 1;
        }
    } else {
        buf.cursor.row = buf.content.len();
    }
    buf.cursor.row = buf.cursor.row.min(buf.content.len());
    buf
}

/// Adjust `scroll` so the actual cursor, in display columns, is inside a
/// window of `size`.
pub fn scroll_to_cursor(mut buf: Buffer, size: Coord) -> Buffer {
    let cur = buf.actual_cursor();
    let col = expand_tabs(&buf.content.line(cur.row), cur.col);
    let rows = size.row.max(1);
    let cols = size.col.max(1);
    if cur.row >= buf.scroll.row + rows {
        buf.scroll.row = cur.row + 1 - rows;
    } else if cur.row < buf.scroll.row {
        buf.scroll.row = cur.row;
    }
    if col >= buf.scroll.col + cols {
        buf.scroll.col = col + 1 - cols;
    } else if col < buf.scroll.col {
        buf.scroll.col = col;
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferId;
    use core_text::Text;

    fn at(lines: &[&str], row: usize, col: usize) -> Buffer {
        let mut b = Buffer::with_content(BufferId(0), Text::from_lines(lines.iter().copied()));
        b.cursor = Coord::new(row, col);
        b
    }

    #[test]
    fn right_wraps_to_next_line() {
        let b = move_cursor_right(at(&["ab", "cd"], 0, 2));
        assert_eq!(b.cursor, Coord::new(1, 0));
        // virtual column past the end counts as end of line
        let b = move_cursor_right(at(&["ab", "cd"], 0, 9));
        assert_eq!(b.cursor, Coord::new(1, 0));
        // last line wraps onto the virtual line, which is a dead end
        let b = move_cursor_right(at(&["ab"], 0, 2));
        assert_eq!(b.cursor, Coord::new(1, 0));
        let b = move_cursor_right(b);
        assert_eq!(b.cursor, Coord::new(1, 0));
    }

    #[test]
    fn left_wraps_to_previous_line_end() {
        let b = move_cursor_left(at(&["abc", "d"], 1, 0));
        assert_eq!(b.cursor, Coord::new(0, 3));
        let b = move_cursor_left(at(&["abc"], 0, 0));
        assert_eq!(b.cursor, Coord::new(0, 0));
        let b = move_cursor_left(at(&["abc"], 0, 10));
        assert_eq!(b.cursor, Coord::new(0, 2), "starts from the clamped column");
    }

    #[test]
    fn vertical_motion_keeps_sticky_column() {
        let b = at(&["long line", "ab", "another long"], 0, 7);
        let b = move_cursor_down(b);
        assert_eq!(b.cursor, Coord::new(1, 7));
        assert_eq!(b.actual_cursor(), Coord::new(1, 2));
        let b = move_cursor_down(b);
        assert_eq!(b.actual_cursor(), Coord::new(2, 7));
        let b = move_cursor_down(move_cursor_down(b));
        assert_eq!(b.cursor.row, 3, "clamped to the virtual last line");
        let b = move_cursor_up(move_cursor_up(move_cursor_up(move_cursor_up(b))));
        assert_eq!(b.cursor, Coord::new(0, 7));
    }

    #[test]
    fn line_and_buffer_ends() {
        let b = move_line_end(at(&["hello", "x"], 0, 1));
        assert_eq!(b.cursor.col, 5);
        assert_eq!(move_line_start(b.clone()).cursor.col, 0);
        assert_eq!(move_buffer_end(b.clone()).cursor, Coord::new(2, 0));
        assert_eq!(move_buffer_start(b).cursor, Coord::origin());
    }

    #[test]
    fn paging() {
        let lines: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let size = Coord::new(10, 80);
        let b = page_down(at(&refs, 0, 0), size);
        assert_eq!(b.scroll.row, 10);
        assert_eq!(b.cursor.row, 11);
        let b = page_up(b, size);
        assert_eq!(b.scroll.row, 0);
        assert_eq!(b.cursor.row, 8);
        let b = page_up(b, size);
        assert_eq!(b.cursor.row, 0);

        let mut near_end = at(&refs, 95, 0);
        near_end.scroll.row = 92;
        assert_eq!(page_down(near_end, size).cursor.row, 100);
    }

    #[test]
    fn scroll_follows_cursor_in_display_columns() {
        let b = scroll_to_cursor(at(&["\t\tx"], 0, 2), Coord::new(5, 10));
        assert_eq!(b.scroll.col, 7);
        let lines: Vec<String> = (0..30).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let b = scroll_to_cursor(at(&refs, 25, 0), Coord::new(10, 10));
        assert_eq!(b.scroll.row, 16);
        let mut b = b;
        b.cursor.row = 3;
        assert_eq!(scroll_to_cursor(b, Coord::new(10, 10)).scroll.row, 3);
    }
}
