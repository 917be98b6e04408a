use crate::status::{message_line, mode_line, progress_tag};
use crate::{CellFlags, Frame, printable};
use core_actions::{Application, editor_size};
use core_state::{Buffer, selected_region};
use core_text::width::char_width;
use core_text::{Coord, Line, expand_tabs};

/// Lay out the whole screen for `app`.
pub fn compose(app: &Application) -> Frame {
    let mut frame = Frame::new(clamp_u16(app.window_size.col), clamp_u16(app.window_size.row));
    let size = editor_size(app);
    let buf = &app.current;

    draw_text(&mut frame, buf, size);

    let mode_row = clamp_u16(size.row);
    frame.put_str(0, mode_row, &mode_line(buf), CellFlags::MODE_LINE);
    frame.apply_flags_span(0, frame.width, mode_row, CellFlags::MODE_LINE);
    if let Some((start, tag)) = progress_tag(&buf.file, frame.width) {
        frame.put_str(start, mode_row, &tag, CellFlags::MODE_LINE_MESSAGE);
    }

    if let Some(text) = app.last_message() {
        frame.put_str(0, mode_row.saturating_add(1), &message_line(text), CellFlags::MESSAGE);
    }

    frame.cursor = text_cursor(buf, size);
    frame
}

fn clamp_u16(n: usize) -> u16 {
    n.min(u16::MAX as usize) as u16
}

fn draw_text(frame: &mut Frame, buf: &Buffer, size: Coord) {
    let first = buf.scroll.row.min(buf.content.len());
    let last = (buf.scroll.row + size.row).min(buf.content.len());
    let region = selected_region(buf).map(|(start, end)| {
        let start_col = expand_tabs(&buf.content.line(start.row), start.col);
        let end_col = expand_tabs(&buf.content.line(end.row), end.col);
        (Coord::new(start.row, start_col), Coord::new(end.row, end_col))
    });

    for (y, row) in (first..last).enumerate() {
        let y = clamp_u16(y);
        draw_line(frame, y, &buf.content.line(row), buf.scroll.col, size.col);

        let Some((start, end)) = region else {
            continue;
        };
        if row < start.row || row > end.row {
            continue;
        }
        let from = if row == start.row {
            start.col.saturating_sub(buf.scroll.col)
        } else {
            0
        };
        let to = if row == end.row {
            end.col.saturating_sub(buf.scroll.col)
        } else {
            size.col
        };
        frame.apply_flags_span(clamp_u16(from), clamp_u16(to), y, CellFlags::SELECTION);
    }
}

/// Draw display columns `[first_col, first_col + num_col)` of `line` on row
/// `y`. Tabs and characters cut by the left edge show as blanks.
fn draw_line(frame: &mut Frame, y: u16, line: &Line, first_col: usize, num_col: usize) {
    let end_col = first_col + num_col;
    let mut at = 0usize;
    for ch in line.chars() {
        if at >= end_col {
            break;
        }
        let w = char_width(ch, at);
        if w == 0 {
            if at > first_col {
                frame.join_cluster(clamp_u16(at - first_col - 1), y, ch);
            }
            continue;
        }
        if ch == '\t' || at < first_col {
            for col in at.max(first_col)..(at + w).min(end_col) {
                frame.set_cluster(clamp_u16(col - first_col), y, " ", 1, CellFlags::empty());
            }
        } else {
            let mut utf8 = [0; 4];
            let cluster = printable(ch).encode_utf8(&mut utf8);
            frame.set_cluster(clamp_u16(at - first_col), y, cluster, w as u16, CellFlags::empty());
        }
        at += w;
    }
}

/// Screen position of the cursor, or `None` when it is scrolled out of the
/// text area.
fn text_cursor(buf: &Buffer, size: Coord) -> Option<(u16, u16)> {
    let row = buf.cursor.row;
    let col = expand_tabs(&buf.content.line(row), buf.cursor.col);
    let visible = col >= buf.scroll.col
        && row >= buf.scroll.row
        && col < buf.scroll.col + size.col
        && row < buf.scroll.row + size.row;
    visible.then(|| (clamp_u16(col - buf.scroll.col), clamp_u16(row - buf.scroll.row)))
}
