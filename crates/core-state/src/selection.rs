//! Anchor based selection and clipboard extraction.
//!
//! The region runs between the anchor and the cursor in whichever order they
//! sort. A region that ends on the virtual line past the last line behaves as
//! if the content had one more, empty, line; that line is never added to the
//! buffer itself.

use crate::Buffer;
use core_text::{Coord, Text};
use tracing::trace;

pub fn start_selection(mut buf: Buffer) -> Buffer {
    buf.selection_anchor = Some(buf.cursor);
    buf
}

pub fn clear_selection(mut buf: Buffer) -> Buffer {
    buf.selection_anchor = None;
    buf
}

/// Cursor at the start, anchor on the virtual line after the end.
pub fn select_whole_buffer(mut buf: Buffer) -> Buffer {
    buf.cursor = Coord::origin();
    buf.selection_anchor = Some(Coord::new(buf.content.len(), 0));
    buf
}

fn clamp(buf: &Buffer, c: Coord) -> Coord {
    let row = c.row.min(buf.content.len());
    Coord::new(row, c.col.min(buf.line_len(row)))
}

/// Normalized `(start, end)` of the active selection, columns clamped to
/// their lines.
pub fn selected_region(buf: &Buffer) -> Option<(Coord, Coord)> {
    let anchor = buf.selection_anchor?;
    let a = clamp(buf, anchor);
    let b = clamp(buf, buf.cursor);
    Some((a.min(b), a.max(b)))
}

fn padded_content(buf: &Buffer, end: Coord) -> Text {
    if end.row == buf.content.len() {
        buf.content.push_back(Default::default())
    } else {
        buf.content.clone()
    }
}

pub fn selected_text(buf: &Buffer) -> Text {
    let Some((start, end)) = selected_region(buf) else {
        return Text::new();
    };
    if start == end {
        return Text::new();
    }
    padded_content(buf, end)
        .slice(start.row, end.row + 1)
        .update(end.row - start.row, |l| l.take(end.col))
        .update(0, |l| l.skip(start.col))
}

/// Remove the selected region and return it. The cursor lands on the region
/// start and the selection is cleared.
pub fn cut(mut buf: Buffer) -> (Buffer, Text) {
    let selection = selected_text(&buf);
    if let Some((start, end)) = selected_region(&buf)
        && start != end
    {
        if start.row != end.row {
            let content = padded_content(&buf, end);
            let joined = content
                .line(start.row)
                .take(start.col)
                .concat(&content.line(end.row).skip(end.col));
            buf.content = content
                .take(start.row)
                .push_back(joined)
                .concat(&buf.content.skip(end.row + 1));
        } else {
            buf.content = buf
                .content
                .update(start.row, |l| l.take(start.col).concat(&l.skip(end.col)));
        }
        buf.cursor = start;
        trace!(target: "state.edit", lines = selection.len(), "cut_region");
    }
    buf.selection_anchor = None;
    (buf, selection)
}

/// Return the selected region and clear the selection.
pub fn copy(mut buf: Buffer) -> (Buffer, Text) {
    let selection = selected_text(&buf);
    buf.selection_anchor = None;
    (buf, selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferId;
    use pretty_assertions::assert_eq;

    fn selecting(lines: &[&str], anchor: (usize, usize), cursor: (usize, usize)) -> Buffer {
        let mut b = Buffer::with_content(BufferId(0), Text::from_lines(lines.iter().copied()));
        b.selection_anchor = Some(Coord::new(anchor.0, anchor.1));
        b.cursor = Coord::new(cursor.0, cursor.1);
        b
    }

    #[test]
    fn region_is_ordered_and_clamped() {
        let b = selecting(&["abc", "de"], (1, 9), (0, 1));
        assert_eq!(
            selected_region(&b),
            Some((Coord::new(0, 1), Coord::new(1, 2)))
        );
        assert_eq!(selected_region(&clear_selection(b)), None);
    }

    #[test]
    fn same_line_cut() {
        let b = selecting(&["hello world"], (0, 6), (0, 11));
        assert_eq!(selected_text(&b), Text::from_lines(["world"]));
        let (b, text) = cut(b);
        assert_eq!(text, Text::from_lines(["world"]));
        assert_eq!(b.content, Text::from_lines(["hello "]));
        assert_eq!(b.cursor, Coord::new(0, 6));
        assert_eq!(b.selection_anchor, None);
    }

    #[test]
    fn multi_line_cut_joins_the_ends() {
        let b = selecting(&["abc", "def", "ghi"], (2, 1), (0, 1));
        let (b, text) = cut(b);
        assert_eq!(text, Text::from_lines(["bc", "def", "g"]));
        assert_eq!(b.content, Text::from_lines(["ahi"]));
        assert_eq!(b.cursor, Coord::new(0, 1));
    }

    #[test]
    fn whole_buffer_includes_trailing_line_break() {
        let b = select_whole_buffer(selecting(&["ab", "cd"], (0, 0), (1, 1)));
        assert_eq!(b.cursor, Coord::origin());
        assert_eq!(selected_text(&b), Text::from_lines(["ab", "cd", ""]));
        let (cut_buf, _) = cut(b.clone());
        assert_eq!(cut_buf.content, Text::from_lines([""]));
        let (copied, text) = copy(b.clone());
        assert_eq!(copied.content, b.content, "copy leaves content alone");
        assert_eq!(copied.selection_anchor, None);
        assert_eq!(text.len(), 3);
    }

    #[test]
    fn empty_region_yields_nothing() {
        let b = selecting(&["abc"], (0, 1), (0, 1));
        assert!(selected_text(&b).is_empty());
        let (after, text) = cut(b.clone());
        assert!(text.is_empty());
        assert_eq!(after.content, b.content);
        assert_eq!(after.selection_anchor, None);
    }
}
