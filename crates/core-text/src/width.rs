//! Display columns.
//!
//! Tabs advance to the next multiple of [`TAB_WIDTH`]; other characters take
//! their `unicode-width` cell count. Control characters (no defined width)
//! count as one cell so the cursor never lands on a zero-width column.

use crate::Line;
use unicode_width::UnicodeWidthChar;

pub const TAB_WIDTH: usize = 8;

/// Cells taken by `ch` when it starts at display column `at`.
pub fn char_width(ch: char, at: usize) -> usize {
    if ch == '\t' {
        return TAB_WIDTH - at % TAB_WIDTH;
    }
    ch.width().unwrap_or(1)
}

/// Display column of character index `col` in `line`, with tabs expanded.
/// Columns past the end of the line are clamped.
pub fn expand_tabs(line: &Line, col: usize) -> usize {
    line.chars()
        .take(col)
        .fold(0, |at, ch| at + char_width(ch, at))
}
