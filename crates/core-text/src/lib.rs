//! Persistent, structurally shared text storage.
//!
//! A [`Text`] is an ordered sequence of [`Line`]s. Both are thin wrappers over
//! `ropey::Rope`, whose clones are O(1) and share their tree nodes; every
//! operation here takes `&self` and hands back a new value, so older values
//! (held by undo history or the clipboard) stay valid and unchanged.
//!
//! Columns are measured in Unicode code points. Conversion to byte offsets
//! goes through [`Line::char_offset`], which clamps out-of-range columns to
//! the line length. Display columns (tab stops, wide characters) live in
//! [`width`].

mod line;
mod text;
pub mod width;

pub use line::Line;
pub use text::{Lines, Text, TextBuilder};
pub use width::{TAB_WIDTH, expand_tabs};

/// A position in a text: `row` is a line index, `col` a code point index.
///
/// Ordering is by row, then column. A cursor row may equal the number of
/// lines in the text (the virtual line after the last one) and a cursor
/// column may exceed the length of its line; callers clamp when reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn origin() -> Self {
        Self { row: 0, col: 0 }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
