//! Screen composition and terminal output.
//!
//! Drawing is split in two so layout can be tested without a terminal:
//! [`compose`] turns an [`Application`](core_actions::Application) into a
//! [`Frame`] (a grid of cells plus a cursor position), and
//! [`writer::write_frame`] emits a frame through crossterm.
//!
//! Layout, top to bottom: the text area (window height minus two rows), the
//! mode line, the message line.
//!
//! Invariants:
//! - Leader cells have width >= 1 and a non-empty cluster.
//! - Continuation cells (width 0) follow the leader of a wide character and
//!   never print.
//! - Zero-width characters join the cluster of the cell before them.

use bitflags::bitflags;

mod compose;
pub mod status;
pub mod terminal;
pub mod writer;

pub use compose::compose;
pub use terminal::TerminalGuard;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        const SELECTION         = 0b0000_0001;
        const MODE_LINE         = 0b0000_0010;
        const MODE_LINE_MESSAGE = 0b0000_0100;
        const MESSAGE           = 0b0000_1000;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Printed text of a leader cell. Empty for continuation cells.
    pub cluster: String,
    /// Columns taken. `0` marks a continuation cell.
    pub width: u8,
    pub flags: CellFlags,
}

impl Cell {
    pub fn leader(cluster: &str, width: u16, flags: CellFlags) -> Self {
        Self {
            cluster: cluster.to_string(),
            width: width.clamp(1, 2) as u8,
            flags,
        }
    }

    pub fn continuation(flags: CellFlags) -> Self {
        Self {
            cluster: String::new(),
            width: 0,
            flags,
        }
    }

    pub fn is_leader(&self) -> bool {
        self.width > 0
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::leader(" ", 1, CellFlags::empty())
    }
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
    /// Terminal cursor `(x, y)`; `None` hides it.
    pub cursor: Option<(u16, u16)>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
            cursor: None,
        }
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Place `cluster` at `(x, y)` followed by continuation cells for the
    /// rest of its width. A cluster that does not fit is replaced by blanks.
    pub fn set_cluster(&mut self, x: u16, y: u16, cluster: &str, width: u16, flags: CellFlags) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let width = width.clamp(1, 2);
        if x as u32 + width as u32 > self.width as u32 {
            for dx in x..self.width {
                if let Some(i) = self.index(dx, y) {
                    self.cells[i] = Cell::leader(" ", 1, flags);
                }
            }
            return;
        }
        self.cells[idx] = Cell::leader(cluster, width, flags);
        for dx in 1..width {
            self.cells[idx + dx as usize] = Cell::continuation(flags);
        }
    }

    /// Append a zero-width character to the leader cell at or before `x`.
    pub fn join_cluster(&mut self, x: u16, y: u16, ch: char) {
        let mut x = x;
        while let Some(idx) = self.index(x, y) {
            if self.cells[idx].is_leader() {
                self.cells[idx].cluster.push(ch);
                return;
            }
            let Some(prev) = x.checked_sub(1) else {
                return;
            };
            x = prev;
        }
    }

    /// Write `text` left to right from `(x, y)`, stopping at the right edge.
    /// Returns the column after the last cell written.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, flags: CellFlags) -> u16 {
        let mut at = x;
        for ch in text.chars() {
            if at >= self.width {
                break;
            }
            let w = core_text::width::char_width(ch, at as usize);
            if w == 0 {
                if at > x {
                    self.join_cluster(at - 1, y, ch);
                }
                continue;
            }
            if ch == '\t' {
                for dx in 0..w as u16 {
                    self.set_cluster(at.saturating_add(dx), y, " ", 1, flags);
                }
            } else {
                self.set_cluster(at, y, printable(ch).encode_utf8(&mut [0; 4]), w as u16, flags);
            }
            at = at.saturating_add(w as u16);
        }
        at.min(self.width)
    }

    /// Add `flags` to cells `[from, to)` of row `y`.
    pub fn apply_flags_span(&mut self, from: u16, to: u16, y: u16, flags: CellFlags) {
        for x in from..to.min(self.width) {
            if let Some(idx) = self.index(x, y) {
                self.cells[idx].flags |= flags;
            }
        }
    }

    /// Leader cells of row `y` as `(cluster, width, flags, x)`.
    pub fn row_leaders(&self, y: u16) -> impl Iterator<Item = (&str, u16, CellFlags, u16)> + '_ {
        let row = match self.index(0, y) {
            Some(start) => &self.cells[start..start + self.width as usize],
            None => &[],
        };
        row.iter()
            .enumerate()
            .filter(|(_, c)| c.is_leader())
            .map(|(x, c)| (c.cluster.as_str(), c.width as u16, c.flags, x as u16))
    }

    /// Row `y` as a string, trailing blanks included.
    pub fn row_text(&self, y: u16) -> String {
        self.row_leaders(y).map(|(c, ..)| c).collect()
    }
}

/// Control characters show as U+FFFD so they cannot drive the terminal.
pub(crate) fn printable(ch: char) -> char {
    if ch.is_control() {
        char::REPLACEMENT_CHARACTER
    } else {
        ch
    }
}
