use ropey::Rope;
use std::fmt;
use std::io::{self, Write};

/// One line of text, without its terminating newline.
///
/// Stored as UTF-8 inside a rope; lengths and columns count code points.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Line {
    rope: Rope,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_rope(rope: Rope) -> Self {
        Self { rope }
    }

    pub(crate) fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Decode raw bytes, replacing invalid sequences with U+FFFD.
    pub fn from_utf8_lossy(bytes: &[u8]) -> Self {
        Self::from(String::from_utf8_lossy(bytes).as_ref())
    }

    /// Number of code points.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Byte offset of character `col`; columns past the end clamp to the line length.
    pub fn char_offset(&self, col: usize) -> usize {
        self.rope.char_to_byte(col.min(self.len()))
    }

    /// The first `n` characters.
    pub fn take(&self, n: usize) -> Line {
        if n >= self.len() {
            return self.clone();
        }
        let mut rope = self.rope.clone();
        rope.remove(n..);
        Line::from_rope(rope)
    }

    /// Everything after the first `n` characters.
    pub fn skip(&self, n: usize) -> Line {
        let n = n.min(self.len());
        let mut rope = self.rope.clone();
        rope.remove(..n);
        Line::from_rope(rope)
    }

    pub fn concat(&self, other: &Line) -> Line {
        let mut rope = self.rope.clone();
        rope.append(other.rope.clone());
        Line::from_rope(rope)
    }

    /// Insert `ch` before character `col` (clamped). A newline is stored as U+FFFD.
    pub fn insert_char(&self, col: usize, ch: char) -> Line {
        let ch = if ch == '\n' { char::REPLACEMENT_CHARACTER } else { ch };
        let mut rope = self.rope.clone();
        rope.insert_char(col.min(self.len()), ch);
        Line::from_rope(rope)
    }

    /// Remove character `col`; out of range is a no-op.
    pub fn remove_char(&self, col: usize) -> Line {
        if col >= self.len() {
            return self.clone();
        }
        let mut rope = self.rope.clone();
        rope.remove(col..col + 1);
        Line::from_rope(rope)
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.rope.chars()
    }

    /// Write the UTF-8 bytes of the line (no newline).
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for chunk in self.rope.chunks() {
            out.write_all(chunk.as_bytes())?;
        }
        Ok(())
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        if s.contains('\n') {
            let repaired = s.replace('\n', "\u{FFFD}");
            return Line::from_rope(Rope::from_str(&repaired));
        }
        Line::from_rope(Rope::from_str(s))
    }
}

impl From<String> for Line {
    fn from(s: String) -> Self {
        Line::from(s.as_str())
    }
}

impl PartialEq<&str> for Line {
    fn eq(&self, other: &&str) -> bool {
        self.rope == *other
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string(), f)
    }
}
