use crate::Line;
use ropey::Rope;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// An immutable sequence of lines.
///
/// Internally every line is stored followed by `'\n'`, so the rope is either
/// empty or ends with a newline and `len() == rope.len_lines() - 1`.
///
/// Each value produced by an operation gets a fresh revision number while
/// clones keep it, which lets equality answer `true` without walking the
/// content when both sides are copies of the same value.
#[derive(Clone)]
pub struct Text {
    rope: Rope,
    revision: u64,
}

impl Text {
    pub fn new() -> Self {
        Self::from_rope(Rope::new())
    }

    fn from_rope(rope: Rope) -> Self {
        debug_assert!(rope.len_chars() == 0 || rope.char(rope.len_chars() - 1) == '\n');
        Self {
            rope,
            revision: next_revision(),
        }
    }

    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Line>,
    {
        let mut builder = TextBuilder::new();
        for line in lines {
            builder.push(line.into());
        }
        builder.finish()
    }

    /// Split `s` on `'\n'`; a trailing newline does not open an extra line.
    pub fn parse(s: &str) -> Self {
        let body = s.strip_suffix('\n').unwrap_or(s);
        if s.is_empty() {
            return Self::new();
        }
        Self::from_lines(body.split('\n'))
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.rope.len_lines() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Character index where line `row` starts; `row == len()` is the end.
    fn line_start(&self, row: usize) -> usize {
        self.rope.line_to_char(row.min(self.len()))
    }

    /// Character range of line `row` without its newline. Caller checks `row < len()`.
    fn line_range(&self, row: usize) -> (usize, usize) {
        (self.line_start(row), self.line_start(row + 1) - 1)
    }

    pub fn get(&self, row: usize) -> Option<Line> {
        if row >= self.len() {
            return None;
        }
        let (start, end) = self.line_range(row);
        Some(Line::from_rope(Rope::from(self.rope.slice(start..end))))
    }

    /// Line `row`, or an empty line when out of range.
    pub fn line(&self, row: usize) -> Line {
        self.get(row).unwrap_or_default()
    }

    /// Length in characters of line `row` (0 when out of range).
    pub fn line_len(&self, row: usize) -> usize {
        if row >= self.len() {
            return 0;
        }
        let (start, end) = self.line_range(row);
        end - start
    }

    pub fn last(&self) -> Option<Line> {
        self.len().checked_sub(1).and_then(|row| self.get(row))
    }

    /// The first `n` lines.
    pub fn take(&self, n: usize) -> Text {
        if n >= self.len() {
            return self.clone();
        }
        let mut rope = self.rope.clone();
        rope.remove(self.line_start(n)..);
        Text::from_rope(rope)
    }

    /// All lines after the first `n` (the "drop" of the sequence API).
    pub fn skip(&self, n: usize) -> Text {
        if n == 0 {
            return self.clone();
        }
        let mut rope = self.rope.clone();
        rope.remove(..self.line_start(n));
        Text::from_rope(rope)
    }

    /// Lines `[from, to)`, clamped to the text.
    pub fn slice(&self, from: usize, to: usize) -> Text {
        if to <= from {
            return Text::new();
        }
        self.take(to).skip(from)
    }

    pub fn concat(&self, other: &Text) -> Text {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut rope = self.rope.clone();
        rope.append(other.rope.clone());
        Text::from_rope(rope)
    }

    /// Replace line `row`. Out of range rows leave the text unchanged.
    pub fn set(&self, row: usize, line: Line) -> Text {
        if row >= self.len() {
            tracing::trace!(target: "text", row, len = self.len(), "set_out_of_range");
            return self.clone();
        }
        let (start, end) = self.line_range(row);
        let mut rope = self.rope.clone();
        rope.remove(start..end);
        let tail = rope.split_off(start);
        rope.append(line.rope().clone());
        rope.append(tail);
        Text::from_rope(rope)
    }

    /// Apply `f` to line `row`. Out of range rows leave the text unchanged.
    pub fn update<F>(&self, row: usize, f: F) -> Text
    where
        F: FnOnce(Line) -> Line,
    {
        match self.get(row) {
            Some(line) => self.set(row, f(line)),
            None => self.clone(),
        }
    }

    /// Insert `line` before `row` (clamped to `len()`, i.e. append).
    pub fn insert(&self, row: usize, line: Line) -> Text {
        let at = self.line_start(row);
        let mut rope = self.rope.clone();
        let tail = rope.split_off(at);
        let mut inserted = line.rope().clone();
        inserted.insert_char(inserted.len_chars(), '\n');
        rope.append(inserted);
        rope.append(tail);
        Text::from_rope(rope)
    }

    pub fn push_back(&self, line: Line) -> Text {
        self.insert(self.len(), line)
    }

    /// Remove line `row` (the "erase" of the sequence API).
    pub fn remove(&self, row: usize) -> Text {
        if row >= self.len() {
            return self.clone();
        }
        let mut rope = self.rope.clone();
        rope.remove(self.line_start(row)..self.line_start(row + 1));
        Text::from_rope(rope)
    }

    pub fn iter(&self) -> Lines<'_> {
        Lines {
            text: self,
            row: 0,
        }
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text::parse(s)
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.revision == other.revision || self.rope == other.rope
    }
}

impl Eq for Text {}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rope.hash(state);
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// The content as it would be written to disk: one `'\n'` after every line.
impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Text {
    type Item = Line;
    type IntoIter = Lines<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Lines<'a> {
    text: &'a Text,
    row: usize,
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        let line = self.text.get(self.row)?;
        self.row += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.text.len().saturating_sub(self.row);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Lines<'_> {}

/// Transient, append-only form of [`Text`] used while streaming content in.
#[derive(Default)]
pub struct TextBuilder {
    rope: Rope,
}

impl TextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line) {
        let mut appended = line.rope().clone();
        appended.insert_char(appended.len_chars(), '\n');
        self.rope.append(appended);
    }

    pub fn push_line(&mut self, line: &str) {
        self.push(Line::from(line));
    }

    pub fn len(&self) -> usize {
        self.rope.len_lines() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Persistent copy of what has been pushed so far; building can continue.
    pub fn snapshot(&self) -> Text {
        Text::from_rope(self.rope.clone())
    }

    pub fn finish(self) -> Text {
        Text::from_rope(self.rope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(t: &Text) -> Vec<String> {
        t.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn empty_text_has_no_lines() {
        let t = Text::new();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.get(0), None);
        assert_eq!(t.line(3), Line::new());
        assert_eq!(Text::parse(""), t);
    }

    #[test]
    fn parse_ignores_single_trailing_newline() {
        assert_eq!(lines(&Text::parse("a\nb\n")), ["a", "b"]);
        assert_eq!(lines(&Text::parse("a\nb")), ["a", "b"]);
        assert_eq!(lines(&Text::parse("a\n\n")), ["a", ""]);
        assert_eq!(lines(&Text::parse("\n")), [""]);
    }

    #[test]
    fn carriage_returns_are_ordinary_characters() {
        let t = Text::parse("a\r\nb\r\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.line(0), "a\r");
        assert_eq!(t.line_len(0), 2);
    }

    #[test]
    fn take_skip_slice_concat() {
        let t = Text::from_lines(["a", "b", "c", "d"]);
        assert_eq!(lines(&t.take(2)), ["a", "b"]);
        assert_eq!(lines(&t.skip(3)), ["d"]);
        assert_eq!(lines(&t.skip(9)), Vec::<String>::new());
        assert_eq!(lines(&t.slice(1, 3)), ["b", "c"]);
        assert_eq!(lines(&t.take(1).concat(&t.skip(2))), ["a", "c", "d"]);
    }

    #[test]
    fn indexed_update_insert_remove() {
        let t = Text::from_lines(["one", "two"]);
        assert_eq!(lines(&t.set(1, Line::from("2"))), ["one", "2"]);
        assert_eq!(lines(&t.insert(0, Line::from("zero"))), ["zero", "one", "two"]);
        assert_eq!(lines(&t.insert(7, Line::from("end"))), ["one", "two", "end"]);
        assert_eq!(lines(&t.remove(0)), ["two"]);
        assert_eq!(lines(&t.update(0, |l| l.insert_char(0, '1'))), ["1one", "two"]);
        assert_eq!(lines(&t.set(5, Line::from("x"))), ["one", "two"]);
        assert_eq!(lines(&t.push_back(Line::new())), ["one", "two", ""]);
    }

    #[test]
    fn operations_never_change_the_source() {
        let t = Text::from_lines(["alpha", "beta", "gamma"]);
        let before = t.to_string();
        let _ = t.set(0, Line::from("x"));
        let _ = t.insert(1, Line::from("y"));
        let _ = t.remove(2);
        let _ = t.take(1).concat(&t.skip(1));
        assert_eq!(t.to_string(), before);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn equality_is_by_value_across_revisions() {
        let a = Text::from_lines(["x", "y"]);
        let b = Text::parse("x\ny\n");
        assert_eq!(a, b);
        assert_eq!(a.clone(), a);
        assert_ne!(a, a.remove(0));
    }

    #[test]
    fn builder_snapshots_are_independent() {
        let mut b = TextBuilder::new();
        b.push_line("first");
        let snap = b.snapshot();
        b.push_line("second");
        assert_eq!(snap.len(), 1);
        let done = b.finish();
        assert_eq!(lines(&done), ["first", "second"]);
        assert_eq!(lines(&snap), ["first"]);
    }

    #[test]
    fn display_writes_one_newline_per_line() {
        assert_eq!(Text::from_lines(["a", ""]).to_string(), "a\n\n");
        assert_eq!(Text::new().to_string(), "");
    }
}
