//! Key model and input events shared by the input source, the key map and the reducer.
//!
//! Keys are normalized the way a terminal reports them: `Ctrl` chords carry
//! lower-case letters, and `Alt`/`Meta` chords are an `Esc` key followed by
//! the plain key (see [`Key::alt`]). Binding tables use the Emacs chord
//! notation parsed by [`parse_key_seq`]: `C-x C-s`, `M-w`, `RET`, `<up>`.

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Normalized logical key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Esc,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

/// Keys pressed so far; most sequences are one or two keys long.
pub type KeySeq = SmallVec<[Key; 4]>;

impl Key {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    /// `Ctrl` + `c`. Letters are stored lower case, so `ctrl('G') == ctrl('g')`.
    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), KeyModifiers::CTRL)
    }

    /// `Alt` + `key` as a terminal delivers it: `Esc` then the key.
    pub fn alt(key: Key) -> KeySeq {
        let mut seq = KeySeq::new();
        seq.push(Key::plain(KeyCode::Esc));
        seq.push(key);
        seq
    }

    /// The hard-wired cancel chord (`C-g`).
    pub fn is_cancel(&self) -> bool {
        *self == Key::ctrl('g')
    }

    pub fn is_esc(&self) -> bool {
        self.code == KeyCode::Esc && self.mods.is_empty()
    }

    /// The character this key types, when it is a plain printable character.
    /// Shift is allowed since it is already folded into the character.
    pub fn as_plain_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if (self.mods - KeyModifiers::SHIFT).is_empty() && !c.is_control() => {
                Some(c)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("empty key sequence")]
    Empty,
    #[error("unknown key name: {0}")]
    UnknownKey(String),
    #[error("modifier without a key: {0}")]
    MissingKey(String),
}

fn parse_base(name: &str) -> Result<KeyCode, KeyParseError> {
    let code = match name {
        "RET" => KeyCode::Enter,
        "TAB" => KeyCode::Tab,
        "SPC" => KeyCode::Char(' '),
        "ESC" => KeyCode::Esc,
        "DEL" | "<backspace>" => KeyCode::Backspace,
        "<delete>" | "<deletechar>" => KeyCode::Delete,
        "<up>" => KeyCode::Up,
        "<down>" => KeyCode::Down,
        "<left>" => KeyCode::Left,
        "<right>" => KeyCode::Right,
        "<home>" => KeyCode::Home,
        "<end>" => KeyCode::End,
        "<prior>" | "<pgup>" => KeyCode::PageUp,
        "<next>" | "<pgdn>" => KeyCode::PageDown,
        "<return>" => KeyCode::Enter,
        "<tab>" => KeyCode::Tab,
        "<escape>" => KeyCode::Esc,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(KeyParseError::UnknownKey(name.to_string())),
            }
        }
    };
    Ok(code)
}

/// Parse one chord token (`C-x`, `M-w`, `C-M-f`, `<up>`). `M-` expands to a
/// leading `Esc`, so a token yields one or two keys.
pub fn parse_chord(token: &str) -> Result<KeySeq, KeyParseError> {
    if token.is_empty() {
        return Err(KeyParseError::Empty);
    }
    let mut rest = token;
    let mut mods = KeyModifiers::empty();
    while rest.len() > 2 {
        if let Some(r) = rest.strip_prefix("C-") {
            mods |= KeyModifiers::CTRL;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("M-") {
            mods |= KeyModifiers::ALT;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("S-") {
            mods |= KeyModifiers::SHIFT;
            rest = r;
        } else {
            break;
        }
    }
    if rest.is_empty() {
        return Err(KeyParseError::MissingKey(token.to_string()));
    }
    let mut code = parse_base(rest)?;
    if mods.contains(KeyModifiers::CTRL)
        && let KeyCode::Char(c) = code
    {
        code = KeyCode::Char(c.to_ascii_lowercase());
    }
    let key = Key::new(code, mods - KeyModifiers::ALT);
    if mods.contains(KeyModifiers::ALT) {
        return Ok(Key::alt(key));
    }
    let mut seq = KeySeq::new();
    seq.push(key);
    Ok(seq)
}

/// Parse a whitespace separated chord sequence such as `"C-x C-s"`.
pub fn parse_key_seq(notation: &str) -> Result<KeySeq, KeyParseError> {
    let mut seq = KeySeq::new();
    for token in notation.split_whitespace() {
        seq.extend(parse_chord(token)?);
    }
    if seq.is_empty() {
        return Err(KeyParseError::Empty);
    }
    Ok(seq)
}

/// Format keys in chord notation, one token per key.
pub fn format_key_seq(keys: &[Key]) -> String {
    keys.iter()
        .map(Key::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for Key {
    type Err = KeyParseError;

    /// A single key. `M-` chords expand to two keys and are rejected here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seq = parse_chord(s)?;
        match seq.as_slice() {
            [key] => Ok(*key),
            _ => Err(KeyParseError::UnknownKey(s.to_string())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.contains(KeyModifiers::CTRL) {
            f.write_str("C-")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            f.write_str("M-")?;
        }
        if self.mods.contains(KeyModifiers::SHIFT) && !matches!(self.code, KeyCode::Char(_)) {
            f.write_str("S-")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("SPC"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => f.write_str("RET"),
            KeyCode::Tab => f.write_str("TAB"),
            KeyCode::Backspace => f.write_str("DEL"),
            KeyCode::Delete => f.write_str("<delete>"),
            KeyCode::Esc => f.write_str("ESC"),
            KeyCode::Up => f.write_str("<up>"),
            KeyCode::Down => f.write_str("<down>"),
            KeyCode::Left => f.write_str("<left>"),
            KeyCode::Right => f.write_str("<right>"),
            KeyCode::Home => f.write_str("<home>"),
            KeyCode::End => f.write_str("<end>"),
            KeyCode::PageUp => f.write_str("<prior>"),
            KeyCode::PageDown => f.write_str("<next>"),
        }
    }
}

/// Normalized events produced by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn ctrl_letters_are_lower_case() {
        assert_eq!(Key::ctrl('G'), Key::ctrl('g'));
        assert!(Key::ctrl('G').is_cancel());
        assert_eq!(parse_key_seq("C-X").unwrap().as_slice(), &[Key::ctrl('x')]);
    }

    #[test]
    fn emacs_notation() {
        let seq = parse_key_seq("C-x C-s").unwrap();
        assert_eq!(seq.as_slice(), &[Key::ctrl('x'), Key::ctrl('s')]);

        let seq = parse_key_seq("M-w").unwrap();
        assert_eq!(seq, Key::alt(Key::char('w')));

        let seq = parse_key_seq("RET TAB SPC DEL <delete> <prior> <pgdn>").unwrap();
        let expected: KeySeq = smallvec![
            Key::plain(KeyCode::Enter),
            Key::plain(KeyCode::Tab),
            Key::char(' '),
            Key::plain(KeyCode::Backspace),
            Key::plain(KeyCode::Delete),
            Key::plain(KeyCode::PageUp),
            Key::plain(KeyCode::PageDown),
        ];
        assert_eq!(seq, expected);

        assert_eq!(parse_key_seq("C-SPC").unwrap()[0], Key::ctrl(' '));
        assert_eq!(parse_key_seq("C--").unwrap()[0], Key::ctrl('-'));
        assert_eq!(parse_key_seq("-").unwrap()[0], Key::char('-'));
    }

    #[test]
    fn notation_errors() {
        assert_eq!(parse_key_seq("   "), Err(KeyParseError::Empty));
        assert_eq!(
            parse_key_seq("C-x <f13>"),
            Err(KeyParseError::UnknownKey("<f13>".into()))
        );
        assert!(matches!(
            parse_key_seq("foo"),
            Err(KeyParseError::UnknownKey(_))
        ));
        assert!("M-x".parse::<Key>().is_err());
    }

    #[test]
    fn display_is_parseable() {
        for notation in ["C-x", "SPC", "C-SPC", "RET", "<up>", "DEL", "<next>", "a", "C-_"] {
            let key: Key = notation.parse().unwrap();
            assert_eq!(key.to_string(), notation);
        }
        assert_eq!(format_key_seq(&parse_key_seq("M-w").unwrap()), "ESC w");
    }

    #[test]
    fn plain_char_detection() {
        assert_eq!(Key::char('a').as_plain_char(), Some('a'));
        assert_eq!(
            Key::new(KeyCode::Char('A'), KeyModifiers::SHIFT).as_plain_char(),
            Some('A')
        );
        assert_eq!(Key::ctrl('a').as_plain_char(), None);
        assert_eq!(Key::char('\u{1b}').as_plain_char(), None);
        assert_eq!(Key::plain(KeyCode::Enter).as_plain_char(), None);
    }
}
