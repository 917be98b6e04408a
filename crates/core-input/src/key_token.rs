use core_events::{Key, KeyCode, KeyModifiers, KeySeq};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

/// Map a crossterm key event to the keys the editor sees.
///
/// Alt chords come out the way a terminal sends them, `ESC` then the key, so
/// `M-` bindings resolve through the `ESC` prefix. Shift only survives on
/// characters, so shifted arrows and paging keys act like plain ones. Releases
/// and key codes with no editor meaning (media keys, lone modifiers, function
/// keys) map to `None`.
pub(crate) fn map_key_event(event: &CKeyEvent) -> Option<KeySeq> {
    if matches!(event.kind, CKeyEventKind::Release) {
        return None;
    }
    let code = map_key_code(&event.code)?;
    let mods = map_mods(event.modifiers);
    let key = match code {
        KeyCode::Char(c) if mods.contains(KeyModifiers::CTRL) => {
            Key::new(KeyCode::Char(c.to_ascii_lowercase()), mods - KeyModifiers::ALT)
        }
        KeyCode::Char(c) => Key::new(KeyCode::Char(c), mods - KeyModifiers::ALT),
        code => Key::new(code, mods - KeyModifiers::ALT - KeyModifiers::SHIFT),
    };
    if mods.contains(KeyModifiers::ALT) {
        return Some(Key::alt(key));
    }
    let mut seq = KeySeq::new();
    seq.push(key);
    Some(seq)
}

pub(crate) fn map_key_code(code: &CKeyCode) -> Option<KeyCode> {
    let code = match code {
        CKeyCode::Char(c) => KeyCode::Char(*c),
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Tab | CKeyCode::BackTab => KeyCode::Tab,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Insert
        | CKeyCode::F(_)
        | CKeyCode::Null
        | CKeyCode::CapsLock
        | CKeyCode::ScrollLock
        | CKeyCode::NumLock
        | CKeyCode::PrintScreen
        | CKeyCode::Pause
        | CKeyCode::Menu
        | CKeyCode::KeypadBegin
        | CKeyCode::Media(_)
        | CKeyCode::Modifier(_) => return None,
    };
    Some(code)
}

/// SUPER/HYPER/META have no binding notation and are dropped.
pub(crate) fn map_mods(mods: CKeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if mods.contains(CKeyModifiers::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if mods.contains(CKeyModifiers::ALT) {
        out |= KeyModifiers::ALT;
    }
    if mods.contains(CKeyModifiers::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::parse_key_seq;
    use crossterm::event::KeyEventState as CKeyEventState;

    fn key_event(code: CKeyCode, modifiers: CKeyModifiers, kind: CKeyEventKind) -> CKeyEvent {
        CKeyEvent {
            code,
            modifiers,
            kind,
            state: CKeyEventState::empty(),
        }
    }

    fn press(code: CKeyCode, modifiers: CKeyModifiers) -> Option<KeySeq> {
        map_key_event(&key_event(code, modifiers, CKeyEventKind::Press))
    }

    #[test]
    fn maps_basic_char() {
        let seq = press(CKeyCode::Char('a'), CKeyModifiers::NONE).expect("char should map");
        assert_eq!(seq.as_slice(), &[Key::char('a')]);
    }

    #[test]
    fn maps_named_keys() {
        let seq = press(CKeyCode::Enter, CKeyModifiers::NONE).expect("enter should map");
        assert_eq!(seq, parse_key_seq("RET").unwrap());
        let seq = press(CKeyCode::PageDown, CKeyModifiers::NONE).unwrap();
        assert_eq!(seq, parse_key_seq("<next>").unwrap());
        let seq = press(CKeyCode::BackTab, CKeyModifiers::SHIFT).unwrap();
        assert_eq!(seq[0].code, KeyCode::Tab);
    }

    #[test]
    fn control_chords_match_binding_notation() {
        let seq = press(CKeyCode::Char('X'), CKeyModifiers::CONTROL).unwrap();
        assert_eq!(seq, parse_key_seq("C-x").unwrap());
        let seq = press(CKeyCode::Char(' '), CKeyModifiers::CONTROL).unwrap();
        assert_eq!(seq, parse_key_seq("C-SPC").unwrap());
    }

    #[test]
    fn alt_becomes_escape_prefix() {
        let seq = press(CKeyCode::Char('w'), CKeyModifiers::ALT).unwrap();
        assert_eq!(seq, parse_key_seq("M-w").unwrap());
        assert_eq!(seq.len(), 2);
        assert!(seq[0].is_esc());
    }

    #[test]
    fn shifted_char_stays_insertable() {
        let seq = press(CKeyCode::Char('Q'), CKeyModifiers::SHIFT).unwrap();
        assert_eq!(seq[0].as_plain_char(), Some('Q'));
    }

    #[test]
    fn shift_is_dropped_from_named_keys() {
        let seq = press(CKeyCode::Up, CKeyModifiers::SHIFT).unwrap();
        assert_eq!(seq, parse_key_seq("<up>").unwrap());
        let seq = press(CKeyCode::PageDown, CKeyModifiers::SHIFT).unwrap();
        assert_eq!(seq, parse_key_seq("<next>").unwrap());
        let seq = press(CKeyCode::End, CKeyModifiers::SHIFT | CKeyModifiers::CONTROL).unwrap();
        assert_eq!(seq, parse_key_seq("C-<end>").unwrap());
        let seq = press(CKeyCode::Left, CKeyModifiers::SHIFT | CKeyModifiers::ALT).unwrap();
        assert_eq!(seq, parse_key_seq("M-<left>").unwrap());
    }

    #[test]
    fn repeats_map_and_releases_do_not() {
        let ev = key_event(CKeyCode::Char('j'), CKeyModifiers::NONE, CKeyEventKind::Repeat);
        assert!(map_key_event(&ev).is_some());
        let ev = key_event(CKeyCode::Char('j'), CKeyModifiers::NONE, CKeyEventKind::Release);
        assert!(map_key_event(&ev).is_none());
    }

    #[test]
    fn unsupported_keys_return_none() {
        assert!(press(CKeyCode::CapsLock, CKeyModifiers::NONE).is_none());
        assert!(press(CKeyCode::F(5), CKeyModifiers::NONE).is_none());
    }
}
