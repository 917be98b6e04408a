mod common;
use common::app;

use core_actions::{Action, Application, update};
use core_events::{Key, KeyCode, parse_key_seq};
use core_text::{Coord, Text};
use pretty_assertions::assert_eq;

fn type_keys(app: Application, notation: &str) -> Application {
    let keys = parse_key_seq(notation).expect("valid notation");
    keys.iter().fold(app, |app, key| {
        let (app, effect) = update(app, Action::KeyPress(*key));
        assert!(effect.is_none(), "{notation}: unexpected effect");
        app
    })
}

fn lines(app: &Application) -> Vec<String> {
    app.current.content.iter().map(|l| l.to_string()).collect()
}

#[test]
fn emacs_session() {
    let app = type_keys(app(), "h e l l o RET w o r l d");
    assert_eq!(lines(&app), ["hello", "world"]);

    // Kill "world", go up, yank it at the start of "hello".
    let app = type_keys(app, "C-a C-k C-p C-y");
    assert_eq!(lines(&app), ["worldhello", ""]);
    assert_eq!(app.current.cursor, Coord::new(0, 5));

    // Undo the yank, then the kill.
    let app = type_keys(app, "C-_ C-/");
    assert_eq!(lines(&app), ["hello", "world"]);
}

#[test]
fn select_all_and_cut_empties_buffer() {
    let app = type_keys(app(), "a b RET c d");
    let app = type_keys(app, "C-x h C-w");
    assert_eq!(lines(&app), [""]);
    assert_eq!(app.clipboard, vec![Text::from_lines(["ab", "cd", ""])]);
    let app = type_keys(app, "C-y");
    assert_eq!(lines(&app), ["ab", "cd", ""]);
}

#[test]
fn region_copy_via_meta_w() {
    let app = type_keys(app(), "a b c d");
    let app = type_keys(app, "C-a C-f C-SPC C-f C-f M-w C-e C-y");
    assert_eq!(lines(&app), ["abcdbc"]);
}

#[test]
fn sticky_column_survives_short_lines() {
    let app = type_keys(app(), "l o n g RET x RET l o n g e r");
    let app = type_keys(app, "C-p C-p C-e C-n");
    assert_eq!(app.current.cursor, Coord::new(1, 4));
    assert_eq!(app.current.actual_cursor(), Coord::new(1, 1));
    let app = type_keys(app, "C-n");
    assert_eq!(app.current.actual_cursor(), Coord::new(2, 4));
}

#[test]
fn shifted_and_unicode_characters_insert() {
    let keys = [
        Key::new(KeyCode::Char('A'), core_events::KeyModifiers::SHIFT),
        Key::char('é'),
        Key::char('語'),
    ];
    let app = keys
        .iter()
        .fold(app(), |app, key| update(app, Action::KeyPress(*key)).0);
    assert_eq!(lines(&app), ["Aé語"]);
    assert_eq!(app.current.cursor, Coord::new(0, 3));
}
