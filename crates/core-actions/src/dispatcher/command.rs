//! Named command registry.
//!
//! The table is built once on first use and never changes. Each entry pairs a
//! name with an adaptor describing how the underlying function is applied to
//! the application: plain buffer edits, edits that also yield clipboard text,
//! scroll commands that need the editor size, and whole-application commands
//! that may return an effect.

use super::edit::{apply_edit, apply_yielding_edit};
use super::{Outcome, file, put_message};
use crate::{Application, CommandArg, editor_size};
use core_state::{self as state, Buffer};
use core_text::{Coord, Text};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, trace};

type EditFn = fn(Buffer) -> Buffer;
type YieldFn = fn(Buffer) -> (Buffer, Text);
type CharFn = fn(Buffer, char) -> Buffer;
type PasteFn = fn(Buffer, &Text) -> Buffer;
type ScrollFn = fn(Buffer, Coord) -> Buffer;
type AppFn = fn(Application, Option<CommandArg>) -> Outcome;

#[derive(Clone, Copy)]
enum Command {
    Edit(EditFn),
    /// Edit that also hands back text for the clipboard.
    Yield(YieldFn),
    /// Edit taking a character argument.
    Char(CharFn),
    /// Edit applied to the most recent clipboard entry.
    Paste(PasteFn),
    Scroll(ScrollFn),
    App(AppFn),
}

static COMMANDS: LazyLock<HashMap<&'static str, Command>> = LazyLock::new(|| {
    use Command::*;
    HashMap::from([
        ("insert", Char(state::insert_char)),
        ("delete-char", Edit(state::delete_char)),
        ("delete-char-right", Edit(state::delete_char_right)),
        ("insert-tab", Edit(state::insert_tab)),
        ("kill-line", Yield(state::cut_rest)),
        ("copy", Yield(state::copy)),
        ("cut", Yield(state::cut)),
        ("move-beginning-of-line", Edit(state::move_line_start)),
        ("move-end-of-line", Edit(state::move_line_end)),
        ("move-beginning-buffer", Edit(state::move_buffer_start)),
        ("move-end-buffer", Edit(state::move_buffer_end)),
        ("move-up", Edit(state::move_cursor_up)),
        ("move-down", Edit(state::move_cursor_down)),
        ("move-left", Edit(state::move_cursor_left)),
        ("move-right", Edit(state::move_cursor_right)),
        ("new-line", Edit(state::insert_new_line)),
        ("page-up", Scroll(state::page_up)),
        ("page-down", Scroll(state::page_down)),
        ("paste", Paste(state::insert_text)),
        ("quit", App(file::quit)),
        ("save", App(file::save)),
        ("load", App(file::load)),
        ("message", App(message)),
        ("undo", Edit(state::undo)),
        ("start-selection", Edit(state::start_selection)),
        ("select-whole-buffer", Edit(state::select_whole_buffer)),
        ("noop", App(noop)),
    ])
});

/// Every registered command name, sorted.
pub fn command_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = COMMANDS.keys().copied().collect();
    names.sort_unstable();
    names
}

pub(super) fn invoke(app: Application, name: &str, arg: Option<CommandArg>) -> Outcome {
    let Some(command) = COMMANDS.get(name).copied() else {
        debug!(target: "actions.dispatch", command = name, "unknown_command");
        return (put_message(app, format!("unknown command: {name}")), None);
    };
    trace!(target: "actions.dispatch", command = name, has_arg = arg.is_some(), "invoke");
    let app = put_message(app, format!("calling command: {name}"));
    match (command, arg) {
        (Command::App(f), arg) => f(app, arg),
        (Command::Edit(f), None) => {
            let after = f(app.current.clone());
            (apply_edit(app, after), None)
        }
        (Command::Yield(f), None) => {
            let after = f(app.current.clone());
            (apply_yielding_edit(app, after), None)
        }
        (Command::Char(f), Some(CommandArg::Char(ch))) => {
            let after = f(app.current.clone(), ch);
            (apply_edit(app, after), None)
        }
        (Command::Paste(f), None) => match app.clipboard.last() {
            Some(clip) => {
                let after = f(app.current.clone(), clip);
                (apply_edit(app, after), None)
            }
            None => (app, None),
        },
        (Command::Scroll(f), None) => {
            let size = editor_size(&app);
            let mut app = app;
            app.current = f(app.current, size);
            (app, None)
        }
        _ => (bad_argument(app, name), None),
    }
}

pub(super) fn bad_argument(app: Application, name: &str) -> Application {
    debug!(target: "actions.dispatch", command = name, "bad_argument");
    put_message(app, format!("bad argument for command: {name}"))
}

fn message(app: Application, arg: Option<CommandArg>) -> Outcome {
    match arg {
        Some(CommandArg::Text(text)) => (put_message(app, text), None),
        _ => (bad_argument(app, "message"), None),
    }
}

fn noop(app: Application, _arg: Option<CommandArg>) -> Outcome {
    (app, None)
}
