//! Reducer: `(Application, Action) -> (Application, Option<Effect>)`.
//!
//! * `command` - the registry of named commands and their argument adaptors
//! * `edit`    - committing buffer edits through the undo log
//! * `file`    - load, save and quit, the commands that produce effects
//!
//! Key presses are resolved here against the application's key map. A
//! completed binding is run immediately as a command invocation through this
//! same function, so a key press never needs an effect of its own.

use crate::{Action, Application, CommandArg, Effect, Message};
use core_events::Key;
use core_keymap::Binding;
use core_state::{BufferId, BufferIoEvent, update_buffer};
use core_text::Coord;
use std::time::SystemTime;
use tracing::{debug, trace, warn};

mod command;
mod edit;
mod file;

pub use command::command_names;

pub type Outcome = (Application, Option<Effect>);

pub fn update(app: Application, action: Action) -> Outcome {
    match action {
        Action::Command { name, arg } => command::invoke(app, &name, arg),
        Action::KeyPress(key) => handle_key(app, key),
        Action::Resize(size) => {
            debug!(target: "actions.dispatch", rows = size.row, cols = size.col, "resize");
            let mut app = app;
            app.window_size = size;
            (app, None)
        }
        Action::BufferIo { buffer, event } => (handle_buffer_io(app, buffer, event), None),
    }
}

/// Size of the text area: the window minus the mode line and message line.
pub fn editor_size(app: &Application) -> Coord {
    Coord::new(app.window_size.row.saturating_sub(2), app.window_size.col)
}

/// Append `text` to the message log. Empty text is dropped.
pub(crate) fn put_message(mut app: Application, text: impl Into<String>) -> Application {
    let text = text.into();
    if !text.is_empty() {
        app.messages.push(Message {
            time: SystemTime::now(),
            text,
        });
    }
    app
}

enum Resolved {
    Command(String),
    Prefix,
    Unbound,
}

fn handle_key(mut app: Application, key: Key) -> Outcome {
    if key.is_cancel() {
        app.input.clear();
        return (put_message(app, "cancel"), None);
    }
    app.input.push(key);
    let resolved = match app.keys.lookup(&app.input) {
        Some(Binding::Command(name)) => Resolved::Command(name.to_string()),
        Some(Binding::Prefix) => Resolved::Prefix,
        None => Resolved::Unbound,
    };
    match resolved {
        Resolved::Command(name) => {
            trace!(target: "actions.dispatch", keys = app.input.len(), command = %name, "key_sequence_bound");
            app.input.clear();
            update(app, Action::Command { name, arg: None })
        }
        Resolved::Prefix => (app, None),
        Resolved::Unbound if app.input.len() == 1 && key.is_esc() => (app, None),
        Resolved::Unbound => {
            let single = match app.input.as_slice() {
                [only] => only.as_plain_char(),
                _ => None,
            };
            app.input.clear();
            match single {
                Some(ch) => update(app, Action::command_with("insert", CommandArg::Char(ch))),
                None => {
                    trace!(target: "actions.dispatch", "key_sequence_unbound");
                    (put_message(app, "unbound key sequence"), None)
                }
            }
        }
    }
}

fn handle_buffer_io(mut app: Application, buffer: BufferId, event: BufferIoEvent) -> Application {
    if buffer != app.current.id {
        warn!(target: "actions.dispatch", %buffer, current = %app.current.id, "io_event_for_unknown_buffer");
        return app;
    }
    let (buf, message) = update_buffer(app.current, event);
    app.current = buf;
    match message {
        Some(text) => put_message(app, text),
        None => app,
    }
}
