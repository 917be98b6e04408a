//! The editor's state machine.
//!
//! [`update`] folds one [`Action`] into an [`Application`] value and returns
//! the next value plus at most one [`Effect`]. The reducer itself never blocks
//! and never touches the filesystem: loads and saves are effects that run on
//! blocking worker threads and report back by dispatching
//! [`Action::BufferIo`] events into the same queue the input task feeds.
//!
//! Telemetry:
//! - `actions.dispatch`: command resolution, key sequence outcomes.
//! - `actions.effect`: effect execution, worker spawn/join, cancellation.
//! - `io`: load/save worker progress and failures (sizes and paths only).

use core_events::{Key, KeySeq};
use core_keymap::KeyMap;
use core_state::{Buffer, BufferId, BufferIoEvent};
use core_text::{Coord, Text};
use std::sync::Arc;
use std::time::SystemTime;

mod dispatcher;
mod effect;
pub mod io_ops;

pub use dispatcher::{command_names, editor_size, update};
pub use effect::{Dispatcher, Effect, EffectContext};

/// Argument carried by a command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArg {
    Char(char),
    Text(String),
}

#[derive(Debug, Clone)]
pub enum Action {
    /// Run a registered command by name.
    Command {
        name: String,
        arg: Option<CommandArg>,
    },
    KeyPress(Key),
    /// New terminal size: `row` lines by `col` columns.
    Resize(Coord),
    /// Progress or completion of a load/save for `buffer`.
    BufferIo {
        buffer: BufferId,
        event: BufferIoEvent,
    },
}

impl Action {
    pub fn command(name: impl Into<String>) -> Self {
        Action::Command {
            name: name.into(),
            arg: None,
        }
    }

    pub fn command_with(name: impl Into<String>, arg: CommandArg) -> Self {
        Action::Command {
            name: name.into(),
            arg: Some(arg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub time: SystemTime,
    pub text: String,
}

/// Everything the reducer knows. Passed and returned by value.
#[derive(Debug, Clone)]
pub struct Application {
    pub current: Buffer,
    pub keys: Arc<KeyMap>,
    /// Keys typed so far of an unfinished sequence.
    pub input: KeySeq,
    /// Cut/copied fragments, most recent last.
    pub clipboard: Vec<Text>,
    pub messages: Vec<Message>,
    /// Terminal size; the text area is two lines shorter.
    pub window_size: Coord,
}

impl Application {
    pub fn new(keys: Arc<KeyMap>, window_size: Coord) -> Self {
        Self {
            current: Buffer::new(BufferId(0)),
            keys,
            input: KeySeq::new(),
            clipboard: Vec::new(),
            messages: Vec::new(),
            window_size,
        }
    }

    /// The message normally shown on the status line.
    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(|m| m.text.as_str())
    }
}
