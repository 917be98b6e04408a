//! Terminal input source.
//!
//! Reads crossterm events on a Tokio task and hands each one to a sink as an
//! [`InputEvent`]. The sink returns `false` once nobody is listening, which
//! stops the task. Key events arrive already in binding form: control chords
//! lower-cased and Alt chords split into `ESC` + key.

mod async_service;
mod key_token;

pub use async_service::InputShutdown;

use async_service::spawn_event_task;
use core_events::InputEvent;
use tokio::task::JoinHandle;

/// Spawn the input task backed by `crossterm::EventStream`.
///
/// Returns the task's `JoinHandle` alongside a shutdown handle that stops it
/// even while it waits for the terminal.
pub fn spawn_input<F>(sink: F) -> (JoinHandle<()>, InputShutdown)
where
    F: FnMut(InputEvent) -> bool + Send + 'static,
{
    spawn_event_task(sink)
}
