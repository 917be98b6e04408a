//! Commands whose work happens outside the reducer.

use super::command::bad_argument;
use super::{Outcome, put_message};
use crate::{Application, CommandArg, Effect, io_ops};
use core_state::{FileState, load_buffer, save_buffer};
use std::path::Path;
use tracing::{debug, info};

pub(super) fn quit(app: Application, arg: Option<CommandArg>) -> Outcome {
    if arg.is_some() {
        return (bad_argument(app, "quit"), None);
    }
    info!(target: "actions.dispatch", in_progress = app.current.io_in_progress(), "quit");
    let app = put_message(app, "quitting... (waiting for operations to finish)");
    (app, Some(Effect::new("quit", |ctx| ctx.finish())))
}

pub(super) fn save(mut app: Application, arg: Option<CommandArg>) -> Outcome {
    if arg.is_some() {
        return (bad_argument(app, "save"), None);
    }
    if app.current.io_in_progress() {
        return (
            put_message(app, "can't save while saving or loading the file"),
            None,
        );
    }
    if matches!(app.current.file, FileState::Unattached) {
        return (put_message(app, "can't save: buffer has no file name"), None);
    }
    if !app.current.is_dirty() {
        return (put_message(app, "nothing to save"), None);
    }
    let Some((buf, request)) = save_buffer(app.current.clone()) else {
        return (put_message(app, "can't save: buffer has no file name"), None);
    };
    let buffer = buf.id;
    debug!(target: "actions.dispatch", %buffer, lines = request.new_content.len(), "save_started");
    app.current = buf;
    let effect = Effect::new("save", move |ctx| {
        ctx.spawn_blocking("save", move |d, io| {
            io_ops::save_file(&d, buffer, request, io.save_progress_lines)
        })
    });
    (app, Some(effect))
}

pub(super) fn load(mut app: Application, arg: Option<CommandArg>) -> Outcome {
    let name = match arg {
        Some(CommandArg::Text(name)) if !name.is_empty() => name,
        None | Some(CommandArg::Text(_)) => {
            return (put_message(app, "load requires a file name"), None);
        }
        Some(_) => return (bad_argument(app, "load"), None),
    };
    if app.current.io_in_progress() {
        return (
            put_message(app, "can't load while saving or loading the file"),
            None,
        );
    }
    app.current = load_buffer(app.current, Path::new(&name));
    let Some(path) = app.current.file.path().cloned() else {
        return (app, None);
    };
    let buffer = app.current.id;
    debug!(target: "actions.dispatch", %buffer, path = %path.display(), "load_started");
    let effect = Effect::new("load", move |ctx| {
        ctx.spawn_blocking("load", move |d, io| {
            io_ops::load_file(&d, buffer, path, io.load_progress_bytes)
        })
    });
    (app, Some(effect))
}
