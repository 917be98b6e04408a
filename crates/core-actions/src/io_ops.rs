//! Load and save worker bodies.
//!
//! Both run on a blocking thread and talk to the reducer only through the
//! [`Dispatcher`]: zero or more progress events in increasing order, then
//! exactly one terminal done/error event. I/O failures never escape as
//! errors; they become error events carrying the best content available.

use crate::{Action, Dispatcher};
use core_state::{BufferId, BufferIoEvent, ExistingFile, LoadingFile, SavingFile, SaveRequest};
use core_text::{Line, Text, TextBuilder};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const CANCELLED: &str = "cancelled";

fn send(d: &Dispatcher, buffer: BufferId, event: BufferIoEvent) {
    d.dispatch(Action::BufferIo { buffer, event });
}

/// Stream `name` into a [`Text`], reporting every `quantum` bytes.
///
/// A file that does not exist loads as empty so saving later creates it.
/// Invalid UTF-8 is replaced, never rejected.
pub fn load_file(d: &Dispatcher, buffer: BufferId, name: Arc<Path>, quantum: u64) {
    let file = match File::open(&name) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "io", path = %name.display(), "load_new_file");
            let content = Text::new();
            send(d, buffer, BufferIoEvent::LoadNew(ExistingFile { name, content }));
            return;
        }
        Err(e) => {
            warn!(target: "io", path = %name.display(), error = %e, "load_open_failed");
            let file = ExistingFile {
                name,
                content: Text::new(),
            };
            let detail = e.to_string();
            send(d, buffer, BufferIoEvent::LoadError { file, detail });
            return;
        }
    };
    let total_bytes = file.metadata().map(|m| m.len()).unwrap_or(0);
    read_lines(d, buffer, name, file, total_bytes, quantum);
}

/// Split `source` into lines, streaming progress and the terminal event.
fn read_lines<R: Read>(
    d: &Dispatcher,
    buffer: BufferId,
    name: Arc<Path>,
    source: R,
    total_bytes: u64,
    quantum: u64,
) {
    let mut reader = BufReader::new(source);
    let mut builder = TextBuilder::new();
    let mut raw = Vec::new();
    let mut loaded_bytes = 0u64;
    let mut reported = 0u64;

    let failure = loop {
        if d.is_cancelled() {
            break Some(CANCELLED.to_string());
        }
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break None,
            Ok(n) => {
                loaded_bytes += n as u64;
                if raw.last() == Some(&b'\n') {
                    raw.pop();
                }
                builder.push(Line::from_utf8_lossy(&raw));
                if loaded_bytes - reported > quantum {
                    reported = loaded_bytes;
                    debug!(target: "io", loaded_bytes, total_bytes, "load_progress");
                    let progress = LoadingFile {
                        name: name.clone(),
                        content: builder.snapshot(),
                        loaded_bytes,
                        total_bytes,
                    };
                    send(d, buffer, BufferIoEvent::LoadProgress(progress));
                }
            }
            Err(e) => break Some(e.to_string()),
        }
    };

    let file = ExistingFile {
        name,
        content: builder.finish(),
    };
    match failure {
        None => {
            info!(target: "io", path = %file.name.display(), lines = file.content.len(), bytes = loaded_bytes, "load_done");
            send(d, buffer, BufferIoEvent::LoadDone(file));
        }
        Some(detail) => {
            warn!(target: "io", path = %file.name.display(), lines = file.content.len(), %detail, "load_failed");
            send(d, buffer, BufferIoEvent::LoadError { file, detail });
        }
    }
}

/// Write `request.new_content` line by line, reporting every `quantum` lines.
///
/// On failure the reported content is the new text up to the last line
/// written followed by the old text after it, which is what the file most
/// likely holds now.
pub fn save_file(d: &Dispatcher, buffer: BufferId, request: SaveRequest, quantum: usize) {
    save_with(d, buffer, request, quantum, |name| File::create(name).map(BufWriter::new));
}

/// [`save_file`] over whatever writer `create` opens for the file name.
fn save_with<W, F>(
    d: &Dispatcher,
    buffer: BufferId,
    request: SaveRequest,
    quantum: usize,
    create: F,
) where
    W: Write,
    F: FnOnce(&Path) -> io::Result<W>,
{
    let mut saved_lines = 0usize;
    let outcome = write_lines(d, buffer, &request, quantum.max(1), create, &mut saved_lines);
    let SaveRequest {
        name,
        old_content,
        new_content,
    } = request;
    match outcome {
        Ok(()) => {
            info!(target: "io", path = %name.display(), lines = saved_lines, "save_done");
            let file = ExistingFile {
                name,
                content: new_content,
            };
            send(d, buffer, BufferIoEvent::SaveDone(file));
        }
        Err(e) => {
            warn!(target: "io", path = %name.display(), saved_lines, error = %e, "save_failed");
            let content = new_content
                .take(saved_lines)
                .concat(&old_content.skip(saved_lines));
            let file = ExistingFile { name, content };
            let detail = e.to_string();
            send(d, buffer, BufferIoEvent::SaveError { file, detail });
        }
    }
}

fn write_lines<W: Write>(
    d: &Dispatcher,
    buffer: BufferId,
    request: &SaveRequest,
    quantum: usize,
    create: impl FnOnce(&Path) -> io::Result<W>,
    saved_lines: &mut usize,
) -> io::Result<()> {
    if d.is_cancelled() {
        return Err(io::Error::new(io::ErrorKind::Interrupted, CANCELLED));
    }
    let mut out = create(&request.name)?;
    let mut reported = 0usize;
    for line in request.new_content.iter() {
        if d.is_cancelled() {
            return Err(io::Error::new(io::ErrorKind::Interrupted, CANCELLED));
        }
        line.write_to(&mut out)?;
        out.write_all(b"\n")?;
        *saved_lines += 1;
        if *saved_lines - reported >= quantum {
            out.flush()?;
            reported = *saved_lines;
            debug!(target: "io", saved_lines = reported, "save_progress");
            let progress = SavingFile {
                name: request.name.clone(),
                content: request.new_content.clone(),
                saved_lines: reported,
            };
            send(d, buffer, BufferIoEvent::SaveProgress(progress));
        }
    }
    out.flush()
}
