//! Frame emission.
//!
//! Every row is repainted from column 0. Consecutive cells with the same
//! flags are batched into one `Print` so a plain text row costs a handful of
//! commands rather than one per cell.

use crate::{CellFlags, Frame};
use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
};
use std::io::{BufWriter, Write, stdout};
use tracing::trace;

/// Paint `frame` on the process's stdout.
pub fn present(frame: &Frame) -> Result<()> {
    let mut out = BufWriter::new(stdout().lock());
    write_frame(&mut out, frame)
}

pub fn write_frame<W: Write>(out: &mut W, frame: &Frame) -> Result<()> {
    queue!(out, Hide)?;
    let mut print_commands = 0usize;
    for y in 0..frame.height {
        queue!(out, MoveTo(0, y))?;
        let mut run = String::new();
        let mut run_flags = CellFlags::empty();
        for (cluster, _, flags, _) in frame.row_leaders(y) {
            if flags != run_flags && !run.is_empty() {
                emit(out, &run, run_flags)?;
                print_commands += 1;
                run.clear();
            }
            run_flags = flags;
            run.push_str(cluster);
        }
        if !run.is_empty() {
            emit(out, &run, run_flags)?;
            print_commands += 1;
        }
    }
    if let Some((x, y)) = frame.cursor {
        queue!(out, MoveTo(x, y), Show)?;
    }
    out.flush()?;
    trace!(target: "render", rows = frame.height, print_commands, "frame_written");
    Ok(())
}

fn emit<W: Write>(out: &mut W, text: &str, flags: CellFlags) -> Result<()> {
    if flags.is_empty() {
        queue!(out, Print(text))?;
        return Ok(());
    }
    if flags.contains(CellFlags::MODE_LINE_MESSAGE) {
        queue!(
            out,
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::White),
            SetBackgroundColor(Color::Red)
        )?;
    } else if flags.contains(CellFlags::SELECTION) {
        queue!(
            out,
            SetForegroundColor(Color::Black),
            SetBackgroundColor(Color::Yellow)
        )?;
    } else if flags.contains(CellFlags::MODE_LINE) {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    } else if flags.contains(CellFlags::MESSAGE) {
        queue!(out, SetForegroundColor(Color::Yellow))?;
    }
    queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
    Ok(())
}
