//! Raw mode and alternate screen, restored on drop.

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
        disable_raw_mode, enable_raw_mode,
    },
};
use std::io::stdout;
use tracing::{info, warn};

/// Holds the terminal in editor mode. Dropping the guard (including while
/// unwinding from a panic) puts the terminal back.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        execute!(stdout(), EnterAlternateScreen, Clear(ClearType::All))
            .context("enter alternate screen")?;
        info!(target: "render", "terminal_entered");
        Ok(Self { active: true })
    }

    pub fn set_title(&self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    /// Terminal size as `(cols, rows)`.
    pub fn size() -> Result<(u16, u16)> {
        crossterm::terminal::size().context("query terminal size")
    }

    pub fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(stdout(), LeaveAlternateScreen, Show)?;
        disable_raw_mode()?;
        info!(target: "render", "terminal_restored");
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            warn!(target: "render", error = %e, "terminal_restore_failed");
        }
    }
}
