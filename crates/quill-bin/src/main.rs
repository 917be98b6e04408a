//! quill entrypoint.
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use core_actions::{Action, Application, CommandArg, EffectContext, update};
use core_config::Config;
use core_events::InputEvent;
use core_input::InputShutdown;
use core_render::{TerminalGuard, compose, writer::present};
use core_text::Coord;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "quill.log";
const INPUT_JOIN_TIMEOUT: Duration = Duration::from_millis(200);

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "A small Emacs-style text editor")]
struct Args {
    /// File to open. It is created on first save if it does not exist.
    pub path: Option<PathBuf>,
    /// Configuration file (overrides discovery of `quill.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Default)]
struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                error!(target: "runtime.panic", %info, "panic");
                default_panic(info);
            }));
        });
    }

    fn load_config(args: &Args) -> Result<Config> {
        let config = core_config::load_from(args.config.clone())?;
        info!(
            target: "runtime",
            source = ?config.source,
            config_override = args.config.is_some(),
            "config_loaded"
        );
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    Quit,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Quit => "quit",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

fn input_action(event: InputEvent) -> Action {
    match event {
        InputEvent::Key(key) => Action::KeyPress(key),
        InputEvent::Resize(cols, rows) => Action::Resize(Coord::new(rows as usize, cols as usize)),
    }
}

/// Reduce one action and run the effect it produced, if any.
fn step(app: Application, action: Action, ctx: &EffectContext) -> Application {
    let (app, effect) = update(app, action);
    if let Some(effect) = effect {
        debug!(target: "runtime", effect = effect.label(), "effect_run");
        effect.run(ctx);
    }
    app
}

struct EditorRuntime {
    ctx: EffectContext,
    rx: UnboundedReceiver<Action>,
    input_task: Option<JoinHandle<()>>,
    input_shutdown: Option<InputShutdown>,
    shutdown_grace: Duration,
}

impl EditorRuntime {
    async fn run(&mut self, mut app: Application) -> Result<ShutdownReason> {
        present(&compose(&app))?;

        while let Some(action) = self.rx.recv().await {
            app = step(app, action, &self.ctx);
            // Fold whatever else is queued before redrawing.
            while !self.ctx.is_finished() {
                let Ok(action) = self.rx.try_recv() else {
                    break;
                };
                app = step(app, action, &self.ctx);
            }
            present(&compose(&app))?;
            if self.ctx.is_finished() {
                return Ok(ShutdownReason::Quit);
            }
        }
        Ok(ShutdownReason::ChannelClosed)
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        log_shutdown_stage(reason, "begin");

        let in_flight = self.ctx.in_flight();
        if in_flight > 0 {
            info!(target: "runtime.shutdown", in_flight, "waiting_for_io_workers");
        }
        let cancelled = self.ctx.join_pending(self.shutdown_grace).await;
        if cancelled > 0 {
            warn!(target: "runtime.shutdown", cancelled, "io_workers_cancelled");
        }
        self.rx.close();

        if let Some(shutdown) = self.input_shutdown.take() {
            trace!(
                target: "runtime.shutdown",
                reason = reason.as_str(),
                "input_task_shutdown_signal"
            );
            shutdown.signal();
        }

        if let Some(handle) = self.input_task.take() {
            match tokio::time::timeout(INPUT_JOIN_TIMEOUT, handle).await {
                Ok(Ok(())) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_joined"
                ),
                Ok(Err(err)) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_cancelled"
                ),
                Ok(Err(err)) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "input_task_join_failed"
                ),
                Err(_) => warn!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_timeout"
                ),
            }
        }

        log_shutdown_stage(reason, "complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::default();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", version = env!("CARGO_PKG_VERSION"), "startup");

    let config = AppStartup::load_config(&args)?;
    let keys = Arc::new(config.key_map()?);

    let guard = TerminalGuard::enter()?;
    if let Err(e) = guard.set_title("quill") {
        debug!(target: "runtime", error = %e, "set_title_failed");
    }
    let (cols, rows) = TerminalGuard::size()?;
    let app = Application::new(keys, Coord::new(rows as usize, cols as usize));

    let (tx, rx) = mpsc::unbounded_channel::<Action>();
    let ctx = EffectContext::new(tx.clone(), config.io());
    let (input_task, input_shutdown) = {
        let tx = tx.clone();
        core_input::spawn_input(move |event| tx.send(input_action(event)).is_ok())
    };
    if let Some(path) = &args.path {
        let name = path.to_string_lossy().into_owned();
        info!(target: "runtime", path = %name, "initial_load");
        tx.send(Action::command_with("load", CommandArg::Text(name)))
            .map_err(|_| anyhow!("event loop closed before startup finished"))?;
    }
    drop(tx);

    let mut runtime = EditorRuntime {
        ctx,
        rx,
        input_task: Some(input_task),
        input_shutdown: Some(input_shutdown),
        shutdown_grace: config.runtime().shutdown_grace(),
    };
    let outcome = runtime.run(app).await;
    let reason = outcome.as_ref().copied().unwrap_or(ShutdownReason::ChannelClosed);
    runtime.finalize_shutdown(reason).await;
    drop(guard);
    outcome.map(|_| ()).context("editor loop failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Key;
    use core_keymap::KeyMap;
    use pretty_assertions::assert_eq;

    fn app() -> Application {
        Application::new(Arc::new(KeyMap::defaults().unwrap()), Coord::new(24, 80))
    }

    #[test]
    fn cli_accepts_path_and_config() {
        let args = Args::try_parse_from(["quill", "notes.txt", "--config", "q.toml"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("notes.txt")));
        assert_eq!(args.config, Some(PathBuf::from("q.toml")));
        let bare = Args::try_parse_from(["quill"]).unwrap();
        assert!(bare.path.is_none() && bare.config.is_none());
    }

    #[test]
    fn terminal_resize_is_rows_by_cols() {
        match input_action(InputEvent::Resize(100, 30)) {
            Action::Resize(size) => assert_eq!(size, Coord::new(30, 100)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            input_action(InputEvent::Key(Key::char('a'))),
            Action::KeyPress(k) if k == Key::char('a')
        ));
    }

    #[test]
    fn quit_chord_finishes_the_loop() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let ctx = EffectContext::new(tx, Default::default());
        let app = step(app(), Action::KeyPress(Key::ctrl('x')), &ctx);
        assert!(!ctx.is_finished());
        let app = step(app, Action::KeyPress(Key::ctrl('c')), &ctx);
        assert!(ctx.is_finished());
        assert_eq!(
            app.last_message(),
            Some("quitting... (waiting for operations to finish)")
        );
    }
}
