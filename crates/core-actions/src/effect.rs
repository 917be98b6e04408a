//! Effects and the context that runs them.
//!
//! An [`Effect`] is the reducer's only way to reach outside the state value.
//! The run loop hands each one the shared [`EffectContext`]; long running work
//! is moved to a blocking worker that only receives a [`Dispatcher`], so it can
//! report back with actions but has no path to the application state.

use crate::Action;
use core_config::IoConfig;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

type EffectFn = Box<dyn FnOnce(&EffectContext) + Send>;

pub struct Effect {
    label: &'static str,
    run: EffectFn,
}

impl Effect {
    pub fn new<F>(label: &'static str, run: F) -> Self
    where
        F: FnOnce(&EffectContext) + Send + 'static,
    {
        Self {
            label,
            run: Box::new(run),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn run(self, ctx: &EffectContext) {
        trace!(target: "actions.effect", label = self.label, "run");
        (self.run)(ctx)
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect").field("label", &self.label).finish()
    }
}

/// Handle given to background workers: enqueue actions, observe cancellation.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    tx: UnboundedSender<Action>,
    cancelled: Arc<AtomicBool>,
}

impl Dispatcher {
    /// Queue `action` for the reducer. Returns false once the loop is gone.
    pub fn dispatch(&self, action: Action) -> bool {
        if self.tx.send(action).is_err() {
            debug!(target: "actions.effect", "dispatch_after_close");
            return false;
        }
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

pub struct EffectContext {
    dispatcher: Dispatcher,
    io: IoConfig,
    finished: AtomicBool,
    pending: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
}

impl EffectContext {
    pub fn new(tx: UnboundedSender<Action>, io: IoConfig) -> Self {
        Self {
            dispatcher: Dispatcher {
                tx,
                cancelled: Arc::new(AtomicBool::new(false)),
            },
            io,
            finished: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn dispatch(&self, action: Action) -> bool {
        self.dispatcher.dispatch(action)
    }

    /// Ask the run loop to stop after the current action.
    pub fn finish(&self) {
        info!(target: "actions.effect", "finish_requested");
        self.finished.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn io(&self) -> IoConfig {
        self.io
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Run `work` on the blocking pool and track it until [`join_pending`].
    /// Must be called from within a tokio runtime.
    ///
    /// [`join_pending`]: EffectContext::join_pending
    pub fn spawn_blocking<F>(&self, label: &'static str, work: F)
    where
        F: FnOnce(Dispatcher, IoConfig) + Send + 'static,
    {
        let dispatcher = self.dispatcher();
        let io = self.io;
        let handle = tokio::task::spawn_blocking(move || work(dispatcher, io));
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|(_, h)| !h.is_finished());
        pending.push((label, handle));
        debug!(target: "actions.effect", label, in_flight = pending.len(), "worker_spawned");
    }

    /// Tell every worker to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.dispatcher.cancelled.store(true, Ordering::Release);
        info!(target: "actions.effect", "cancel_requested");
    }

    pub fn in_flight(&self) -> usize {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.iter().filter(|(_, h)| !h.is_finished()).count()
    }

    /// Wait up to `grace` for tracked workers, then cancel the rest and wait
    /// for them to notice. Returns how many had to be cancelled.
    pub async fn join_pending(&self, grace: Duration) -> usize {
        let handles = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *pending)
        };
        let deadline = tokio::time::Instant::now() + grace;
        let mut late = Vec::new();
        for (label, mut handle) in handles {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => trace!(target: "actions.effect", label, "worker_joined"),
                Ok(Err(e)) => warn!(target: "actions.effect", label, error = %e, "worker_failed"),
                Err(_) => late.push((label, handle)),
            }
        }
        let cancelled = late.len();
        if cancelled > 0 {
            self.cancel();
            for (label, handle) in late {
                if let Err(e) = handle.await {
                    warn!(target: "actions.effect", label, error = %e, "worker_failed");
                }
                debug!(target: "actions.effect", label, "worker_joined_after_cancel");
            }
        }
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn effect_runs_against_context() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ctx = EffectContext::new(tx, IoConfig::default());
        let effect = Effect::new("ping", |ctx| {
            ctx.dispatch(Action::command("noop"));
            ctx.finish();
        });
        assert_eq!(effect.label(), "ping");
        effect.run(&ctx);
        assert!(ctx.is_finished());
        assert!(matches!(rx.try_recv(), Ok(Action::Command { name, .. }) if name == "noop"));
    }

    #[test]
    fn dispatch_reports_closed_loop() {
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = EffectContext::new(tx, IoConfig::default());
        drop(rx);
        assert!(!ctx.dispatch(Action::command("noop")));
    }

    #[tokio::test]
    async fn slow_worker_is_cancelled_after_grace() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let ctx = EffectContext::new(tx, IoConfig::default());
        ctx.spawn_blocking("quick", |_, _| {});
        ctx.spawn_blocking("slow", |d, _| {
            while !d.is_cancelled() {
                std::thread::sleep(Duration::from_millis(1));
            }
        });
        let cancelled = ctx.join_pending(Duration::from_millis(200)).await;
        assert_eq!(cancelled, 1);
        assert!(ctx.dispatcher().is_cancelled());
        assert_eq!(ctx.in_flight(), 0);
    }
}
