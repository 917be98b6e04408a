#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{Action, Application, Effect, EffectContext, update};
use core_config::IoConfig;
use core_keymap::KeyMap;
use core_text::Coord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

pub fn app() -> Application {
    let keys = KeyMap::defaults().expect("default bindings");
    Application::new(Arc::new(keys), Coord::new(24, 80))
}

/// Reducer plus effect context wired the way the binary wires them.
pub struct Harness {
    pub app: Application,
    pub ctx: EffectContext,
    rx: UnboundedReceiver<Action>,
}

impl Harness {
    pub fn new(io: IoConfig) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            app: app(),
            ctx: EffectContext::new(tx, io),
            rx,
        }
    }

    /// Reduce `action` and run its effect, if any. Returns the effect label.
    pub fn apply(&mut self, action: Action) -> Option<&'static str> {
        let (app, effect) = update(self.app.clone(), action);
        self.app = app;
        effect.map(|e: Effect| {
            let label = e.label();
            e.run(&self.ctx);
            label
        })
    }

    /// Feed dispatched actions back into the reducer until the buffer has no
    /// I/O in flight. Returns how many actions were reduced.
    pub async fn settle(&mut self) -> usize {
        let mut reduced = 0;
        while self.app.current.io_in_progress() {
            let action = tokio::time::timeout(Duration::from_secs(10), self.rx.recv())
                .await
                .expect("worker reported in time")
                .expect("channel open");
            self.apply(action);
            reduced += 1;
        }
        reduced
    }

    pub fn try_recv(&mut self) -> Option<Action> {
        self.rx.try_recv().ok()
    }
}
