use crate::key_token::map_key_event;
use core_events::InputEvent;
use crossterm::event::{Event as CEvent, EventStream};
use std::io;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task;
use tokio_stream::StreamExt;
use tracing::{Instrument, info, trace, warn};

#[derive(Clone, Debug)]
pub struct InputShutdown {
    notify: Arc<Notify>,
}

impl InputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    fn new_pair() -> (InputShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            InputShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Spawn a Tokio task reading the terminal through `EventStream`.
pub(crate) fn spawn_event_task<F>(sink: F) -> (task::JoinHandle<()>, InputShutdown)
where
    F: FnMut(InputEvent) -> bool + Send + 'static,
{
    let (shutdown, listener) = ShutdownListener::new_pair();
    let span = tracing::debug_span!(target: "input.thread", "input_task");
    let handle = task::spawn(
        async move {
            EventStreamTask::new(sink, EventStream::new(), listener)
                .run()
                .await;
        }
        .instrument(span),
    );
    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    ShutdownSignal,
    SinkClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::SinkClosed => "sink_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

struct EventStreamTask<S, F>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
    F: FnMut(InputEvent) -> bool + Send + 'static,
{
    sink: F,
    stream: S,
    shutdown: ShutdownListener,
}

impl<S, F> EventStreamTask<S, F>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
    F: FnMut(InputEvent) -> bool + Send + 'static,
{
    fn new(sink: F, stream: S, shutdown: ShutdownListener) -> Self {
        Self {
            sink,
            stream,
            shutdown,
        }
    }

    async fn run(mut self) -> ExitReason {
        info!(target: "input.thread", "input_task_started");
        let reason = loop {
            let maybe_result = tokio::select! {
                biased;
                _ = self.shutdown.wait() => break ExitReason::ShutdownSignal,
                result = self.stream.next() => result,
            };
            let Some(result) = maybe_result else {
                break ExitReason::StreamEnded;
            };
            match result {
                Ok(CEvent::Key(key)) => {
                    let Some(keys) = map_key_event(&key) else {
                        continue;
                    };
                    trace!(target: "input.thread", keys = keys.len(), "keypress");
                    if !keys.into_iter().all(|k| (self.sink)(InputEvent::Key(k))) {
                        break ExitReason::SinkClosed;
                    }
                }
                Ok(CEvent::Resize(cols, rows)) => {
                    trace!(target: "input.thread", cols, rows, "resize");
                    if !(self.sink)(InputEvent::Resize(cols, rows)) {
                        break ExitReason::SinkClosed;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(target: "input.thread", error_kind = ?err.kind(), "input_stream_error");
                    break ExitReason::StreamError;
                }
            }
        };
        info!(target: "input.thread", reason = reason.as_str(), "input_task_stopped");
        reason
    }
}
