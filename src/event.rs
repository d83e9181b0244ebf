use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::metrics::SampleCollector;
use crate::metrics::collector::TickSummary;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    /// One completed sampling tick, sent by the sampler task to the
    /// registry owner.
    Samples(TickSummary),
    /// Render-loop heartbeat; the redraw gate decides whether to draw.
    Render,
}

pub struct EventHandler {
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    _task: JoinHandle<()>,
}

impl EventHandler {
    pub fn new(render_tick: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        let task_tx = tx.clone();

        let task = tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            let mut render_interval = tokio::time::interval(render_tick);

            loop {
                tokio::select! {
                    maybe_event = reader.next() => {
                        match maybe_event {
                            Some(Ok(evt)) => {
                                let mapped = match evt {
                                    CrosstermEvent::Key(key) => Some(Event::Key(key)),
                                    CrosstermEvent::Resize(_, _) => Some(Event::Resize),
                                    _ => None,
                                };
                                if let Some(e) = mapped
                                    && task_tx.send(e).is_err()
                                {
                                    break;
                                }
                            }
                            Some(Err(_)) => break,
                            None => break,
                        }
                    }
                    _ = render_interval.tick() => {
                        if task_tx.send(Event::Render).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            tx,
            rx,
            _task: task,
        }
    }

    /// Extra producer handle, used by the sampler task.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// The sampling loop, clocked independently of rendering. Counter reads run
/// on a blocking thread under a timeout so one stalled read can neither
/// stall the UI nor pile ticks up behind itself.
pub fn spawn_sampler(
    collector: SampleCollector,
    period: Duration,
    read_timeout: Duration,
    tx: mpsc::UnboundedSender<Event>,
) -> JoinHandle<()> {
    let collector = Arc::new(Mutex::new(collector));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut warned_slow = false;
        loop {
            interval.tick().await;
            let shared = Arc::clone(&collector);
            let read = tokio::task::spawn_blocking(move || {
                // A previous read still holding the lock means the OS is
                // being slow; skip this tick instead of queueing behind it.
                shared.try_lock().ok().map(|mut guard| guard.tick())
            });
            match tokio::time::timeout(read_timeout, read).await {
                Ok(Ok(Some(summary))) => {
                    warned_slow = false;
                    if tx.send(Event::Samples(summary)).is_err() {
                        break;
                    }
                }
                Ok(Ok(None)) | Ok(Err(_)) => {}
                Err(_) => {
                    if !warned_slow {
                        warned_slow = true;
                        warn!(
                            timeout_ms = read_timeout.as_millis() as u64,
                            "counter read exceeded its time budget; tick skipped"
                        );
                    }
                }
            }
        }
    })
}
