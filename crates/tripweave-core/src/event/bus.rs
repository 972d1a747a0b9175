//! Broadcast event bus for distributing `PlannerEvent` to multiple subscribers.
//!
//! Built on `tokio::sync::broadcast`, the `EventBus` supports multiple
//! concurrent subscribers. Publishing with no active subscribers is a no-op.
//! `watch_pipeline` follows a single planning run from start to finish.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::trace;
use uuid::Uuid;

use tripweave_types::event::PlannerEvent;

/// Multi-consumer bus for planner progress events.
///
/// Cloning the bus clones the sender, allowing multiple producers and consumers.
pub struct EventBus {
    sender: broadcast::Sender<PlannerEvent>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlannerEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: PlannerEvent) {
        trace!(run_id = ?event.run_id(), receivers = self.sender.receiver_count(), "publishing planner event");
        let _ = self.sender.send(event);
    }

    /// Follow the next pipeline run published on this bus.
    ///
    /// The watch locks onto the first `PipelineStarted` it sees, drops
    /// events from other runs and follow-ups, and ends after that run's
    /// `PipelineFinished`.
    pub fn watch_pipeline(&self) -> PipelineWatch {
        PipelineWatch {
            rx: self.sender.subscribe(),
            run_id: None,
            finished: false,
        }
    }

    /// Follow one known run.
    pub fn watch_run(&self, run_id: Uuid) -> PipelineWatch {
        PipelineWatch {
            rx: self.sender.subscribe(),
            run_id: Some(run_id),
            finished: false,
        }
    }
}

/// Events of a single pipeline run, in publish order.
#[derive(Debug)]
pub struct PipelineWatch {
    rx: broadcast::Receiver<PlannerEvent>,
    run_id: Option<Uuid>,
    finished: bool,
}

impl PipelineWatch {
    /// The run being followed, once known.
    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    /// Next event of the run; `None` once it finished or the bus closed.
    ///
    /// Lagged gaps are skipped, so a slow reader misses events rather than
    /// stalling publishers.
    pub async fn next(&mut self) -> Option<PlannerEvent> {
        while !self.finished {
            match self.rx.recv().await {
                Ok(event) => {
                    if let Some(event) = self.accept(event) {
                        return Some(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    trace!(skipped, "pipeline watch lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
        None
    }

    /// Like `next`, without waiting.
    pub fn try_next(&mut self) -> Option<PlannerEvent> {
        while !self.finished {
            match self.rx.try_recv() {
                Ok(event) => {
                    if let Some(event) = self.accept(event) {
                        return Some(event);
                    }
                }
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
        None
    }

    fn accept(&mut self, event: PlannerEvent) -> Option<PlannerEvent> {
        let event_run = event.run_id()?;
        match self.run_id {
            Some(run_id) if run_id != event_run => return None,
            Some(_) => {}
            None if matches!(event, PlannerEvent::PipelineStarted { .. }) => {
                self.run_id = Some(event_run);
            }
            None => return None,
        }
        if matches!(event, PlannerEvent::PipelineFinished { .. }) {
            self.finished = true;
        }
        Some(event)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
