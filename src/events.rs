//! Fire-and-forget notification of vertex mutations. At-most-once; a
//! failure to emit never fails the write that triggered it.

use async_trait::async_trait;

use crate::patch::Patch;
use crate::types::VertexId;

pub const TOPIC_VERTEX_CREATED: &str = "auditable-item-graph:vertex-created";
pub const TOPIC_VERTEX_UPDATED: &str = "auditable-item-graph:vertex-updated";

/// An event published after a successful mutation.
#[derive(Debug, Clone)]
pub enum Event {
    VertexCreated { id: VertexId },
    VertexUpdated { id: VertexId, patches: Patch },
}

impl Event {
    pub fn topic(&self) -> &'static str {
        match self {
            Event::VertexCreated { .. } => TOPIC_VERTEX_CREATED,
            Event::VertexUpdated { .. } => TOPIC_VERTEX_UPDATED,
        }
    }
}

/// Publishes engine events. Implementations must not let a slow or failing
/// subscriber block or fail the caller.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: Event);
}

/// An [`EventBus`] that discards everything, for deployments or tests that
/// don't care about notifications.
#[derive(Default)]
pub struct NoopEventBus;

#[async_trait]
impl EventBus for NoopEventBus {
    async fn publish(&self, _event: Event) {}
}

/// An [`EventBus`] that records every event it receives, for assertions in
/// tests.
#[derive(Default)]
pub struct RecordingEventBus {
    events: tokio::sync::Mutex<Vec<Event>>,
}

impl RecordingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().await)
    }
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn publish(&self, event: Event) {
        self.events.lock().await.push(event);
    }
}
