//! Publishing resource events.

use crate::error::PipelineResult;
use async_trait::async_trait;
use fieldseal_types::ResourceEvent;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// The hosting runtime's notification channel.
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, event: ResourceEvent) -> PipelineResult<()>;
}

/// Fans events out to every subscriber over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    sender: broadcast::Sender<ResourceEvent>,
}

impl BroadcastEmitter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResourceEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEmitter {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventEmitter for BroadcastEmitter {
    async fn emit(&self, event: ResourceEvent) -> PipelineResult<()> {
        let name = event.name.clone();
        match self.sender.send(event) {
            Ok(receivers) => debug!(event = %name, receivers, "event published"),
            // No subscribers is not an error.
            Err(_) => trace!(event = %name, "event dropped, no subscribers"),
        }
        Ok(())
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

#[async_trait]
impl EventEmitter for NoopEmitter {
    async fn emit(&self, _event: ResourceEvent) -> PipelineResult<()> {
        Ok(())
    }
}
