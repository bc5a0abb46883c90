//! Concurrent fan-out delivery of commands to every registered client.

use crate::registry::ConnectionRegistry;
use crate::ws::protocol::OutboundCommand;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Delivers payloads to every client in the registry.
///
/// Cheap to clone; every clone shares the same registry.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Serializes a command and broadcasts it.
    pub async fn broadcast_command(&self, command: &OutboundCommand) {
        match serde_json::to_string(command) {
            Ok(payload) => self.broadcast(&payload).await,
            Err(e) => error!(error = %e, "Failed to serialize outbound command"),
        }
    }

    /// Sends `payload` to every currently registered client.
    ///
    /// Delivery is dispatched to all clients concurrently, so one slow
    /// connection cannot delay the others. A failed send evicts that client
    /// from the registry and is never surfaced to the caller; when this
    /// returns, every snapshot member has either received the payload or
    /// been removed.
    pub async fn broadcast(&self, payload: &str) {
        let targets = self.registry.snapshot().await;
        if targets.is_empty() {
            debug!("No clients connected, dropping outbound message");
            return;
        }

        let sends = targets.iter().map(|conn| async move {
            conn.sink
                .send_text(payload)
                .await
                .map_err(|e| (conn.id, e))
        });

        for result in join_all(sends).await {
            if let Err((id, e)) = result {
                warn!(connection = %id, error = %e, "Send failed, evicting client");
                self.registry.unregister(id).await;
            }
        }
        debug!(payload = %payload, "Broadcast delivered");
    }
}
