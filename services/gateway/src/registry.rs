//! Tracks the set of currently connected tablet clients.
//!
//! The registry is the only shared mutable state in the process. All access
//! goes through one async mutex, so admission checks, removal, and snapshot
//! iteration can never observe a half-applied mutation.

use crate::config::AdmissionPolicy;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// The write half of one client connection.
///
/// Abstracted as a trait so the registry and broadcaster can be exercised in
/// tests without a live WebSocket behind them.
#[async_trait]
pub trait ClientSink: Send + Sync {
    /// Delivers one text frame to the client.
    async fn send_text(&self, payload: &str) -> Result<()>;
}

/// One registered client connection.
#[derive(Clone)]
pub struct ConnectionHandle {
    pub id: Uuid,
    pub addr: SocketAddr,
    pub sink: Arc<dyn ClientSink>,
}

/// The set of open connections, keyed by connection id.
pub struct ConnectionRegistry {
    policy: AdmissionPolicy,
    connections: Mutex<HashMap<Uuid, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self {
            policy,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Admits a new connection if the policy permits.
    ///
    /// Check-and-add happens under one lock guard, so two simultaneous
    /// accepts can never both be admitted under `SingleClient`. Returns
    /// `false` when the connection was refused; the caller owns closing it.
    pub async fn register(&self, conn: ConnectionHandle) -> bool {
        let mut connections = self.connections.lock().await;
        if self.policy == AdmissionPolicy::SingleClient && !connections.is_empty() {
            return false;
        }
        connections.insert(conn.id, conn);
        info!("Client registered. Total clients: {}", connections.len());
        true
    }

    /// Removes a connection. Idempotent: removing an absent id is a no-op,
    /// which tolerates the race between handler cleanup and broadcast
    /// eviction both removing the same connection.
    pub async fn unregister(&self, id: Uuid) {
        let mut connections = self.connections.lock().await;
        if connections.remove(&id).is_some() {
            info!("Client removed. Total clients: {}", connections.len());
        }
    }

    /// Returns a point-in-time copy of the open connections, so callers can
    /// iterate without holding the lock across sends.
    pub async fn snapshot(&self) -> Vec<ConnectionHandle> {
        self.connections.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::time::{Duration, sleep};

    /// A `ClientSink` that records every payload it receives and can be
    /// switched into a failing or slow mode.
    pub struct RecordingSink {
        sent: Mutex<Vec<String>>,
        failing: AtomicBool,
        pub delay: Option<Duration>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failing: AtomicBool::new(false),
                delay: None,
            }
        }

        pub fn failing() -> Self {
            let sink = Self::new();
            sink.failing.store(true, Ordering::SeqCst);
            sink
        }

        pub fn slow(delay: Duration) -> Self {
            let mut sink = Self::new();
            sink.delay = Some(delay);
            sink
        }

        pub async fn sent(&self) -> Vec<String> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl ClientSink for RecordingSink {
        async fn send_text(&self, payload: &str) -> Result<()> {
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(anyhow!("connection closed"));
            }
            self.sent.lock().await.push(payload.to_string());
            Ok(())
        }
    }

    /// Builds a handle around the given sink with a fresh id and a fixed
    /// loopback address.
    pub fn handle(sink: Arc<RecordingSink>) -> ConnectionHandle {
        ConnectionHandle {
            id: Uuid::new_v4(),
            addr: "127.0.0.1:40000".parse().unwrap(),
            sink,
        }
    }
}
