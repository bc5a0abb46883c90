//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources: the connection registry, the broadcaster over it, and
//! the conversation processor.

use crate::broadcast::Broadcaster;
use crate::config::Config;
use crate::registry::ConnectionRegistry;
use crate::ws::turn::ConversationProcessor;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub broadcaster: Broadcaster,
    pub processor: Arc<ConversationProcessor>,
    pub config: Arc<Config>,
}
