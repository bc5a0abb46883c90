//! Development Command Simulator
//!
//! Drives the tablet with a canned command sequence whenever a client is
//! connected, so the face and TTS pipeline can be exercised without the AI
//! path. Enabled with `SIMULATOR=true`; never run in normal deployments.

use crate::broadcast::Broadcaster;
use crate::registry::ConnectionRegistry;
use crate::ws::protocol::OutboundCommand;
use asybot_core::expression::Expression;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

const IDLE_POLL: Duration = Duration::from_secs(2);
const TEST_PHRASE: &str = "Halo, ini tes dari server.";

/// Runs the simulator loop until the task is dropped.
pub async fn run(registry: Arc<ConnectionRegistry>, broadcaster: Broadcaster) {
    info!("Command simulator started, waiting for a client");
    loop {
        if !registry.is_empty().await {
            sleep(Duration::from_secs(3)).await;
            broadcaster
                .broadcast_command(&OutboundCommand::set_expression(Expression::Happy))
                .await;

            sleep(Duration::from_secs(2)).await;
            broadcaster
                .broadcast_command(&OutboundCommand::speak(TEST_PHRASE))
                .await;

            // Rough allowance for the tablet's TTS to finish the phrase.
            sleep(Duration::from_secs(5)).await;
            broadcaster
                .broadcast_command(&OutboundCommand::set_expression(Expression::Neutral))
                .await;
        }
        sleep(IDLE_POLL).await;
    }
}
