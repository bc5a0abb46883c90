//! Drives a single conversation turn, from speech transcript to spoken reply.

use crate::broadcast::Broadcaster;
use crate::ws::protocol::OutboundCommand;
use asybot_core::{expression::Expression, llm_client::ConversationClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Spoken when the AI collaborator fails or times out. The tablet never sees
/// raw error detail.
const FALLBACK_REPLY: &str = "Maaf, aku lagi susah mikir. Coba tanya sekali lagi ya.";

/// Pacing for the return to the idle face after a spoken reply. The tablet
/// does not report when its TTS finishes, so the gateway estimates from the
/// reply length.
const SPEECH_MS_PER_WORD: u64 = 450;
const SPEECH_PAUSE_MIN: Duration = Duration::from_secs(2);
const SPEECH_PAUSE_MAX: Duration = Duration::from_secs(12);

/// Turns one transcript into zero or more broadcast commands.
///
/// Each call to [`process`](Self::process) is one independent conversation
/// turn; no state is carried between turns.
pub struct ConversationProcessor {
    client: Arc<dyn ConversationClient>,
    broadcaster: Broadcaster,
    ai_timeout: Duration,
}

impl ConversationProcessor {
    pub fn new(
        client: Arc<dyn ConversationClient>,
        broadcaster: Broadcaster,
        ai_timeout: Duration,
    ) -> Self {
        Self {
            client,
            broadcaster,
            ai_timeout,
        }
    }

    /// Handles one `speechResult` transcript end to end.
    ///
    /// The thinking face goes out before the AI call so the tablet reacts
    /// immediately, however long the model takes. Collaborator failures and
    /// timeouts degrade to an apologetic spoken fallback; they never reach
    /// the connection layer. The handler guarantees `transcript` is
    /// non-empty.
    pub async fn process(&self, transcript: String) {
        info!(%transcript, "Processing speech transcript");
        self.broadcaster
            .broadcast_command(&OutboundCommand::set_expression(Expression::Thinking))
            .await;

        match timeout(self.ai_timeout, self.client.respond(&transcript)).await {
            Ok(Ok(reply)) => {
                if let Some(mood) = &reply.mood {
                    self.broadcaster
                        .broadcast_command(&OutboundCommand::set_expression(
                            Expression::from_mood(mood),
                        ))
                        .await;
                }
                info!(reply = %reply.text, "Speaking AI reply");
                self.broadcaster
                    .broadcast_command(&OutboundCommand::speak(reply.text.clone()))
                    .await;
                self.schedule_idle_reset(&reply.text);
            }
            Ok(Err(e)) => {
                warn!(error = ?e, "AI collaborator failed, sending fallback reply");
                self.send_fallback().await;
            }
            Err(_) => {
                warn!(
                    timeout = ?self.ai_timeout,
                    "AI collaborator timed out, sending fallback reply"
                );
                self.send_fallback().await;
            }
        }
    }

    async fn send_fallback(&self) {
        self.broadcaster
            .broadcast_command(&OutboundCommand::speak(FALLBACK_REPLY))
            .await;
        self.broadcaster
            .broadcast_command(&OutboundCommand::set_expression(Expression::Neutral))
            .await;
    }

    /// Schedules the return to the neutral face once the tablet is expected
    /// to have finished speaking. Detached so the turn itself is not delayed.
    fn schedule_idle_reset(&self, spoken_text: &str) {
        let pause = estimate_speech_duration(spoken_text);
        let broadcaster = self.broadcaster.clone();
        tokio::spawn(async move {
            tokio::time::sleep(pause).await;
            broadcaster
                .broadcast_command(&OutboundCommand::set_expression(Expression::Neutral))
                .await;
        });
    }
}

/// A coarse estimate of how long the tablet's TTS will take, clamped so a
/// one-word answer still shows its face for a moment and a rambling one
/// cannot pin a stale expression for minutes.
fn estimate_speech_duration(text: &str) -> Duration {
    let words = text.split_whitespace().count() as u64;
    Duration::from_millis(words * SPEECH_MS_PER_WORD).clamp(SPEECH_PAUSE_MIN, SPEECH_PAUSE_MAX)
}
