use anyhow::{Context, Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// The default persona used when the gateway does not supply its own.
///
/// It pins the reply format the client parses below: a flat JSON object with
/// a `text` answer and a `mood` drawn from the tablet's expression vocabulary.
pub const DEFAULT_PERSONA_PROMPT: &str = "\
Kamu adalah Asybot, robot meja kecil yang ramah dan suka mengobrol dalam bahasa Indonesia. \
Jawab dengan singkat, paling banyak dua kalimat. \
Balas HANYA dengan satu objek JSON berbentuk \
{\"text\": \"<jawabanmu>\", \"mood\": \"<netral|senang|terkejut|berpikir>\"} \
tanpa teks lain di luar objek itu.";

/// A single reply from the conversational AI.
#[derive(Debug, Clone, Deserialize)]
pub struct AiReply {
    /// The sentence the tablet should speak aloud.
    pub text: String,
    /// The model's self-reported mood, in its own (Indonesian) vocabulary.
    #[serde(default)]
    pub mood: Option<String>,
}

/// The conversational-AI collaborator, consumed as an opaque async contract.
///
/// One transcript in, one reply (or error) out. Implementations own prompt
/// construction and model configuration; callers own every failure policy.
#[async_trait]
pub trait ConversationClient: Send + Sync {
    async fn respond(&self, transcript: &str) -> Result<AiReply>;
}

/// An implementation of `ConversationClient` for any OpenAI-compatible API.
///
/// Gemini is reached through its OpenAI-compatible endpoint, so one client
/// covers both supported providers.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
    persona_prompt: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The chat model identifier (e.g., "gemini-2.0-flash").
    /// * `persona_prompt` - The system prompt establishing the robot's persona
    ///   and the structured reply format.
    pub fn new(config: OpenAIConfig, model: String, persona_prompt: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            persona_prompt,
        }
    }
}

#[async_trait]
impl ConversationClient for OpenAICompatibleClient {
    async fn respond(&self, transcript: &str) -> Result<AiReply> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.persona_prompt.clone())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(transcript.to_string())
                    .build()?
                    .into(),
            ])
            .build()?;

        debug!(model = %self.model, "Requesting chat completion");
        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("LLM response had no text content."))?;

        parse_reply(&content)
    }
}

/// Strips a markdown code fence, which some models wrap JSON replies in
/// despite instructions.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parses the structured reply out of the model's message content.
///
/// A reply that is not the expected JSON shape is an error; the caller owns
/// the fallback behavior.
fn parse_reply(content: &str) -> Result<AiReply> {
    let reply: AiReply = serde_json::from_str(strip_code_fence(content))
        .with_context(|| format!("AI reply was not the expected JSON shape: {content}"))?;
    if reply.text.trim().is_empty() {
        return Err(anyhow!("AI reply contained no text"));
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_with_mood() {
        let reply = parse_reply(r#"{"text": "Halo!", "mood": "senang"}"#).unwrap();
        assert_eq!(reply.text, "Halo!");
        assert_eq!(reply.mood.as_deref(), Some("senang"));
    }

    #[test]
    fn test_parse_reply_without_mood() {
        let reply = parse_reply(r#"{"text": "Baik-baik saja."}"#).unwrap();
        assert_eq!(reply.text, "Baik-baik saja.");
        assert_eq!(reply.mood, None);
    }

    #[test]
    fn test_parse_reply_null_mood() {
        let reply = parse_reply(r#"{"text": "Oke.", "mood": null}"#).unwrap();
        assert_eq!(reply.mood, None);
    }

    #[test]
    fn test_parse_reply_strips_code_fence() {
        let content = "```json\n{\"text\": \"Hai!\", \"mood\": \"netral\"}\n```";
        let reply = parse_reply(content).unwrap();
        assert_eq!(reply.text, "Hai!");
        assert_eq!(reply.mood.as_deref(), Some("netral"));
    }

    #[test]
    fn test_parse_reply_ignores_extra_keys() {
        let reply =
            parse_reply(r#"{"text": "Hai!", "mood": "senang", "confidence": 0.9}"#).unwrap();
        assert_eq!(reply.text, "Hai!");
    }

    #[test]
    fn test_parse_reply_rejects_plain_text() {
        assert!(parse_reply("Halo, apa kabar?").is_err());
    }

    #[test]
    fn test_parse_reply_rejects_empty_text() {
        assert!(parse_reply(r#"{"text": "   "}"#).is_err());
    }

    #[test]
    fn test_strip_code_fence_passthrough() {
        assert_eq!(strip_code_fence(r#"{"text": "x"}"#), r#"{"text": "x"}"#);
    }
}
