//! Defines the WebSocket message protocol between the tablet client and the gateway.

use asybot_core::expression::Expression;
use serde::{Deserialize, Serialize};

/// Messages sent from the tablet to the gateway.
///
/// The tag key is `event`. Unknown tags decode into `Unsupported` so new
/// client firmware can add events without breaking older gateways.
#[derive(Deserialize, Debug)]
#[serde(tag = "event")]
pub enum InboundEvent {
    /// A finalized speech-to-text result from the tablet's microphone.
    #[serde(rename = "speechResult")]
    SpeechResult { transcript: String },
    #[serde(other)]
    Unsupported,
}

/// A command sent from the gateway to every connected tablet.
///
/// Serialized as a flat object with keys exactly `command` and `value`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand {
    pub command: CommandKind,
    pub value: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Switch the face shown on the tablet.
    #[serde(rename = "setExpression")]
    SetExpression,
    /// Speak the value aloud through the tablet's TTS.
    #[serde(rename = "speak")]
    Speak,
}

impl OutboundCommand {
    pub fn set_expression(expression: Expression) -> Self {
        Self {
            command: CommandKind::SetExpression,
            value: expression.as_str().to_string(),
        }
    }

    pub fn speak(text: impl Into<String>) -> Self {
        Self {
            command: CommandKind::Speak,
            value: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_speech_result() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"event": "speechResult", "transcript": "halo"}"#).unwrap();
        match event {
            InboundEvent::SpeechResult { transcript } => assert_eq!(transcript, "halo"),
            other => panic!("Expected SpeechResult, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_tag_is_unsupported() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"event": "sensorData", "value": 42}"#).unwrap();
        assert!(matches!(event, InboundEvent::Unsupported));
    }

    #[test]
    fn test_missing_event_tag_is_an_error() {
        assert!(serde_json::from_str::<InboundEvent>(r#"{"transcript": "halo"}"#).is_err());
    }

    #[test]
    fn test_speech_result_without_transcript_is_an_error() {
        assert!(serde_json::from_str::<InboundEvent>(r#"{"event": "speechResult"}"#).is_err());
    }

    #[test]
    fn test_serialize_set_expression() {
        let command = OutboundCommand::set_expression(Expression::Happy);
        assert_eq!(
            serde_json::to_string(&command).unwrap(),
            r#"{"command":"setExpression","value":"HAPPY"}"#
        );
    }

    #[test]
    fn test_serialize_speak() {
        let command = OutboundCommand::speak("Halo Mori!");
        assert_eq!(
            serde_json::to_string(&command).unwrap(),
            r#"{"command":"speak","value":"Halo Mori!"}"#
        );
    }
}
