//! The robot's facial expression vocabulary.
//!
//! The tablet renders a fixed set of faces, addressed on the wire by the
//! uppercase names below. The AI collaborator reports its mood in Indonesian;
//! `Expression::from_mood` is the total mapping between the two vocabularies.

use std::fmt;

/// A face the tablet knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Neutral,
    Happy,
    Surprised,
    Thinking,
}

impl Expression {
    /// The wire value understood by the tablet client.
    pub fn as_str(&self) -> &'static str {
        match self {
            Expression::Neutral => "NEUTRAL",
            Expression::Happy => "HAPPY",
            Expression::Surprised => "SURPRISED",
            Expression::Thinking => "THINKING",
        }
    }

    /// Maps a mood name reported by the AI collaborator to an expression.
    ///
    /// Unknown moods fall back to `Neutral` so a creative model can never
    /// leave the tablet with an unrenderable face.
    pub fn from_mood(mood: &str) -> Self {
        match mood.trim().to_lowercase().as_str() {
            "netral" => Expression::Neutral,
            "senang" => Expression::Happy,
            "terkejut" => Expression::Surprised,
            "berpikir" => Expression::Thinking,
            _ => Expression::Neutral,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_are_uppercase() {
        assert_eq!(Expression::Neutral.as_str(), "NEUTRAL");
        assert_eq!(Expression::Happy.as_str(), "HAPPY");
        assert_eq!(Expression::Surprised.as_str(), "SURPRISED");
        assert_eq!(Expression::Thinking.as_str(), "THINKING");
    }

    #[test]
    fn test_mood_mapping() {
        assert_eq!(Expression::from_mood("netral"), Expression::Neutral);
        assert_eq!(Expression::from_mood("senang"), Expression::Happy);
        assert_eq!(Expression::from_mood("terkejut"), Expression::Surprised);
        assert_eq!(Expression::from_mood("berpikir"), Expression::Thinking);
    }

    #[test]
    fn test_mood_mapping_is_case_and_whitespace_insensitive() {
        assert_eq!(Expression::from_mood("Senang"), Expression::Happy);
        assert_eq!(Expression::from_mood("  BERPIKIR "), Expression::Thinking);
    }

    #[test]
    fn test_unknown_mood_falls_back_to_neutral() {
        assert_eq!(Expression::from_mood("marah"), Expression::Neutral);
        assert_eq!(Expression::from_mood(""), Expression::Neutral);
    }

    #[test]
    fn test_display_matches_wire_value() {
        assert_eq!(Expression::Happy.to_string(), "HAPPY");
    }
}
