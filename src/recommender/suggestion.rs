//! Suggestion results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which stage of the fallback chain produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionSource {
    /// The trained classifier.
    Model,
    /// The keyword heuristic.
    Heuristic,
    /// The tag most often used for the counterparty account.
    CounterpartyFallback,
}

impl SuggestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionSource::Model => "model",
            SuggestionSource::Heuristic => "heuristic",
            SuggestionSource::CounterpartyFallback => "counterparty-fallback",
        }
    }
}

impl fmt::Display for SuggestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A suggested tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub tag: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub source: SuggestionSource,
}

impl Suggestion {
    pub fn new<T: Into<String>>(tag: T, confidence: f64, source: SuggestionSource) -> Self {
        Suggestion {
            tag: tag.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_kebab_case() {
        let suggestion = Suggestion::new("huur", 1.0, SuggestionSource::CounterpartyFallback);
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["source"], "counterparty-fallback");
        assert_eq!(SuggestionSource::Model.to_string(), "model");
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Suggestion::new("huur", 1.2, SuggestionSource::Model).confidence, 1.0);
    }
}
