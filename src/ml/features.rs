//! Feature extraction for ledger transactions.
//!
//! A transaction becomes a bag of terms: unigrams and bigrams of its text plus
//! one amount-bucket token and one direction token. High-priority fields are
//! written into the text stream twice and low-priority fields once, so the
//! duplication shows up as doubled term frequency inside the one shared
//! vocabulary rather than as a separate feature space.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::ledger::LedgerAnalyzer;
use crate::error::Result;
use crate::ledger::{Priority, TransactionRecord};

/// Weighted multiset of feature terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    counts: BTreeMap<String, u32>,
}

impl FeatureVector {
    /// Create an empty feature vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of a term.
    pub fn add<S: Into<String>>(&mut self, term: S) {
        *self.counts.entry(term.into()).or_insert(0) += 1;
    }

    /// Occurrences of a term.
    pub fn count(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Iterate over `(term, count)` pairs in lexicographic term order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(term, count)| (term.as_str(), *count))
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no term was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of term occurrences.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut vector = FeatureVector::new();
        for term in iter {
            vector.add(term);
        }
        vector
    }
}

/// Converts transaction records into [`FeatureVector`]s.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    analyzer: Arc<LedgerAnalyzer>,
}

impl FeatureBuilder {
    /// Create a feature builder on top of a feature analyzer.
    pub fn new(analyzer: Arc<LedgerAnalyzer>) -> Self {
        FeatureBuilder { analyzer }
    }

    /// Create a feature builder with the ledger stop list plus `extra_stop_words`.
    pub fn with_stop_words(extra_stop_words: &[String]) -> Result<Self> {
        Ok(Self::new(Arc::new(LedgerAnalyzer::features(
            extra_stop_words.iter().cloned(),
        )?)))
    }

    /// The text stream fed to the analyzer.
    ///
    /// High-priority texts appear twice in a row, then low-priority texts once,
    /// all joined by single spaces.
    pub fn text_stream(record: &TransactionRecord) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for text in record.texts(Priority::High) {
            for _ in 0..Priority::High.repeat() {
                parts.push(text);
            }
        }
        for text in record.texts(Priority::Low) {
            for _ in 0..Priority::Low.repeat() {
                parts.push(text);
            }
        }
        parts.join(" ")
    }

    /// Build the feature vector of a record.
    pub fn build(&self, record: &TransactionRecord) -> Result<FeatureVector> {
        let mut features: FeatureVector = self
            .analyzer
            .analyze(&Self::text_stream(record))?
            .map(|token| token.text)
            .collect();

        features.add(record.amount.bucket().token());
        features.add(record.amount.direction().token());

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ledger::{Amount, Direction};

    fn builder() -> FeatureBuilder {
        FeatureBuilder::with_stop_words(&[]).unwrap()
    }

    fn record() -> TransactionRecord {
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            Amount::Directed {
                value: 9.99,
                direction: Direction::Debit,
            },
        )
        .with_counterparty("Bakkerij", "NL12RABO0123456789")
        .with_narrative("Taart jubileum")
        .with_field("tegenrekening", "NL12RABO0123456789", Priority::Low)
    }

    #[test]
    fn test_text_stream_duplicates_high_priority() {
        assert_eq!(
            FeatureBuilder::text_stream(&record()),
            "Taart jubileum Taart jubileum Bakkerij Bakkerij NL12RABO0123456789"
        );
    }

    #[test]
    fn test_build_counts_terms() {
        let features = builder().build(&record()).unwrap();

        assert_eq!(features.count("taart"), 2);
        assert_eq!(features.count("bakkerij"), 2);
        assert_eq!(features.count("nl12rabo0123456789"), 1);
        assert_eq!(features.count("taart jubileum"), 2);
        // Bigrams span the duplicated copies and field boundaries.
        assert_eq!(features.count("jubileum taart"), 1);
        assert_eq!(features.count("jubileum bakkerij"), 1);
        assert_eq!(features.count("amount=tiny"), 1);
        assert_eq!(features.count("direction=debit"), 1);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = builder();
        assert_eq!(
            builder.build(&record()).unwrap(),
            builder.build(&record()).unwrap()
        );
    }

    #[test]
    fn test_feature_vector_collect() {
        let features: FeatureVector = ["huur", "zaal", "huur"].into_iter().collect();
        assert_eq!(features.count("huur"), 2);
        assert_eq!(features.len(), 2);
        assert_eq!(features.total(), 3);
        assert_eq!(
            features.iter().collect::<Vec<_>>(),
            vec![("huur", 2), ("zaal", 1)]
        );
    }
}
