//! The trained tag model and its corpus fingerprint.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::ml::confidence::{ConfidenceScorer, RankedTag, rank_margins};
use crate::ml::counterparty::CounterpartyIndex;
use crate::ml::features::FeatureVector;
use crate::ml::keyword_classifier::KeywordTable;
use crate::ml::linear_svm::LinearSvm;
use crate::ml::tfidf::TfIdfVectorizer;

/// SHA-256 digest identifying a training corpus and its hyperparameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn hasher() -> FingerprintHasher {
        FingerprintHasher {
            digest: Sha256::new(),
        }
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental fingerprint builder over JSON-encoded values.
pub struct FingerprintHasher {
    digest: Sha256,
}

impl FingerprintHasher {
    /// Feed the canonical JSON encoding of a value.
    pub fn update_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.digest.update((bytes.len() as u64).to_le_bytes());
        self.digest.update(&bytes);
        Ok(())
    }

    /// Feed a section marker.
    pub fn update_marker(&mut self, marker: &str) {
        self.digest.update([0xffu8]);
        self.digest.update(marker.as_bytes());
    }

    pub fn finish(self) -> Fingerprint {
        let hex = self
            .digest
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect();
        Fingerprint(hex)
    }
}

/// Model metadata for tracking model information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Training timestamp.
    pub trained_at: DateTime<Utc>,
    /// Examples taken from the primary corpus.
    pub training_examples: usize,
    /// Examples taken from the supplemental corpus.
    pub supplemental_examples: usize,
    /// Examples per label, in label order.
    pub examples_per_tag: Vec<(String, usize)>,
    pub vocabulary_size: usize,
    /// Whether every binary subproblem converged within the iteration cap.
    pub converged: bool,
    /// Training time in milliseconds.
    pub training_time_ms: u64,
}

/// Everything needed to answer queries after training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    vectorizer: TfIdfVectorizer,
    classifier: LinearSvm,
    keywords: KeywordTable,
    counterparties: CounterpartyIndex,
    fingerprint: Fingerprint,
    metadata: ModelMetadata,
}

impl TrainedModel {
    pub fn new(
        vectorizer: TfIdfVectorizer,
        classifier: LinearSvm,
        keywords: KeywordTable,
        counterparties: CounterpartyIndex,
        fingerprint: Fingerprint,
        metadata: ModelMetadata,
    ) -> Self {
        TrainedModel {
            vectorizer,
            classifier,
            keywords,
            counterparties,
            fingerprint,
            metadata,
        }
    }

    /// Decision margin of every label, in label order.
    pub fn margins(&self, features: &FeatureVector) -> Vec<f64> {
        self.classifier
            .decision_function(&self.vectorizer.transform(features))
    }

    /// All labels ranked by margin, best first.
    pub fn rank(&self, features: &FeatureVector, scorer: &dyn ConfidenceScorer) -> Vec<RankedTag> {
        rank_margins(self.classifier.labels(), &self.margins(features), scorer)
    }

    /// Labels the classifier was trained on, in declared tag order.
    pub fn labels(&self) -> &[String] {
        self.classifier.labels()
    }

    pub fn class_weights(&self) -> &[f64] {
        self.classifier.class_weights()
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LinearSvm {
        &self.classifier
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    pub fn counterparties(&self) -> &CounterpartyIndex {
        &self.counterparties
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
