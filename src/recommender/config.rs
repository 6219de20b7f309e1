//! Recommender configuration.
//!
//! Every field has a default, so a JSON file only needs to name what it
//! overrides:
//!
//! ```
//! use ledger_tagger::recommender::RecommenderConfig;
//!
//! let config: RecommenderConfig =
//!     serde_json::from_str(r#"{"confidence_threshold": 0.3, "top_k": 5}"#).unwrap();
//! assert_eq!(config.top_k, 5);
//! assert_eq!(config.allowed_tags.len(), 10);
//! config.validate().unwrap();
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::compound::DEFAULT_COMPOUND_STEMS;
use crate::error::{Result, TaggerError};
use crate::ml::keyword_classifier::SeedKeywords;
use crate::ml::linear_svm::SvmParams;

/// Tags of the default ledger, in declared order.
pub const DEFAULT_TAGS: &[&str] = &[
    "huur",
    "contributie-jeugd",
    "contributie-volwassenen",
    "boodschappen",
    "verzekering",
    "materiaal",
    "evenement",
    "training",
    "bankkosten",
    "overig",
];

fn default_seed_keywords() -> Vec<SeedKeywords> {
    vec![
        SeedKeywords::new("huur", ["huur", "zaalhuur", "verhuur"]),
        SeedKeywords::new("contributie-jeugd", ["jeugd", "jeugdcontributie"]),
        SeedKeywords::new("contributie-volwassenen", ["volwassenen"]),
        SeedKeywords::new(
            "boodschappen",
            ["supermarkt", "boodschappen", "albert", "heijn", "jumbo", "lidl"],
        ),
        SeedKeywords::new("verzekering", ["verzekering", "polis", "premie"]),
        SeedKeywords::new("materiaal", ["materiaal", "ballen"]),
    ]
}

/// Configuration of a [`TagRecommender`](crate::recommender::TagRecommender).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Tags suggestions are drawn from, in declared order. Ties anywhere in
    /// ranking fall back to this order.
    pub allowed_tags: Vec<String>,

    /// Minimum classifier confidence for a model suggestion.
    pub confidence_threshold: f64,

    /// Inverse regularization strength of the classifier.
    pub regularization: f64,

    pub max_iterations: usize,

    pub tolerance: f64,

    /// Maximum number of suggestions returned per query.
    pub top_k: usize,

    /// Terms in fewer training documents are dropped.
    pub min_df: usize,

    /// Terms in more than this share of training documents are dropped.
    pub max_df: f64,

    /// Fewest training examples that still produce a classifier.
    pub min_examples: usize,

    /// Fewest distinct tags that still produce a classifier.
    pub min_classes: usize,

    /// Confidence reported for counterparty memory suggestions.
    pub counterparty_confidence: f64,

    /// Keywords kept per tag when deriving the heuristic table.
    pub keywords_per_tag: usize,

    /// Keyword table used before any training succeeded.
    pub seed_keywords: Vec<SeedKeywords>,

    /// Stems split out of compound words for the heuristic.
    pub compound_stems: Vec<String>,

    /// Stop words on top of the built-in ledger list.
    pub extra_stop_words: Vec<String>,

    /// Seed of the solver's coordinate order.
    pub random_seed: u64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        RecommenderConfig {
            allowed_tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            confidence_threshold: 0.15,
            regularization: 1.0,
            max_iterations: 2000,
            tolerance: 1e-4,
            top_k: 3,
            min_df: 1,
            max_df: 0.95,
            min_examples: 2,
            min_classes: 2,
            counterparty_confidence: 1.0,
            keywords_per_tag: 25,
            seed_keywords: default_seed_keywords(),
            compound_stems: DEFAULT_COMPOUND_STEMS.iter().map(|s| s.to_string()).collect(),
            extra_stop_words: Vec::new(),
            random_seed: 42,
        }
    }
}

impl RecommenderConfig {
    /// Create a new builder starting from the defaults.
    pub fn builder() -> RecommenderConfigBuilder {
        RecommenderConfigBuilder::new()
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RecommenderConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.allowed_tags.is_empty() {
            return Err(TaggerError::invalid_config("allowed_tags must not be empty"));
        }
        let mut seen = HashSet::new();
        for tag in &self.allowed_tags {
            if tag.trim().is_empty() || tag.trim() != tag {
                return Err(TaggerError::invalid_config(format!(
                    "tag '{tag}' is blank or has surrounding whitespace"
                )));
            }
            if !seen.insert(tag.as_str()) {
                return Err(TaggerError::invalid_config(format!(
                    "tag '{tag}' is declared twice"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(TaggerError::invalid_config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.counterparty_confidence) {
            return Err(TaggerError::invalid_config(format!(
                "counterparty_confidence must be within [0, 1], got {}",
                self.counterparty_confidence
            )));
        }
        if !(self.regularization.is_finite() && self.regularization > 0.0) {
            return Err(TaggerError::invalid_config("regularization must be positive"));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(TaggerError::invalid_config("tolerance must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(TaggerError::invalid_config("max_iterations must be at least 1"));
        }
        if self.top_k == 0 {
            return Err(TaggerError::invalid_config("top_k must be at least 1"));
        }
        if self.min_df == 0 {
            return Err(TaggerError::invalid_config("min_df must be at least 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(TaggerError::invalid_config(format!(
                "max_df must be within (0, 1], got {}",
                self.max_df
            )));
        }
        if self.min_classes < 2 {
            return Err(TaggerError::invalid_config("min_classes must be at least 2"));
        }
        if self.min_examples < self.min_classes {
            return Err(TaggerError::invalid_config(
                "min_examples must be at least min_classes",
            ));
        }
        if self.keywords_per_tag == 0 {
            return Err(TaggerError::invalid_config("keywords_per_tag must be at least 1"));
        }
        Ok(())
    }

    /// Whether a tag is part of the allowed set.
    pub fn is_allowed(&self, tag: &str) -> bool {
        self.allowed_tags.iter().any(|t| t == tag)
    }

    /// Solver settings derived from this configuration.
    pub fn svm_params(&self) -> SvmParams {
        SvmParams {
            c: self.regularization,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            seed: self.random_seed,
        }
    }

    /// The settings a trained model depends on.
    ///
    /// Query-time settings (`confidence_threshold`, `top_k`,
    /// `counterparty_confidence`) are left out.
    pub fn training_params(&self) -> TrainingParams<'_> {
        TrainingParams {
            allowed_tags: &self.allowed_tags,
            regularization: self.regularization,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            min_df: self.min_df,
            max_df: self.max_df,
            min_examples: self.min_examples,
            min_classes: self.min_classes,
            keywords_per_tag: self.keywords_per_tag,
            seed_keywords: &self.seed_keywords,
            compound_stems: &self.compound_stems,
            extra_stop_words: &self.extra_stop_words,
            random_seed: self.random_seed,
        }
    }
}

/// Borrowed view of the training settings of a [`RecommenderConfig`].
#[derive(Debug, Clone, Serialize)]
pub struct TrainingParams<'a> {
    pub allowed_tags: &'a [String],
    pub regularization: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub min_df: usize,
    pub max_df: f64,
    pub min_examples: usize,
    pub min_classes: usize,
    pub keywords_per_tag: usize,
    pub seed_keywords: &'a [SeedKeywords],
    pub compound_stems: &'a [String],
    pub extra_stop_words: &'a [String],
    pub random_seed: u64,
}

/// Builder for [`RecommenderConfig`].
#[derive(Debug, Clone, Default)]
pub struct RecommenderConfigBuilder {
    config: RecommenderConfig,
}

impl RecommenderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the allowed tags.
    pub fn allowed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    pub fn regularization(mut self, c: f64) -> Self {
        self.config.regularization = c;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn document_frequency(mut self, min_df: usize, max_df: f64) -> Self {
        self.config.min_df = min_df;
        self.config.max_df = max_df;
        self
    }

    pub fn minimum_corpus(mut self, min_examples: usize, min_classes: usize) -> Self {
        self.config.min_examples = min_examples;
        self.config.min_classes = min_classes;
        self
    }

    pub fn seed_keywords(mut self, seeds: Vec<SeedKeywords>) -> Self {
        self.config.seed_keywords = seeds;
        self
    }

    pub fn extra_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extra_stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<RecommenderConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
