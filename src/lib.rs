//! # ledger-tagger
//!
//! Tag suggestions for bank and cash-book ledger transactions.
//!
//! ## Features
//!
//! - Text analysis tuned for Dutch and English ledger narratives
//! - TF-IDF features with amount and direction tokens
//! - One-vs-rest linear SVM with balanced class weights
//! - Keyword and counterparty fallbacks when the classifier is unsure
//! - Lock-free reads during retraining, with an on-disk model cache

pub mod analysis;
pub mod cli;
pub mod error;
pub mod ledger;
pub mod ml;
pub mod recommender;

pub mod prelude {
    pub use crate::error::{Result, TaggerError};
    pub use crate::ledger::{Amount, Direction, Priority, TrainingExample, TransactionRecord};
    pub use crate::recommender::{
        CorpusSource, RecommenderConfig, Suggestion, SuggestionSource, TagRecommender,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
