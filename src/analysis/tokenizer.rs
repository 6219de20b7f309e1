//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first token-producing stage of the analysis pipeline,
//! responsible for splitting normalized text into tokens.
//!
//! # Examples
//!
//! ```
//! use ledger_tagger::analysis::tokenizer::Tokenizer;
//! use ledger_tagger::analysis::tokenizer::regex::RegexTokenizer;
//!
//! let tokenizer = RegexTokenizer::new().unwrap();
//! let tokens: Vec<_> = tokenizer.tokenize("Zaalhuur maart").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so analyzers can be shared between the
/// training thread and concurrent queries.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod regex;

pub use self::regex::RegexTokenizer;
