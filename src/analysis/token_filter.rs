//! Token filter implementations for token transformation.
//!
//! Filters receive a stream of tokens and produce a new stream, allowing them
//! to modify, drop or add tokens.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseFilter`] - Case-folds tokens
//! - [`stop::StopFilter`] - Removes stop words
//! - [`shingle::ShingleFilter`] - Adds word bigrams next to the unigrams
//! - [`compound::CompoundStemFilter`] - Adds stems embedded in compounds
//!
//! # Filter Chaining
//!
//! ```text
//! Tokenizer → Lowercase → Stop Words → Shingles
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod compound;
pub mod lowercase;
pub mod shingle;
pub mod stop;

pub use compound::CompoundStemFilter;
pub use lowercase::LowercaseFilter;
pub use shingle::ShingleFilter;
pub use stop::StopFilter;
