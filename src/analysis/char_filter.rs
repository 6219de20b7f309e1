//! Char filter implementations for text normalization.
//!
//! Char filters pre-process the raw text before it reaches the tokenizer.
//! Ledger exports mix composed and decomposed accents ("café", "cafe\u{301}")
//! and the tagger must treat them identically, so accent folding happens here
//! rather than per token.

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the filtered text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod accent_fold;

pub use accent_fold::AccentFoldingCharFilter;
