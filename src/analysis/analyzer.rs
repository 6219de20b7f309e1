//! Analyzers: complete text-to-token pipelines.
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Filter 1 … Filter N → Token Stream
//! ```
//!
//! # Available Implementations
//!
//! - [`PipelineAnalyzer`](pipeline::PipelineAnalyzer) - Custom tokenizer + filter chains
//! - [`LedgerAnalyzer`](ledger::LedgerAnalyzer) - Presets for ledger narratives

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so one analyzer can serve training and
/// concurrent queries.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Analyze the text and collect only the token texts.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

pub mod ledger;
pub mod pipeline;

pub use ledger::LedgerAnalyzer;
pub use pipeline::PipelineAnalyzer;
