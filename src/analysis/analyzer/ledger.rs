//! Analyzer presets for ledger narratives.
//!
//! Two pipelines share the same normalization (accent folding, `\w\w+`
//! tokens, case folding, the ledger stop list):
//!
//! - [`LedgerAnalyzer::features`] adds word bigrams and feeds the vectorizer.
//! - [`LedgerAnalyzer::keywords`] adds compound stems and feeds the keyword
//!   heuristic.
//!
//! # Examples
//!
//! ```
//! use ledger_tagger::analysis::analyzer::Analyzer;
//! use ledger_tagger::analysis::analyzer::ledger::LedgerAnalyzer;
//!
//! let analyzer = LedgerAnalyzer::features(Vec::<String>::new()).unwrap();
//! let terms = analyzer.terms("Huur van de Zaal").unwrap();
//! assert_eq!(terms, vec!["huur", "huur zaal", "zaal"]);
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::AccentFoldingCharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{
    CompoundStemFilter, LowercaseFilter, ShingleFilter, StopFilter,
};
use crate::analysis::tokenizer::RegexTokenizer;
use crate::error::Result;

/// Analyzer for ledger text.
#[derive(Clone, Debug)]
pub struct LedgerAnalyzer {
    inner: PipelineAnalyzer,
    name: &'static str,
}

impl LedgerAnalyzer {
    /// Unigram + bigram analyzer used to build classifier features.
    pub fn features<I, S>(extra_stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inner = Self::normalizing_pipeline(extra_stop_words)?
            .add_filter(Arc::new(ShingleFilter::bigrams()))
            .with_name("ledger_features");

        Ok(LedgerAnalyzer {
            inner,
            name: "ledger_features",
        })
    }

    /// Unigram analyzer with compound stem splitting used by the keyword heuristic.
    pub fn keywords<I, S, J, T>(extra_stop_words: I, compound_stems: J) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let inner = Self::normalizing_pipeline(extra_stop_words)?
            .add_filter(Arc::new(CompoundStemFilter::new(compound_stems)))
            .with_name("ledger_keywords");

        Ok(LedgerAnalyzer {
            inner,
            name: "ledger_keywords",
        })
    }

    fn normalizing_pipeline<I, S>(extra_stop_words: I) -> Result<PipelineAnalyzer>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extra: Vec<String> = extra_stop_words
            .into_iter()
            .map(|word| word.into().to_lowercase())
            .collect();
        let tokenizer = Arc::new(RegexTokenizer::new()?);

        Ok(PipelineAnalyzer::new(tokenizer)
            .add_char_filter(Arc::new(AccentFoldingCharFilter::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::ledger().with_additional_words(extra))))
    }

    /// Get the inner pipeline analyzer.
    pub fn inner(&self) -> &PipelineAnalyzer {
        &self.inner
    }
}

impl Analyzer for LedgerAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
