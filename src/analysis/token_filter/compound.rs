//! Compound stem filter implementation.
//!
//! Dutch writes compounds as one word ("jeugdcontributie",
//! "volwassenenles"). This filter keeps the compound and additionally emits
//! every configured stem it contains, so "jeugdcontributie" also matches the
//! keyword "jeugd".

use std::sync::Arc;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Stems split out of ledger compounds by default.
pub const DEFAULT_COMPOUND_STEMS: &[&str] = &["jeugd", "volwassenen"];

/// A filter that adds embedded stems after compound tokens.
#[derive(Clone, Debug)]
pub struct CompoundStemFilter {
    stems: Arc<Vec<String>>,
}

impl CompoundStemFilter {
    /// Create a filter that splits out the given (lowercase) stems.
    pub fn new<I, S>(stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CompoundStemFilter {
            stems: Arc::new(stems.into_iter().map(Into::into).collect()),
        }
    }

    /// Get the configured stems.
    pub fn stems(&self) -> &[String] {
        &self.stems
    }
}

impl Default for CompoundStemFilter {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOUND_STEMS.iter().copied())
    }
}

impl Filter for CompoundStemFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut expanded: Vec<Token> = Vec::new();

        for token in tokens {
            let embedded: Vec<Token> = if token.is_stopped() {
                Vec::new()
            } else {
                self.stems
                    .iter()
                    .filter(|stem| token.text.len() > stem.len() && token.text.contains(stem.as_str()))
                    .map(|stem| token.with_text(stem.as_str()))
                    .collect()
            };
            expanded.push(token);
            expanded.extend(embedded);
        }

        Ok(Box::new(expanded.into_iter()))
    }

    fn name(&self) -> &'static str {
        "compound_stem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_stems_are_added() {
        let filter = CompoundStemFilter::default();
        let tokens = vec![
            Token::new("jeugdcontributie", 0),
            Token::new("jeugd", 1),
            Token::new("seizoen", 2),
        ];

        let result: Vec<String> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect();

        // A bare stem is not duplicated.
        assert_eq!(result, vec!["jeugdcontributie", "jeugd", "jeugd", "seizoen"]);
    }

    #[test]
    fn test_custom_stems() {
        let filter = CompoundStemFilter::new(["huur"]);
        let tokens = vec![Token::new("zaalhuur", 0)];

        let result: Vec<String> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert_eq!(result, vec!["zaalhuur", "huur"]);
        assert_eq!(filter.stems(), ["huur".to_string()]);
    }
}
