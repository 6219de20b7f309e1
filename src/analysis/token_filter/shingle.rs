//! Shingle filter implementation.
//!
//! Emits word n-grams ("shingles") built from consecutive tokens next to the
//! original unigrams. Bigrams such as "centraal beheer" or "albert heijn" are
//! far more telling in bank narratives than either word alone.
//!
//! # Examples
//!
//! ```
//! use ledger_tagger::analysis::token_filter::Filter;
//! use ledger_tagger::analysis::token_filter::shingle::ShingleFilter;
//! use ledger_tagger::analysis::token::Token;
//!
//! let filter = ShingleFilter::bigrams();
//! let tokens = vec![Token::new("albert", 0), Token::new("heijn", 1)];
//! let texts: Vec<String> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(texts, vec!["albert", "albert heijn", "heijn"]);
//! ```

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Separator between the words of a shingle.
pub const SHINGLE_SEPARATOR: char = ' ';

/// A filter that adds n-grams of consecutive tokens to the stream.
///
/// Stopped tokens are dropped before shingling, so a removed stop word joins
/// its neighbours into one shingle.
#[derive(Clone, Debug)]
pub struct ShingleFilter {
    /// Largest shingle size (in tokens) to emit
    max_shingle_size: usize,
}

impl ShingleFilter {
    /// Create a shingle filter emitting n-grams up to `max_shingle_size` tokens.
    ///
    /// Sizes below 1 are treated as 1 (unigrams only).
    pub fn new(max_shingle_size: usize) -> Self {
        ShingleFilter {
            max_shingle_size: max_shingle_size.max(1),
        }
    }

    /// Create a filter emitting unigrams and bigrams.
    pub fn bigrams() -> Self {
        Self::new(2)
    }

    /// Get the largest shingle size.
    pub fn max_shingle_size(&self) -> usize {
        self.max_shingle_size
    }
}

impl Default for ShingleFilter {
    fn default() -> Self {
        Self::bigrams()
    }
}

impl Filter for ShingleFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words: Vec<Token> = tokens.filter(|token| !token.is_stopped()).collect();
        let mut shingled = Vec::with_capacity(words.len() * self.max_shingle_size);

        for (i, word) in words.iter().enumerate() {
            shingled.push(word.clone());

            let mut text = word.text.clone();
            for size in 2..=self.max_shingle_size {
                let Some(next) = words.get(i + size - 1) else {
                    break;
                };
                text.push(SHINGLE_SEPARATOR);
                text.push_str(&next.text);
                shingled.push(Token::with_offsets(
                    text.clone(),
                    word.position,
                    word.start_offset,
                    next.end_offset,
                ));
            }
        }

        Ok(Box::new(shingled.into_iter()))
    }

    fn name(&self) -> &'static str {
        "shingle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(filter: &ShingleFilter, words: &[&str]) -> Vec<String> {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_bigrams() {
        let filter = ShingleFilter::bigrams();
        assert_eq!(
            texts(&filter, &["premie", "centraal", "beheer"]),
            vec![
                "premie",
                "premie centraal",
                "centraal",
                "centraal beheer",
                "beheer"
            ]
        );
    }

    #[test]
    fn test_unigrams_only() {
        let filter = ShingleFilter::new(0);
        assert_eq!(filter.max_shingle_size(), 1);
        assert_eq!(texts(&filter, &["huur", "zaal"]), vec!["huur", "zaal"]);
    }

    #[test]
    fn test_stopped_tokens_are_skipped() {
        let filter = ShingleFilter::bigrams();
        let tokens = vec![
            Token::new("huur", 0),
            Token::new("van", 1).stop(),
            Token::new("zaal", 2),
        ];
        let result: Vec<String> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert_eq!(result, vec!["huur", "huur zaal", "zaal"]);
    }

    #[test]
    fn test_empty_stream() {
        let filter = ShingleFilter::bigrams();
        assert!(texts(&filter, &[]).is_empty());
    }
}
