//! Stop filter implementation.
//!
//! This module provides a filter that removes common words (stop words) that
//! carry no tagging signal. The ledger list is the union of a generic English
//! list, Dutch function words and boilerplate that bank exports print on
//! every statement line.
//!
//! The English list is the short 33-word Lucene-style set, not a full
//! English stop list of several hundred words.
//!
//! # Examples
//!
//! ```
//! use ledger_tagger::analysis::token_filter::Filter;
//! use ledger_tagger::analysis::token_filter::stop::StopFilter;
//! use ledger_tagger::analysis::token::Token;
//!
//! let filter = StopFilter::ledger();
//! let tokens = vec![
//!     Token::new("huur", 0),
//!     Token::new("van", 1),
//!     Token::new("de", 2),
//!     Token::new("zaal", 3),
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].text, "huur");
//! assert_eq!(result[1].text, "zaal");
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Default English stop words list.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Dutch function words.
const DUTCH_STOP_WORDS: &[&str] = &[
    "de", "het", "een", "en", "of", "voor", "met", "door", "in", "op", "aan", "naar", "van",
    "tot", "als", "bij", "uit", "is", "zijn", "ben", "wordt", "om", "te", "geen", "dit", "dat",
    "deze", "die", "mijn", "jouw", "ons", "hun", "wat", "wie", "welk", "waar", "wanneer", "hoe",
    "waarom",
];

/// Boilerplate printed by Dutch bank exports regardless of the transaction.
const LEDGER_STOP_WORDS: &[&str] = &[
    "omschrijving",
    "naam",
    "iban",
    "bic",
    "kenmerk",
    "referentie",
    "datum",
    "valutadatum",
    "transactie",
];

/// Default English stop words as a HashSet.
pub static DEFAULT_ENGLISH_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// English, Dutch and ledger boilerplate stop words as a HashSet.
pub static LEDGER_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .chain(DUTCH_STOP_WORDS)
        .chain(LEDGER_STOP_WORDS)
        .map(|&s| s.to_string())
        .collect()
});

/// A filter that removes stop words from the token stream.
///
/// Stop words can either be removed entirely or marked as stopped while
/// staying in the stream.
#[derive(Clone, Debug)]
pub struct StopFilter {
    /// The set of stop words to remove
    stop_words: Arc<HashSet<String>>,
    /// Whether to remove stopped tokens entirely or just mark them as stopped
    remove_stopped: bool,
}

impl StopFilter {
    /// Create a new stop filter with the default English stop words.
    pub fn new() -> Self {
        Self::with_stop_words(DEFAULT_ENGLISH_STOP_WORDS_SET.clone())
    }

    /// Create a stop filter for ledger text: English, Dutch and bank boilerplate.
    pub fn ledger() -> Self {
        Self::with_stop_words(LEDGER_STOP_WORDS_SET.clone())
    }

    /// Create a new stop filter with custom stop words.
    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        StopFilter {
            stop_words: Arc::new(stop_words),
            remove_stopped: true,
        }
    }

    /// Create a new stop filter from a list of stop words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stop_words = words.into_iter().map(|s| s.into()).collect();
        Self::with_stop_words(stop_words)
    }

    /// Extend the stop word set with additional (lowercase) words.
    pub fn with_additional_words<I, S>(self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stop_words = (*self.stop_words).clone();
        stop_words.extend(words.into_iter().map(|s| s.into()));
        StopFilter {
            stop_words: Arc::new(stop_words),
            remove_stopped: self.remove_stopped,
        }
    }

    /// Set whether to remove stopped tokens entirely or just mark them as stopped.
    pub fn remove_stopped(mut self, remove: bool) -> Self {
        self.remove_stopped = remove;
        self
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = tokens
            .filter_map(|token| {
                if token.is_stopped() {
                    Some(token)
                } else if self.is_stop_word(&token.text) {
                    if self.remove_stopped {
                        None
                    } else {
                        Some(token.stop())
                    }
                } else {
                    Some(token)
                }
            })
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_filter() {
        let filter = StopFilter::from_words(vec!["de", "en", "of"]);
        let tokens = vec![
            Token::new("huur", 0),
            Token::new("de", 1),
            Token::new("zaal", 2),
            Token::new("en", 3),
            Token::new("kantine", 4),
        ];
        let token_stream = Box::new(tokens.into_iter());

        let result: Vec<Token> = filter.filter(token_stream).unwrap().collect();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].text, "huur");
        assert_eq!(result[1].text, "zaal");
        assert_eq!(result[2].text, "kantine");
    }

    #[test]
    fn test_stop_filter_preserve_stopped() {
        let filter = StopFilter::from_words(vec!["van"]).remove_stopped(false);
        let tokens = vec![Token::new("premie", 0), Token::new("van", 1)];
        let token_stream = Box::new(tokens.into_iter());

        let result: Vec<Token> = filter.filter(token_stream).unwrap().collect();

        assert_eq!(result.len(), 2);
        assert!(!result[0].is_stopped());
        assert!(result[1].is_stopped());
    }

    #[test]
    fn test_ledger_list_is_a_union() {
        let filter = StopFilter::ledger();
        assert!(filter.is_stop_word("the"));
        assert!(filter.is_stop_word("het"));
        assert!(filter.is_stop_word("omschrijving"));
        assert!(!filter.is_stop_word("huur"));
        assert!(filter.len() > StopFilter::new().len());
    }

    #[test]
    fn test_additional_words() {
        let filter = StopFilter::ledger().with_additional_words(["debutade"]);
        assert!(filter.is_stop_word("debutade"));
        assert!(filter.is_stop_word("van"));
    }

    #[test]
    fn test_english_list_is_the_short_set() {
        assert_eq!(DEFAULT_ENGLISH_STOP_WORDS_SET.len(), 33);
        assert!(DEFAULT_ENGLISH_STOP_WORDS_SET.contains("the"));
        assert!(!DEFAULT_ENGLISH_STOP_WORDS_SET.contains("about"));
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(StopFilter::new().name(), "stop");
    }
}
