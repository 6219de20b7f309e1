//! Text analysis for ledger narratives.
//!
//! This module provides tokenization, filtering and the analysis pipelines the
//! feature builder and the keyword heuristic run over transaction text.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
