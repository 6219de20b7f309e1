//! Keyword heuristic used when the classifier is not confident.
//!
//! Each tag owns a weighted keyword set. A query scores the sum of the weights
//! of its matching terms per tag, and the confidence of a tag is its share of
//! the total score. Only high-priority text (narrative, description,
//! counterparty name) takes part, on both the table and the query side.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::ledger::LedgerAnalyzer;
use crate::error::Result;
use crate::ledger::{Priority, TrainingExample, TransactionRecord};
use crate::ml::confidence::RankedTag;

/// Hand-written keywords for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedKeywords {
    pub tag: String,
    pub keywords: Vec<String>,
}

impl SeedKeywords {
    pub fn new<T: Into<String>, K: Into<String>>(tag: T, keywords: impl IntoIterator<Item = K>) -> Self {
        SeedKeywords {
            tag: tag.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Keywords and weights of one tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagKeywords {
    pub tag: String,
    pub keywords: BTreeMap<String, f64>,
}

/// Per-tag keyword table, in declared tag order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordTable {
    entries: Vec<TagKeywords>,
}

impl KeywordTable {
    /// Build the table from seed keywords, every keyword weighing 1.
    ///
    /// Seeds for tags outside `allowed_tags` are ignored.
    pub fn from_seed(
        seeds: &[SeedKeywords],
        allowed_tags: &[String],
        analyzer: &dyn Analyzer,
    ) -> Result<Self> {
        let mut entries = Vec::new();
        for tag in allowed_tags {
            let mut keywords = BTreeMap::new();
            for seed in seeds.iter().filter(|s| &s.tag == tag) {
                for keyword in &seed.keywords {
                    for term in analyzer.terms(keyword)? {
                        keywords.insert(term, 1.0);
                    }
                }
            }
            if !keywords.is_empty() {
                entries.push(TagKeywords {
                    tag: tag.clone(),
                    keywords,
                });
            }
        }
        Ok(KeywordTable { entries })
    }

    /// Derive the table from tagged examples.
    ///
    /// A term's weight for a tag is its count within the tag's examples times
    /// the smoothed inverse document frequency over all examples. Only the
    /// `per_tag` heaviest terms of each tag are kept; equal weights keep the
    /// lexicographically smaller term.
    pub fn derive(
        examples: &[TrainingExample],
        allowed_tags: &[String],
        analyzer: &dyn Analyzer,
        per_tag: usize,
    ) -> Result<Self> {
        let n_documents = examples.len() as f64;
        let mut term_counts: HashMap<&str, HashMap<String, usize>> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for example in examples {
            let terms = analyzer.terms(&heuristic_text(&example.record))?;
            let unique: HashSet<&String> = terms.iter().collect();
            for term in unique {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            let counts = term_counts.entry(example.tag.as_str()).or_default();
            for term in terms {
                *counts.entry(term).or_insert(0) += 1;
            }
        }

        let mut entries = Vec::new();
        for tag in allowed_tags {
            let Some(counts) = term_counts.get(tag.as_str()) else {
                continue;
            };

            let mut weighted: Vec<(&String, f64)> = counts
                .iter()
                .map(|(term, &count)| {
                    let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                    let idf = ((1.0 + n_documents) / (1.0 + df)).ln() + 1.0;
                    (term, count as f64 * idf)
                })
                .collect();
            weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            weighted.truncate(per_tag);

            if !weighted.is_empty() {
                entries.push(TagKeywords {
                    tag: tag.clone(),
                    keywords: weighted
                        .into_iter()
                        .map(|(term, weight)| (term.clone(), weight))
                        .collect(),
                });
            }
        }

        Ok(KeywordTable { entries })
    }

    /// Keywords of a tag.
    pub fn keywords(&self, tag: &str) -> Option<&BTreeMap<String, f64>> {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| &entry.keywords)
    }

    pub fn entries(&self) -> &[TagKeywords] {
        &self.entries
    }

    /// Number of tags with at least one keyword.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// High-priority text of a record, as seen by the heuristic.
pub fn heuristic_text(record: &TransactionRecord) -> String {
    record.texts(Priority::High).join(" ")
}

/// Keyword-based tag classifier.
#[derive(Clone)]
pub struct KeywordClassifier {
    table: Arc<KeywordTable>,
    analyzer: Arc<LedgerAnalyzer>,
}

impl std::fmt::Debug for KeywordClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordClassifier")
            .field("tags", &self.table.len())
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl KeywordClassifier {
    pub fn new(table: Arc<KeywordTable>, analyzer: Arc<LedgerAnalyzer>) -> Self {
        KeywordClassifier { table, analyzer }
    }

    /// Tags with a positive keyword score, best first.
    ///
    /// `margin` carries the raw score, `confidence` the share of the total.
    /// Equal scores keep declared tag order.
    pub fn predict(&self, record: &TransactionRecord) -> Result<Vec<RankedTag>> {
        let terms = self.analyzer.terms(&heuristic_text(record))?;
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<RankedTag> = self
            .table
            .entries()
            .iter()
            .filter_map(|entry| {
                let score: f64 = terms
                    .iter()
                    .filter_map(|term| entry.keywords.get(term))
                    .sum();
                (score > 0.0).then(|| RankedTag {
                    tag: entry.tag.clone(),
                    margin: score,
                    confidence: 0.0,
                })
            })
            .collect();

        let total: f64 = scored.iter().map(|r| r.margin).sum();
        for ranked in &mut scored {
            ranked.confidence = ranked.margin / total;
        }
        scored.sort_by(|a, b| b.margin.total_cmp(&a.margin));

        Ok(scored)
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }
}
