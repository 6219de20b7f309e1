//! TF-IDF vectorizer over feature bags.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggerError};
use crate::ml::features::FeatureVector;

/// Sparse vector with strictly increasing indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build from `(index, value)` pairs; pairs are sorted by index.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|(index, _)| *index);
        let (indices, values) = pairs.into_iter().unzip();
        SparseVector { indices, values }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dot product with a dense vector. Indices past its end contribute zero.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter()
            .filter_map(|(index, value)| dense.get(index).map(|w| w * value))
            .sum()
    }

    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    pub fn norm(&self) -> f64 {
        self.squared_norm().sqrt()
    }

    /// `dense += scale * self`.
    pub fn add_scaled_to(&self, dense: &mut [f64], scale: f64) {
        for (index, value) in self.iter() {
            if let Some(slot) = dense.get_mut(index) {
                *slot += scale * value;
            }
        }
    }
}

/// TF-IDF vectorizer.
///
/// Raw term counts are weighted with the smoothed inverse document frequency
/// `ln((1 + n) / (1 + df)) + 1` and each vector is L2 normalized. Vocabulary
/// indices follow lexicographic term order, so two fits over the same corpus
/// produce the same feature space.
#[derive(Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> index mapping.
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per index.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
    /// Terms seen in fewer documents than this are dropped.
    min_df: usize,
    /// Terms seen in more than this share of the documents are dropped.
    max_df: f64,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("min_df", &self.min_df)
            .field("max_df", &self.max_df)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer with document frequency bounds.
    pub fn new(min_df: usize, max_df: f64) -> Self {
        Self {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            min_df: min_df.max(1),
            max_df,
        }
    }

    /// Fit the vocabulary and idf weights on training documents.
    ///
    /// Fails with [`TaggerError::InsufficientData`] when the frequency bounds
    /// leave no term at all.
    pub fn fit(&mut self, documents: &[FeatureVector]) -> Result<()> {
        let n_documents = documents.len();
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();

        for doc in documents {
            for (term, _) in doc.iter() {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let max_count = self.max_df * n_documents as f64;
        let mut vocabulary = HashMap::new();
        let mut idf = Vec::new();

        // BTreeMap iteration is lexicographic, which fixes the index order.
        for (term, df) in document_frequency {
            if df < self.min_df || df as f64 > max_count {
                continue;
            }
            vocabulary.insert(term.to_string(), idf.len());
            idf.push(((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
        }

        if vocabulary.is_empty() {
            return Err(TaggerError::insufficient_data(format!(
                "no term survives the document frequency bounds (min_df={}, max_df={}) over {} documents",
                self.min_df, self.max_df, n_documents
            )));
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_documents;

        Ok(())
    }

    /// Transform a document into an L2-normalized TF-IDF vector.
    ///
    /// Terms outside the vocabulary are ignored; a document without any known
    /// term yields an empty vector.
    pub fn transform(&self, document: &FeatureVector) -> SparseVector {
        let pairs: Vec<(usize, f64)> = document
            .iter()
            .filter_map(|(term, count)| {
                self.vocabulary
                    .get(term)
                    .map(|&index| (index, count as f64 * self.idf[index]))
            })
            .collect();

        let norm = pairs.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        let pairs = if norm > 0.0 {
            pairs.into_iter().map(|(i, v)| (i, v / norm)).collect()
        } else {
            pairs
        };

        SparseVector::from_pairs(pairs)
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Index of a term, if it is part of the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Idf weight of a term.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.index_of(term).map(|index| self.idf[index])
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(terms: &[&str]) -> FeatureVector {
        terms.iter().copied().collect()
    }

    fn corpus() -> Vec<FeatureVector> {
        vec![
            doc(&["huur", "zaal", "sporthal"]),
            doc(&["huur", "zaal", "gemeente"]),
            doc(&["premie", "polis", "zaal"]),
        ]
    }

    #[test]
    fn test_vocabulary_is_lexicographic() {
        let mut vectorizer = TfIdfVectorizer::new(1, 1.0);
        vectorizer.fit(&corpus()).unwrap();

        assert_eq!(vectorizer.vocabulary_size(), 6);
        assert_eq!(vectorizer.index_of("gemeente"), Some(0));
        assert_eq!(vectorizer.index_of("huur"), Some(1));
        assert_eq!(vectorizer.index_of("zaal"), Some(5));
    }

    #[test]
    fn test_max_df_drops_ubiquitous_terms() {
        let mut vectorizer = TfIdfVectorizer::new(1, 0.95);
        vectorizer.fit(&corpus()).unwrap();

        assert_eq!(vectorizer.index_of("zaal"), None);
        assert_eq!(vectorizer.vocabulary_size(), 5);
    }

    #[test]
    fn test_smoothed_idf() {
        let mut vectorizer = TfIdfVectorizer::new(1, 1.0);
        vectorizer.fit(&corpus()).unwrap();

        let expected = (4.0f64 / 3.0).ln() + 1.0;
        assert!((vectorizer.idf("huur").unwrap() - expected).abs() < 1e-12);
        assert!((vectorizer.idf("zaal").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let mut vectorizer = TfIdfVectorizer::new(1, 0.95);
        vectorizer.fit(&corpus()).unwrap();

        let vector = vectorizer.transform(&doc(&["huur", "huur", "polis", "onbekend"]));
        assert_eq!(vector.nnz(), 2);
        assert!((vector.norm() - 1.0).abs() < 1e-12);
        assert!(vector.indices().windows(2).all(|w| w[0] < w[1]));

        let unknown = vectorizer.transform(&doc(&["onbekend"]));
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_empty_vocabulary_is_insufficient_data() {
        let mut vectorizer = TfIdfVectorizer::new(1, 0.5);
        let docs = vec![doc(&["zaal"]), doc(&["zaal"])];

        let err = vectorizer.fit(&docs).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_sparse_vector_ops() {
        let vector = SparseVector::from_pairs(vec![(3, 2.0), (0, 1.0)]);
        assert_eq!(vector.indices(), &[0, 3]);
        assert_eq!(vector.dot(&[1.0, 5.0, 5.0, 0.5]), 2.0);
        assert_eq!(vector.dot(&[1.0]), 1.0);

        let mut dense = vec![0.0; 4];
        vector.add_scaled_to(&mut dense, 2.0);
        assert_eq!(dense, vec![2.0, 0.0, 0.0, 4.0]);
    }
}
