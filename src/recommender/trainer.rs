//! Model training.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{debug, info};
use rayon::prelude::*;

use crate::analysis::analyzer::ledger::LedgerAnalyzer;
use crate::error::{Result, TaggerError};
use crate::ledger::TrainingExample;
use crate::ml::counterparty::CounterpartyIndex;
use crate::ml::features::{FeatureBuilder, FeatureVector};
use crate::ml::keyword_classifier::KeywordTable;
use crate::ml::linear_svm::LinearSvm;
use crate::ml::model::{Fingerprint, ModelMetadata, TrainedModel};
use crate::ml::tfidf::{SparseVector, TfIdfVectorizer};
use crate::recommender::config::RecommenderConfig;

/// Fits [`TrainedModel`]s under one configuration.
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    config: Arc<RecommenderConfig>,
    features: FeatureBuilder,
    keyword_analyzer: Arc<LedgerAnalyzer>,
}

impl ModelTrainer {
    pub fn new(config: Arc<RecommenderConfig>) -> Result<Self> {
        let features = FeatureBuilder::with_stop_words(&config.extra_stop_words)?;
        let keyword_analyzer = Arc::new(LedgerAnalyzer::keywords(
            config.extra_stop_words.iter().cloned(),
            config.compound_stems.iter().cloned(),
        )?);

        Ok(ModelTrainer {
            config,
            features,
            keyword_analyzer,
        })
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn features(&self) -> &FeatureBuilder {
        &self.features
    }

    pub fn keyword_analyzer(&self) -> &Arc<LedgerAnalyzer> {
        &self.keyword_analyzer
    }

    /// Check every example, indexing the supplemental corpus after the primary one.
    pub fn validate(&self, corpus: &[TrainingExample], supplemental: &[TrainingExample]) -> Result<()> {
        for (index, example) in corpus.iter().chain(supplemental).enumerate() {
            if !self.config.is_allowed(&example.tag) {
                return Err(TaggerError::invalid_example(
                    index,
                    format!("tag '{}' is not an allowed tag", example.tag),
                ));
            }
            if let Some(defect) = example.record.training_defect() {
                return Err(TaggerError::invalid_example(index, defect));
            }
        }
        Ok(())
    }

    /// Fingerprint of the corpora together with the training settings.
    pub fn fingerprint(
        &self,
        corpus: &[TrainingExample],
        supplemental: &[TrainingExample],
    ) -> Result<Fingerprint> {
        let mut hasher = Fingerprint::hasher();
        hasher.update_json(&self.config.training_params())?;
        hasher.update_marker("corpus");
        for example in corpus {
            hasher.update_json(example)?;
        }
        hasher.update_marker("supplemental");
        for example in supplemental {
            hasher.update_json(example)?;
        }
        Ok(hasher.finish())
    }

    /// Seed keyword table used before any training.
    pub fn seed_keywords(&self) -> Result<KeywordTable> {
        KeywordTable::from_seed(
            &self.config.seed_keywords,
            &self.config.allowed_tags,
            self.keyword_analyzer.as_ref(),
        )
    }

    /// Keyword table and counterparty index derived from the examples.
    pub fn heuristics(&self, examples: &[TrainingExample]) -> Result<(KeywordTable, CounterpartyIndex)> {
        let keywords = KeywordTable::derive(
            examples,
            &self.config.allowed_tags,
            self.keyword_analyzer.as_ref(),
            self.config.keywords_per_tag,
        )?;
        let counterparties = CounterpartyIndex::build(examples, &self.config.allowed_tags);
        Ok((keywords, counterparties))
    }

    /// Fit a model on the primary and supplemental corpora.
    ///
    /// Fails with [`TaggerError::InvalidExample`] for the first offending
    /// example and with [`TaggerError::InsufficientData`] when the corpus is
    /// too small, covers too few tags or yields no vocabulary.
    pub fn train(
        &self,
        corpus: &[TrainingExample],
        supplemental: &[TrainingExample],
    ) -> Result<TrainedModel> {
        let started = Instant::now();

        self.validate(corpus, supplemental)?;
        let fingerprint = self.fingerprint(corpus, supplemental)?;

        let examples: Vec<TrainingExample> = corpus.iter().chain(supplemental).cloned().collect();

        let allowed = &self.config.allowed_tags;
        let mut counts = vec![0usize; allowed.len()];
        for example in &examples {
            if let Some(position) = allowed.iter().position(|t| *t == example.tag) {
                counts[position] += 1;
            }
        }
        let distinct = counts.iter().filter(|&&c| c > 0).count();

        if examples.len() < self.config.min_examples || distinct < self.config.min_classes {
            return Err(TaggerError::insufficient_data(format!(
                "{} examples over {} tags; need at least {} examples over {} tags",
                examples.len(),
                distinct,
                self.config.min_examples,
                self.config.min_classes
            )));
        }

        let documents: Vec<FeatureVector> = examples
            .par_iter()
            .map(|example| self.features.build(&example.record))
            .collect::<Result<_>>()?;

        let mut vectorizer = TfIdfVectorizer::new(self.config.min_df, self.config.max_df);
        vectorizer.fit(&documents)?;
        debug!(
            "fitted vocabulary of {} terms over {} documents",
            vectorizer.vocabulary_size(),
            documents.len()
        );

        let samples: Vec<SparseVector> = documents
            .par_iter()
            .map(|document| vectorizer.transform(document))
            .collect();

        let examples_per_tag: Vec<(String, usize)> = allowed
            .iter()
            .zip(&counts)
            .filter(|(_, count)| **count > 0)
            .map(|(tag, count)| (tag.clone(), *count))
            .collect();
        let labels: Vec<String> = examples_per_tag.iter().map(|(tag, _)| tag.clone()).collect();
        let label_index: HashMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(index, tag)| (tag.as_str(), index))
            .collect();
        let targets: Vec<usize> = examples
            .iter()
            .map(|example| {
                label_index
                    .get(example.tag.as_str())
                    .copied()
                    .ok_or_else(|| TaggerError::other(format!("unknown label '{}'", example.tag)))
            })
            .collect::<Result<_>>()?;

        let classifier = LinearSvm::fit(
            &samples,
            &targets,
            labels,
            vectorizer.vocabulary_size(),
            &self.config.svm_params(),
        )?;
        for (tag, weight) in classifier.labels().iter().zip(classifier.class_weights()) {
            debug!("class weight {tag}: {weight:.3}");
        }

        let (keywords, counterparties) = self.heuristics(&examples)?;

        let metadata = ModelMetadata {
            trained_at: Utc::now(),
            training_examples: corpus.len(),
            supplemental_examples: supplemental.len(),
            examples_per_tag,
            vocabulary_size: vectorizer.vocabulary_size(),
            converged: classifier.convergence().iter().all(|c| c.converged),
            training_time_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            "trained model on {} examples ({} tags, {} terms) in {} ms",
            examples.len(),
            metadata.examples_per_tag.len(),
            metadata.vocabulary_size,
            metadata.training_time_ms
        );

        Ok(TrainedModel::new(
            vectorizer,
            classifier,
            keywords,
            counterparties,
            fingerprint,
            metadata,
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ledger::{Amount, TransactionRecord};

    fn trainer() -> ModelTrainer {
        ModelTrainer::new(Arc::new(RecommenderConfig::default())).unwrap()
    }

    fn example(text: &str, amount: f64, tag: &str) -> TrainingExample {
        let record = TransactionRecord::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), Amount::Signed(amount))
            .with_narrative(text);
        TrainingExample::new(record, tag)
    }

    fn corpus() -> Vec<TrainingExample> {
        vec![
            example("zaalhuur sporthal januari", -120.0, "huur"),
            example("zaalhuur sporthal februari", -120.0, "huur"),
            example("premie aansprakelijkheid polis", -80.0, "verzekering"),
            example("premie ongevallen polis", -60.0, "verzekering"),
        ]
    }

    #[test]
    fn test_train_produces_labels_in_declared_order() {
        let model = trainer().train(&corpus(), &[]).unwrap();

        assert_eq!(model.labels(), &["huur".to_string(), "verzekering".to_string()]);
        assert_eq!(model.metadata().training_examples, 4);
        assert!(model.vectorizer().vocabulary_size() > 0);
        assert!(model.counterparties().is_empty());
        assert!(model.keywords().keywords("huur").is_some());
    }

    #[test]
    fn test_invalid_examples_are_reported_by_index() {
        let trainer = trainer();

        let mut bad_tag = corpus();
        bad_tag.push(example("iets", -1.0, "onbekend"));
        match trainer.train(&bad_tag, &[]) {
            Err(TaggerError::InvalidExample { index, .. }) => assert_eq!(index, 4),
            other => panic!("unexpected result: {other:?}"),
        }

        let blank = vec![example("   ", -1.0, "huur")];
        match trainer.train(&corpus(), &blank) {
            Err(TaggerError::InvalidExample { index, .. }) => assert_eq!(index, 4),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_single_tag_is_insufficient() {
        let corpus = vec![
            example("zaalhuur", -1.0, "huur"),
            example("verhuur", -1.0, "huur"),
        ];
        let err = trainer().train(&corpus, &[]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_fingerprint_covers_supplemental() {
        let trainer = trainer();
        let corpus = corpus();
        let extra = vec![example("ballen", -30.0, "materiaal")];

        let a = trainer.fingerprint(&corpus, &[]).unwrap();
        let b = trainer.fingerprint(&corpus, &extra).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, trainer.fingerprint(&corpus, &[]).unwrap());
    }

    #[test]
    fn test_fingerprint_ignores_query_settings() {
        let corpus = corpus();
        let baseline = trainer().fingerprint(&corpus, &[]).unwrap();

        let query_tuned = RecommenderConfig::builder()
            .confidence_threshold(0.3)
            .top_k(1)
            .build()
            .unwrap();
        let tuned = ModelTrainer::new(Arc::new(query_tuned)).unwrap();
        assert_eq!(baseline, tuned.fingerprint(&corpus, &[]).unwrap());

        let regularized = RecommenderConfig::builder().regularization(0.5).build().unwrap();
        let retrained = ModelTrainer::new(Arc::new(regularized)).unwrap();
        assert_ne!(baseline, retrained.fingerprint(&corpus, &[]).unwrap());
    }
}
