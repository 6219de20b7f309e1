//! Tag recommender: training, suggestion and model lifecycle.
//!
//! [`TagRecommender`] owns the active model and answers suggestion queries
//! through a fixed fallback chain:
//!
//! 1. the classifier, when its best confidence reaches the threshold;
//! 2. the keyword heuristic;
//! 3. the tag most used for the counterparty account;
//! 4. the classifier's best tag even below the threshold;
//! 5. nothing.
//!
//! Queries read an immutable snapshot of the active state. Training builds a
//! new state off to the side and swaps it in whole, so a query never observes
//! a half-trained model.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use ledger_tagger::ledger::{Amount, TrainingExample, TransactionRecord};
//! use ledger_tagger::recommender::{RecommenderConfig, TagRecommender};
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let example = |text: &str, tag: &str| {
//!     TrainingExample::new(TransactionRecord::new(day, Amount::Signed(-40.0)).with_narrative(text), tag)
//! };
//!
//! let recommender = TagRecommender::new(RecommenderConfig::default()).unwrap();
//! recommender
//!     .train(
//!         &[
//!             example("zaalhuur sporthal", "huur"),
//!             example("zaalhuur gymzaal", "huur"),
//!             example("premie polis", "verzekering"),
//!             example("premie ongevallen", "verzekering"),
//!         ],
//!         None,
//!     )
//!     .unwrap();
//!
//! let query = TransactionRecord::new(day, Amount::Signed(-40.0)).with_narrative("zaalhuur maart");
//! let suggestions = recommender.suggest(&query);
//! assert_eq!(suggestions[0].tag, "huur");
//! ```

pub mod config;
pub mod corpus;
pub mod store;
pub mod suggestion;
pub mod trainer;

pub use config::RecommenderConfig;
pub use corpus::{CorpusSource, InMemoryCorpus, JsonCorpusSource};
pub use store::ModelStore;
pub use suggestion::{Suggestion, SuggestionSource};
pub use trainer::ModelTrainer;

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard, RwLock};
use rayon::prelude::*;

use crate::error::{Result, TaggerError};
use crate::ledger::{TrainingExample, TransactionRecord};
use crate::ml::confidence::{ConfidenceScorer, LogisticScorer, RankedTag};
use crate::ml::counterparty::CounterpartyIndex;
use crate::ml::keyword_classifier::{KeywordClassifier, KeywordTable};
use crate::ml::model::{Fingerprint, TrainedModel};

/// Immutable state queries are answered from.
#[derive(Debug)]
struct ActiveState {
    model: Option<Arc<TrainedModel>>,
    keywords: KeywordClassifier,
    counterparties: CounterpartyIndex,
    /// Fingerprint of the corpus this state was built from.
    fingerprint: Option<Fingerprint>,
}

/// Result of [`TagRecommender::refresh`].
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The corpus fingerprint matches the active state.
    Unchanged,
    /// A cached model matching the corpus was installed.
    Restored(Arc<TrainedModel>),
    /// A new model was trained.
    Retrained(Arc<TrainedModel>),
}

/// The tag recommender.
pub struct TagRecommender {
    config: Arc<RecommenderConfig>,
    trainer: ModelTrainer,
    scorer: Arc<dyn ConfidenceScorer>,
    source: Option<Arc<dyn CorpusSource>>,
    store: Option<ModelStore>,
    state: RwLock<Arc<ActiveState>>,
    /// Serializes training; queries never take it.
    training: Mutex<()>,
}

impl fmt::Debug for TagRecommender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.snapshot();
        f.debug_struct("TagRecommender")
            .field("config", &self.config)
            .field("scorer", &self.scorer.name())
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .field("store", &self.store)
            .field("trained", &state.model.is_some())
            .finish()
    }
}

impl TagRecommender {
    /// Create an untrained recommender that answers from the seed keywords.
    pub fn new(config: RecommenderConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let trainer = ModelTrainer::new(config.clone())?;

        let seed = trainer.seed_keywords()?;
        let state = ActiveState {
            model: None,
            keywords: KeywordClassifier::new(Arc::new(seed), trainer.keyword_analyzer().clone()),
            counterparties: CounterpartyIndex::default(),
            fingerprint: None,
        };

        Ok(TagRecommender {
            config,
            trainer,
            scorer: Arc::new(LogisticScorer),
            source: None,
            store: None,
            state: RwLock::new(Arc::new(state)),
            training: Mutex::new(()),
        })
    }

    /// Attach the corpus used by [`reload`](Self::reload) and [`refresh`](Self::refresh).
    pub fn with_corpus_source(mut self, source: Arc<dyn CorpusSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Persist every trained model to `store` and restore from it on refresh.
    pub fn with_model_store(mut self, store: ModelStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the margin-to-confidence mapping.
    pub fn with_scorer(mut self, scorer: Arc<dyn ConfidenceScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// The active model, if training has succeeded.
    pub fn model(&self) -> Option<Arc<TrainedModel>> {
        self.snapshot().model.clone()
    }

    /// Whether a classifier is active.
    pub fn is_trained(&self) -> bool {
        self.snapshot().model.is_some()
    }

    fn snapshot(&self) -> Arc<ActiveState> {
        self.state.read().clone()
    }

    fn replace_state(&self, state: ActiveState) -> Arc<ActiveState> {
        let mut guard = self.state.write();
        std::mem::replace(&mut *guard, Arc::new(state))
    }

    /// Train on `corpus` plus optional supplemental examples and activate the result.
    ///
    /// On failure the previous state stays active, except for
    /// [`TaggerError::InsufficientData`]: the classifier is dropped and the
    /// keyword table and counterparty memory of the corpus are activated
    /// before the error is returned. An empty corpus falls back to the seed
    /// keywords.
    pub fn train(
        &self,
        corpus: &[TrainingExample],
        supplemental: Option<&[TrainingExample]>,
    ) -> Result<Arc<TrainedModel>> {
        let guard = self.training.lock();
        self.train_locked(&guard, corpus, supplemental.unwrap_or(&[]))
    }

    fn train_locked(
        &self,
        _guard: &MutexGuard<'_, ()>,
        corpus: &[TrainingExample],
        supplemental: &[TrainingExample],
    ) -> Result<Arc<TrainedModel>> {
        match self.trainer.train(corpus, supplemental) {
            Ok(model) => {
                let model = Arc::new(model);
                self.activate(model.clone());
                if let Some(store) = &self.store {
                    if let Err(err) = store.save(&model) {
                        warn!("failed to cache model at {}: {err}", store.path().display());
                    }
                }
                Ok(model)
            }
            Err(err) if err.is_insufficient_data() => {
                warn!("{err}; falling back to heuristics only");
                if corpus.is_empty() && supplemental.is_empty() {
                    self.activate_seed()?;
                } else {
                    self.activate_heuristics(corpus, supplemental)?;
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn activate(&self, model: Arc<TrainedModel>) {
        let state = ActiveState {
            keywords: KeywordClassifier::new(
                Arc::new(model.keywords().clone()),
                self.trainer.keyword_analyzer().clone(),
            ),
            counterparties: model.counterparties().clone(),
            fingerprint: Some(model.fingerprint().clone()),
            model: Some(model),
        };
        self.replace_state(state);
    }

    fn activate_seed(&self) -> Result<()> {
        let seed = self.trainer.seed_keywords()?;
        self.replace_state(ActiveState {
            model: None,
            keywords: KeywordClassifier::new(Arc::new(seed), self.trainer.keyword_analyzer().clone()),
            counterparties: CounterpartyIndex::default(),
            fingerprint: None,
        });
        Ok(())
    }

    fn activate_heuristics(&self, corpus: &[TrainingExample], supplemental: &[TrainingExample]) -> Result<()> {
        let examples: Vec<TrainingExample> = corpus.iter().chain(supplemental).cloned().collect();
        let (keywords, counterparties): (KeywordTable, CounterpartyIndex) =
            self.trainer.heuristics(&examples)?;
        let fingerprint = self.trainer.fingerprint(corpus, supplemental)?;

        self.replace_state(ActiveState {
            model: None,
            keywords: KeywordClassifier::new(Arc::new(keywords), self.trainer.keyword_analyzer().clone()),
            counterparties,
            fingerprint: Some(fingerprint),
        });
        Ok(())
    }

    /// Activate a model trained elsewhere, e.g. loaded from a cache.
    pub fn install(&self, model: TrainedModel) -> Result<Arc<TrainedModel>> {
        if let Some(tag) = model.labels().iter().find(|tag| !self.config.is_allowed(tag)) {
            return Err(TaggerError::storage(format!(
                "model predicts tag '{tag}' which is not allowed"
            )));
        }
        let _guard = self.training.lock();
        let model = Arc::new(model);
        self.activate(model.clone());
        Ok(model)
    }

    fn source(&self) -> Result<&Arc<dyn CorpusSource>> {
        self.source
            .as_ref()
            .ok_or_else(|| TaggerError::invalid_config("no corpus source configured"))
    }

    fn read_corpus(&self) -> Result<(Vec<TrainingExample>, Vec<TrainingExample>)> {
        let source = self.source()?;
        let corpus = source.training_corpus().map_err(TaggerError::corpus_read)?;
        let supplemental = source
            .supplemental_corpus()
            .map_err(TaggerError::corpus_read)?;
        debug!(
            "read {} + {} examples from {} corpus",
            corpus.len(),
            supplemental.len(),
            source.name()
        );
        Ok((corpus, supplemental))
    }

    /// Re-read the corpus source and retrain unconditionally.
    pub fn reload(&self) -> Result<Arc<TrainedModel>> {
        let guard = self.training.lock();
        let (corpus, supplemental) = self.read_corpus()?;
        self.train_locked(&guard, &corpus, &supplemental)
    }

    /// Re-read the corpus source and retrain only if it changed.
    ///
    /// A cached model whose fingerprint matches the corpus is installed instead
    /// of retraining.
    pub fn refresh(&self) -> Result<RefreshOutcome> {
        let guard = self.training.lock();
        let (corpus, supplemental) = self.read_corpus()?;
        let fingerprint = self.trainer.fingerprint(&corpus, &supplemental)?;

        if self.snapshot().fingerprint.as_ref() == Some(&fingerprint) {
            debug!("corpus unchanged ({fingerprint})");
            return Ok(RefreshOutcome::Unchanged);
        }

        if let Some(model) = self.store.as_ref().and_then(|s| s.load_matching(&fingerprint)) {
            info!("restored cached model {fingerprint}");
            let model = Arc::new(model);
            self.activate(model.clone());
            return Ok(RefreshOutcome::Restored(model));
        }

        self.train_locked(&guard, &corpus, &supplemental)
            .map(RefreshOutcome::Retrained)
    }

    /// Suggest tags for a transaction.
    ///
    /// Never fails: a malformed query is logged and answered with an empty list.
    pub fn suggest(&self, record: &TransactionRecord) -> Vec<Suggestion> {
        if let Some(defect) = record.query_defect() {
            warn!("cannot suggest tags: {defect}");
            return Vec::new();
        }

        let state = self.snapshot();
        let threshold = self.config.confidence_threshold;
        let top_k = self.config.top_k;

        let ranking = state.model.as_ref().and_then(|model| {
            match self.trainer.features().build(record) {
                Ok(features) => Some(model.rank(&features, self.scorer.as_ref())),
                Err(err) => {
                    warn!("feature extraction failed: {err}");
                    None
                }
            }
        });

        if let Some(ranking) = &ranking {
            if ranking.first().is_some_and(|top| top.confidence >= threshold) {
                return Self::suggestions(
                    ranking.iter().filter(|r| r.confidence >= threshold),
                    top_k,
                    SuggestionSource::Model,
                );
            }
        }

        match state.keywords.predict(record) {
            Ok(candidates) if !candidates.is_empty() => {
                return Self::suggestions(candidates.iter(), top_k, SuggestionSource::Heuristic);
            }
            Ok(_) => {}
            Err(err) => warn!("keyword heuristic failed: {err}"),
        }

        if let Some(tag) = record
            .account_key()
            .and_then(|key| state.counterparties.get(&key))
        {
            debug!("counterparty memory suggests '{tag}'");
            return vec![Suggestion::new(
                tag,
                self.config.counterparty_confidence,
                SuggestionSource::CounterpartyFallback,
            )];
        }

        if let Some(top) = ranking.as_ref().and_then(|r| r.first()) {
            return vec![Suggestion::new(
                top.tag.clone(),
                top.confidence,
                SuggestionSource::Model,
            )];
        }

        Vec::new()
    }

    fn suggestions<'a>(
        ranked: impl Iterator<Item = &'a RankedTag>,
        top_k: usize,
        source: SuggestionSource,
    ) -> Vec<Suggestion> {
        ranked
            .take(top_k)
            .map(|r| Suggestion::new(r.tag.clone(), r.confidence, source))
            .collect()
    }

    /// Suggest tags for many transactions in parallel, preserving order.
    pub fn suggest_many(&self, records: &[TransactionRecord]) -> Vec<Vec<Suggestion>> {
        records.par_iter().map(|record| self.suggest(record)).collect()
    }
}
