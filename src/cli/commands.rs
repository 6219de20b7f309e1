//! Command implementations for the ledger tagger CLI.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{Result, TaggerError};
use crate::ml::model::TrainedModel;
use crate::recommender::corpus::{load_examples, load_records};
use crate::recommender::{JsonCorpusSource, ModelStore, RecommenderConfig, TagRecommender};

/// Execute a CLI command.
pub fn execute_command(args: TaggerArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Suggest(suggest_args) => suggest(suggest_args.clone(), &args),
        Command::Inspect(inspect_args) => inspect(inspect_args.clone(), &args),
    }
}

fn load_config(cli_args: &TaggerArgs) -> Result<RecommenderConfig> {
    match &cli_args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            RecommenderConfig::from_file(path)
        }
        None => Ok(RecommenderConfig::default()),
    }
}

fn read_examples(path: &Path) -> Result<Vec<crate::ledger::TrainingExample>> {
    load_examples(path).map_err(TaggerError::corpus_read)
}

/// Train a model and optionally write it to disk.
fn train(args: TrainArgs, cli_args: &TaggerArgs) -> Result<()> {
    let recommender = TagRecommender::new(load_config(cli_args)?)?;

    let corpus = read_examples(&args.corpus)?;
    let supplemental = match &args.supplemental {
        Some(path) => read_examples(path)?,
        None => Vec::new(),
    };

    let model = recommender.train(&corpus, Some(supplemental.as_slice()))?;

    if let Some(path) = &args.model {
        ModelStore::new(path).save(&model)?;
    }

    let metadata = model.metadata();
    output_result(
        "Training finished",
        &TrainingReport {
            training_examples: metadata.training_examples,
            supplemental_examples: metadata.supplemental_examples,
            examples_per_tag: metadata.examples_per_tag.clone(),
            vocabulary_size: metadata.vocabulary_size,
            converged: metadata.converged,
            fingerprint: model.fingerprint().to_string(),
            training_time_ms: metadata.training_time_ms,
            model_path: args.model.as_ref().map(|p| p.to_string_lossy().to_string()),
        },
        cli_args,
    )
}

/// Suggest tags for every transaction of an input file.
fn suggest(args: SuggestArgs, cli_args: &TaggerArgs) -> Result<()> {
    let mut config = load_config(cli_args)?;
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if let Some(threshold) = args.threshold {
        config.confidence_threshold = threshold;
    }

    let mut recommender = TagRecommender::new(config)?;
    if let Some(path) = &args.model {
        recommender = recommender.with_model_store(ModelStore::new(path));
    }

    match &args.corpus {
        Some(corpus) => {
            let mut source = JsonCorpusSource::new(corpus);
            if let Some(path) = &args.supplemental {
                source = source.with_supplemental(path);
            }
            recommender = recommender.with_corpus_source(Arc::new(source));
            // Restores the cached model when it matches the corpus.
            if let Err(err) = recommender.refresh() {
                if !err.is_insufficient_data() {
                    return Err(err);
                }
                warn!("{err}");
            }
        }
        None => {
            if let Some(path) = &args.model {
                match ModelStore::new(path).load()? {
                    Some(model) => {
                        recommender.install(model)?;
                    }
                    None => warn!("no model at {}; using seed keywords", path.display()),
                }
            }
        }
    }

    let records = load_records(&args.input).map_err(TaggerError::corpus_read)?;

    let started = Instant::now();
    let suggestions = recommender.suggest_many(&records);
    let duration_ms = started.elapsed().as_millis() as u64;

    let records = records
        .iter()
        .zip(suggestions)
        .enumerate()
        .map(|(index, (record, suggestions))| RecordSuggestions {
            index,
            date: record.date.to_string(),
            counterparty: record.counterparty_name.clone(),
            suggestions,
        })
        .collect();

    output_result(
        "Suggestions",
        &SuggestionReport {
            trained: recommender.is_trained(),
            records,
            duration_ms,
        },
        cli_args,
    )
}

/// Show a cached model.
fn inspect(args: InspectArgs, cli_args: &TaggerArgs) -> Result<()> {
    let model = ModelStore::new(&args.model).load()?.ok_or_else(|| {
        TaggerError::storage(format!("no model found at {}", args.model.display()))
    })?;

    output_result("Model", &model_report(&model, args.keywords), cli_args)
}

fn model_report(model: &TrainedModel, with_keywords: bool) -> ModelReport {
    let metadata = model.metadata();
    let tags = model
        .labels()
        .iter()
        .zip(model.class_weights())
        .map(|(tag, weight)| TagSummary {
            tag: tag.clone(),
            examples: metadata
                .examples_per_tag
                .iter()
                .find(|(t, _)| t == tag)
                .map(|(_, count)| *count)
                .unwrap_or(0),
            class_weight: *weight,
            keywords: if with_keywords {
                model
                    .keywords()
                    .keywords(tag)
                    .map(|k| k.keys().cloned().collect())
                    .unwrap_or_default()
            } else {
                Vec::new()
            },
        })
        .collect();

    ModelReport {
        fingerprint: model.fingerprint().to_string(),
        trained_at: metadata.trained_at.to_rfc3339(),
        training_examples: metadata.training_examples,
        supplemental_examples: metadata.supplemental_examples,
        vocabulary_size: metadata.vocabulary_size,
        converged: metadata.converged,
        known_counterparties: model.counterparties().len(),
        tags,
    }
}
