//! Training corpus collaborators.
//!
//! A [`CorpusSource`] hands the recommender its tagged history. Failures are
//! reported as opaque [`anyhow::Error`]s; the recommender wraps them in
//! [`TaggerError::CorpusRead`](crate::error::TaggerError::CorpusRead) without
//! looking inside.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use parking_lot::RwLock;

use crate::ledger::{TrainingExample, TransactionRecord};

/// Supplier of tagged training examples.
pub trait CorpusSource: Send + Sync {
    /// The primary tagged history.
    fn training_corpus(&self) -> anyhow::Result<Vec<TrainingExample>>;

    /// Extra examples that are trained on alongside the primary corpus.
    fn supplemental_corpus(&self) -> anyhow::Result<Vec<TrainingExample>> {
        Ok(Vec::new())
    }

    /// Get the name of this source for logging.
    fn name(&self) -> &str;
}

/// Corpus held in memory. The contents can be replaced while in use.
#[derive(Debug, Default)]
pub struct InMemoryCorpus {
    primary: RwLock<Vec<TrainingExample>>,
    supplemental: RwLock<Vec<TrainingExample>>,
}

impl InMemoryCorpus {
    pub fn new(primary: Vec<TrainingExample>) -> Self {
        InMemoryCorpus {
            primary: RwLock::new(primary),
            supplemental: RwLock::new(Vec::new()),
        }
    }

    pub fn with_supplemental(self, supplemental: Vec<TrainingExample>) -> Self {
        *self.supplemental.write() = supplemental;
        self
    }

    /// Replace the primary corpus.
    pub fn replace(&self, primary: Vec<TrainingExample>) {
        *self.primary.write() = primary;
    }

    /// Append one example to the primary corpus.
    pub fn push(&self, example: TrainingExample) {
        self.primary.write().push(example);
    }
}

impl CorpusSource for InMemoryCorpus {
    fn training_corpus(&self) -> anyhow::Result<Vec<TrainingExample>> {
        Ok(self.primary.read().clone())
    }

    fn supplemental_corpus(&self) -> anyhow::Result<Vec<TrainingExample>> {
        Ok(self.supplemental.read().clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Corpus read from JSON files on every call.
///
/// Files ending in `.jsonl` hold one record per line; anything else is read as
/// a JSON array. Records without a tag are skipped.
#[derive(Debug, Clone)]
pub struct JsonCorpusSource {
    primary: PathBuf,
    supplemental: Option<PathBuf>,
}

impl JsonCorpusSource {
    pub fn new<P: Into<PathBuf>>(primary: P) -> Self {
        JsonCorpusSource {
            primary: primary.into(),
            supplemental: None,
        }
    }

    pub fn with_supplemental<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.supplemental = Some(path.into());
        self
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary
    }
}

impl CorpusSource for JsonCorpusSource {
    fn training_corpus(&self) -> anyhow::Result<Vec<TrainingExample>> {
        load_examples(&self.primary)
    }

    fn supplemental_corpus(&self) -> anyhow::Result<Vec<TrainingExample>> {
        match &self.supplemental {
            Some(path) => load_examples(path),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Load transaction records from a JSON array or JSONL file.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<TransactionRecord>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let is_jsonl = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    if is_jsonl {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| {
                serde_json::from_str::<TransactionRecord>(line).with_context(|| {
                    format!("invalid record on line {} of {}", number + 1, path.display())
                })
            })
            .collect()
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid record array in {}", path.display()))
    }
}

/// Load the tagged records of a file as training examples.
pub fn load_examples(path: &Path) -> anyhow::Result<Vec<TrainingExample>> {
    Ok(load_records(path)?
        .into_iter()
        .filter_map(TrainingExample::from_record)
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ledger::Amount;

    fn record(text: &str) -> TransactionRecord {
        TransactionRecord::new(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), Amount::Signed(-5.0))
            .with_narrative(text)
    }

    #[test]
    fn test_in_memory_corpus() {
        let corpus = InMemoryCorpus::new(vec![TrainingExample::new(record("zaalhuur"), "huur")])
            .with_supplemental(vec![TrainingExample::new(record("ballen"), "materiaal")]);

        assert_eq!(corpus.training_corpus().unwrap().len(), 1);
        corpus.push(TrainingExample::new(record("polis"), "verzekering"));
        assert_eq!(corpus.training_corpus().unwrap().len(), 2);
        assert_eq!(corpus.supplemental_corpus().unwrap().len(), 1);

        corpus.replace(Vec::new());
        assert!(corpus.training_corpus().unwrap().is_empty());
    }

    #[test]
    fn test_json_and_jsonl_files() {
        let dir = tempfile::tempdir().unwrap();
        let tagged = record("zaalhuur").with_tag("huur");
        let untagged = record("onbekend");

        let array_path = dir.path().join("history.json");
        fs::write(&array_path, serde_json::to_string(&vec![&tagged, &untagged]).unwrap()).unwrap();

        let lines_path = dir.path().join("extra.jsonl");
        let lines = format!(
            "{}\n\n{}\n",
            serde_json::to_string(&tagged).unwrap(),
            serde_json::to_string(&untagged).unwrap()
        );
        fs::write(&lines_path, lines).unwrap();

        let source = JsonCorpusSource::new(&array_path).with_supplemental(&lines_path);
        let primary = source.training_corpus().unwrap();
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].tag, "huur");
        assert_eq!(source.supplemental_corpus().unwrap().len(), 1);
        assert_eq!(load_records(&lines_path).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let source = JsonCorpusSource::new("/nonexistent/history.json");
        let err = source.training_corpus().unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
