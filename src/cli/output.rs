//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, TaggerArgs};
use crate::error::Result;
use crate::recommender::Suggestion;

/// Result structure for training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingReport {
    pub training_examples: usize,
    pub supplemental_examples: usize,
    pub examples_per_tag: Vec<(String, usize)>,
    pub vocabulary_size: usize,
    pub converged: bool,
    pub fingerprint: String,
    pub training_time_ms: u64,
    pub model_path: Option<String>,
}

/// Suggestions for one input transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordSuggestions {
    pub index: usize,
    pub date: String,
    pub counterparty: String,
    pub suggestions: Vec<Suggestion>,
}

/// Result structure for suggestion runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub trained: bool,
    pub records: Vec<RecordSuggestions>,
    pub duration_ms: u64,
}

/// Per-tag summary of a model.
#[derive(Debug, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag: String,
    pub examples: usize,
    pub class_weight: f64,
    pub keywords: Vec<String>,
}

/// Result structure for model inspection.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelReport {
    pub fingerprint: String,
    pub trained_at: String,
    pub training_examples: usize,
    pub supplemental_examples: usize,
    pub vocabulary_size: usize,
    pub converged: bool,
    pub known_counterparties: usize,
    pub tags: Vec<TagSummary>,
}

/// Plain-text rendering of a result.
pub trait HumanReadable {
    fn render(&self, verbosity: u8) -> String;
}

impl HumanReadable for TrainingReport {
    fn render(&self, verbosity: u8) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Trained on {} examples ({} supplemental), {} terms, {} ms",
            self.training_examples + self.supplemental_examples,
            self.supplemental_examples,
            self.vocabulary_size,
            self.training_time_ms
        );
        for (tag, count) in &self.examples_per_tag {
            let _ = writeln!(out, "  {tag:<28} {count:>6}");
        }
        if !self.converged {
            let _ = writeln!(out, "Warning: solver hit the iteration limit");
        }
        if let Some(path) = &self.model_path {
            let _ = writeln!(out, "Model written to {path}");
        }
        if verbosity > 1 {
            let _ = writeln!(out, "Fingerprint: {}", self.fingerprint);
        }
        out
    }
}

impl HumanReadable for SuggestionReport {
    fn render(&self, verbosity: u8) -> String {
        let mut out = String::new();
        if !self.trained {
            let _ = writeln!(out, "No trained model; suggestions come from heuristics only");
        }
        for record in &self.records {
            let _ = write!(out, "#{:<4} {} {:<30}", record.index, record.date, record.counterparty);
            if record.suggestions.is_empty() {
                let _ = writeln!(out, " -");
                continue;
            }
            let rendered: Vec<String> = record
                .suggestions
                .iter()
                .map(|s| {
                    if verbosity > 1 {
                        format!("{} ({:.2}, {})", s.tag, s.confidence, s.source)
                    } else {
                        format!("{} ({:.2})", s.tag, s.confidence)
                    }
                })
                .collect();
            let _ = writeln!(out, " {}", rendered.join(", "));
        }
        if verbosity > 1 {
            let _ = writeln!(out, "{} transactions in {} ms", self.records.len(), self.duration_ms);
        }
        out
    }
}

impl HumanReadable for ModelReport {
    fn render(&self, _verbosity: u8) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Fingerprint:     {}", self.fingerprint);
        let _ = writeln!(out, "Trained at:      {}", self.trained_at);
        let _ = writeln!(
            out,
            "Examples:        {} (+{} supplemental)",
            self.training_examples, self.supplemental_examples
        );
        let _ = writeln!(out, "Vocabulary:      {}", self.vocabulary_size);
        let _ = writeln!(out, "Counterparties:  {}", self.known_counterparties);
        let _ = writeln!(out, "Converged:       {}", self.converged);
        let _ = writeln!(out);
        for tag in &self.tags {
            let _ = writeln!(
                out,
                "  {:<28} {:>6} examples  weight {:.3}",
                tag.tag, tag.examples, tag.class_weight
            );
            if !tag.keywords.is_empty() {
                let _ = writeln!(out, "      {}", tag.keywords.join(" "));
            }
        }
        out
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &TaggerArgs) -> Result<()>
where
    T: Serialize + HumanReadable,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            print!("{}", result.render(args.verbosity()));
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::SuggestionSource;

    #[test]
    fn test_render_suggestions() {
        let report = SuggestionReport {
            trained: true,
            records: vec![
                RecordSuggestions {
                    index: 0,
                    date: "2024-01-05".to_string(),
                    counterparty: "Sporthal".to_string(),
                    suggestions: vec![Suggestion::new("huur", 0.81, SuggestionSource::Model)],
                },
                RecordSuggestions {
                    index: 1,
                    date: "2024-01-06".to_string(),
                    counterparty: String::new(),
                    suggestions: Vec::new(),
                },
            ],
            duration_ms: 3,
        };

        let text = report.render(1);
        assert!(text.contains("huur (0.81)"));
        assert!(text.lines().nth(1).unwrap().ends_with('-'));
        assert!(report.render(2).contains("huur (0.81, model)"));
    }
}
