//! Command line argument parsing for the ledger tagger CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// ledger-tagger - tag suggestions for ledger transactions
#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-tagger")]
#[command(about = "Suggest tags for bank and cash-book transactions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TaggerArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Recommender configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "LEDGER_TAGGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TaggerArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model from tagged history
    Train(TrainArgs),

    /// Suggest tags for transactions
    Suggest(SuggestArgs),

    /// Show what a cached model contains
    Inspect(InspectArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Tagged transaction history (JSON array or JSONL)
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Additional tagged examples trained alongside the history
    #[arg(short, long, value_name = "FILE")]
    pub supplemental: Option<PathBuf>,

    /// Where to write the trained model
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub model: Option<PathBuf>,
}

/// Arguments for suggesting tags
#[derive(Parser, Debug, Clone)]
pub struct SuggestArgs {
    /// Transactions to tag (JSON array or JSONL)
    #[arg(value_name = "INPUT_FILE")]
    pub input: PathBuf,

    /// Cached model to answer from
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub model: Option<PathBuf>,

    /// Tagged history; trained on when no usable cached model is found
    #[arg(long, value_name = "CORPUS_FILE")]
    pub corpus: Option<PathBuf>,

    /// Additional tagged examples
    #[arg(short, long, value_name = "FILE")]
    pub supplemental: Option<PathBuf>,

    /// Override the number of suggestions per transaction
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Override the classifier confidence threshold
    #[arg(short = 't', long)]
    pub threshold: Option<f64>,
}

/// Arguments for inspecting a model
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Cached model file
    #[arg(value_name = "MODEL_FILE")]
    pub model: PathBuf,

    /// Also list the heuristic keywords of every tag
    #[arg(long)]
    pub keywords: bool,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suggest() {
        let args = TaggerArgs::parse_from([
            "ledger-tagger",
            "-vv",
            "--format",
            "json",
            "suggest",
            "new.jsonl",
            "--model",
            "model.bin",
            "-k",
            "5",
        ]);

        assert_eq!(args.verbosity(), 2);
        assert_eq!(args.output_format, OutputFormat::Json);
        match args.command {
            Command::Suggest(suggest) => {
                assert_eq!(suggest.input, PathBuf::from("new.jsonl"));
                assert_eq!(suggest.top_k, Some(5));
                assert!(suggest.corpus.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args = TaggerArgs::parse_from(["ledger-tagger", "-v", "-q", "inspect", "model.bin"]);
        assert_eq!(args.verbosity(), 0);
    }
}
