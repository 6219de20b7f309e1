//! Margin-to-confidence mapping and ranking.

use serde::{Deserialize, Serialize};

/// Maps a decision margin into `[0, 1]`.
///
/// Implementations must be strictly monotonic in the margin so ranking by
/// confidence never contradicts ranking by margin.
pub trait ConfidenceScorer: Send + Sync {
    fn confidence(&self, margin: f64) -> f64;

    fn name(&self) -> &str;
}

/// The logistic function `1 / (1 + e^-m)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogisticScorer;

impl ConfidenceScorer for LogisticScorer {
    fn confidence(&self, margin: f64) -> f64 {
        logistic(margin)
    }

    fn name(&self) -> &str {
        "logistic"
    }
}

pub fn logistic(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

/// A label with its margin and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTag {
    pub tag: String,
    pub margin: f64,
    pub confidence: f64,
}

/// Rank labels by margin, highest first.
///
/// `labels` must be given in declared tag order; equal margins keep that
/// order.
pub fn rank_margins(
    labels: &[String],
    margins: &[f64],
    scorer: &dyn ConfidenceScorer,
) -> Vec<RankedTag> {
    let mut ranked: Vec<RankedTag> = labels
        .iter()
        .zip(margins)
        .map(|(tag, &margin)| RankedTag {
            tag: tag.clone(),
            margin,
            confidence: scorer.confidence(margin),
        })
        .collect();
    ranked.sort_by(|a, b| b.margin.total_cmp(&a.margin));
    ranked
}
