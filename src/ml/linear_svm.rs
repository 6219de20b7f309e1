//! One-vs-rest linear SVM trained by dual coordinate descent.
//!
//! Each class gets an L2-regularized squared-hinge binary classifier with a
//! bias term (constant feature 1). The dual problem is solved coordinate by
//! coordinate in a seeded random order, so a fixed seed and corpus always
//! produce the same weights.

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggerError};
use crate::ml::tfidf::SparseVector;

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvmParams {
    /// Inverse regularization strength.
    pub c: f64,
    /// Upper bound on passes over the data per class.
    pub max_iterations: usize,
    /// Stop once the projected gradient spread drops to this value.
    pub tolerance: f64,
    /// Seed for the coordinate order.
    pub seed: u64,
}

impl Default for SvmParams {
    fn default() -> Self {
        SvmParams {
            c: 1.0,
            max_iterations: 2000,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

/// Outcome of one binary subproblem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceInfo {
    pub iterations: usize,
    pub converged: bool,
}

/// Trained one-vs-rest classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    labels: Vec<String>,
    /// Per class: `dimension` feature weights followed by the bias.
    weights: Vec<Vec<f64>>,
    class_weights: Vec<f64>,
    dimension: usize,
    convergence: Vec<ConvergenceInfo>,
}

impl LinearSvm {
    /// Fit one binary classifier per label.
    ///
    /// `targets[i]` is the label index of `samples[i]`. Class weights are
    /// balanced (`n / (k * count)`), so rare tags are not drowned out.
    pub fn fit(
        samples: &[SparseVector],
        targets: &[usize],
        labels: Vec<String>,
        dimension: usize,
        params: &SvmParams,
    ) -> Result<Self> {
        if samples.len() != targets.len() {
            return Err(TaggerError::other(format!(
                "{} samples but {} targets",
                samples.len(),
                targets.len()
            )));
        }
        if labels.len() < 2 {
            return Err(TaggerError::insufficient_data(format!(
                "need at least 2 classes, got {}",
                labels.len()
            )));
        }
        if let Some(&bad) = targets.iter().find(|&&t| t >= labels.len()) {
            return Err(TaggerError::other(format!("target {bad} out of range")));
        }

        let class_weights = balanced_class_weights(targets, labels.len());

        let solved: Vec<(Vec<f64>, ConvergenceInfo)> = (0..labels.len())
            .into_par_iter()
            .map(|class| {
                let signs: Vec<f64> = targets
                    .iter()
                    .map(|&t| if t == class { 1.0 } else { -1.0 })
                    .collect();
                let costs: Vec<f64> = targets
                    .iter()
                    .map(|&t| {
                        if t == class {
                            params.c * class_weights[class]
                        } else {
                            params.c
                        }
                    })
                    .collect();
                solve_binary(samples, &signs, &costs, dimension, params)
            })
            .collect();

        let (weights, convergence): (Vec<_>, Vec<_>) = solved.into_iter().unzip();

        for (label, info) in labels.iter().zip(&convergence) {
            debug!(
                "class {label}: {} iterations, converged={}",
                info.iterations, info.converged
            );
        }

        Ok(LinearSvm {
            labels,
            weights,
            class_weights,
            dimension,
            convergence,
        })
    }

    /// Decision value of every label, in label order.
    pub fn decision_function(&self, sample: &SparseVector) -> Vec<f64> {
        self.weights
            .iter()
            .map(|w| sample.dot(&w[..self.dimension]) + w[self.dimension])
            .collect()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn class_weights(&self) -> &[f64] {
        &self.class_weights
    }

    /// Feature weights and bias of one label.
    pub fn coefficients(&self, label: usize) -> Option<(&[f64], f64)> {
        self.weights
            .get(label)
            .map(|w| (&w[..self.dimension], w[self.dimension]))
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn convergence(&self) -> &[ConvergenceInfo] {
        &self.convergence
    }
}

/// Balanced class weights: `n_samples / (n_classes * count)`.
///
/// A label without samples gets weight 0.
pub fn balanced_class_weights(targets: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &t in targets {
        counts[t] += 1;
    }
    let n = targets.len() as f64;
    counts
        .iter()
        .map(|&count| {
            if count == 0 {
                0.0
            } else {
                n / (n_classes as f64 * count as f64)
            }
        })
        .collect()
}

/// Dual coordinate descent for the squared-hinge loss.
///
/// Returns `dimension + 1` weights, the last one being the bias.
fn solve_binary(
    samples: &[SparseVector],
    signs: &[f64],
    costs: &[f64],
    dimension: usize,
    params: &SvmParams,
) -> (Vec<f64>, ConvergenceInfo) {
    let n = samples.len();
    let mut w = vec![0.0; dimension + 1];
    let mut alpha = vec![0.0; n];

    let diag: Vec<f64> = costs.iter().map(|c| 0.5 / c).collect();
    // The bias feature adds 1 to every squared norm.
    let qd: Vec<f64> = samples
        .iter()
        .zip(&diag)
        .map(|(x, d)| d + x.squared_norm() + 1.0)
        .collect();

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(params.seed);

    let mut iterations = 0;
    let mut converged = false;

    while iterations < params.max_iterations {
        iterations += 1;
        order.shuffle(&mut rng);

        let mut pg_max = f64::NEG_INFINITY;
        let mut pg_min = f64::INFINITY;

        for &i in &order {
            let x = &samples[i];
            let y = signs[i];

            let g = y * (x.dot(&w[..dimension]) + w[dimension]) - 1.0 + diag[i] * alpha[i];
            let pg = if alpha[i] == 0.0 { g.min(0.0) } else { g };

            pg_max = pg_max.max(pg);
            pg_min = pg_min.min(pg);

            if pg.abs() > 1e-12 {
                let old = alpha[i];
                alpha[i] = (old - g / qd[i]).max(0.0);
                let delta = (alpha[i] - old) * y;
                x.add_scaled_to(&mut w[..dimension], delta);
                w[dimension] += delta;
            }
        }

        if pg_max - pg_min <= params.tolerance {
            converged = true;
            break;
        }
    }

    (
        w,
        ConvergenceInfo {
            iterations,
            converged,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["huur".to_string(), "verzekering".to_string(), "overig".to_string()]
    }

    fn toy() -> (Vec<SparseVector>, Vec<usize>) {
        let samples = vec![
            SparseVector::from_pairs(vec![(0, 1.0)]),
            SparseVector::from_pairs(vec![(0, 0.8), (3, 0.6)]),
            SparseVector::from_pairs(vec![(1, 1.0)]),
            SparseVector::from_pairs(vec![(1, 0.6), (3, 0.8)]),
            SparseVector::from_pairs(vec![(2, 1.0)]),
        ];
        (samples, vec![0, 0, 1, 1, 2])
    }

    #[test]
    fn test_separates_training_data() {
        let (samples, targets) = toy();
        let svm = LinearSvm::fit(&samples, &targets, labels(), 4, &SvmParams::default()).unwrap();

        for (sample, &target) in samples.iter().zip(&targets) {
            let margins = svm.decision_function(sample);
            let best = margins
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap();
            assert_eq!(best, target);
        }
        assert!(svm.convergence().iter().all(|c| c.converged));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (samples, targets) = toy();
        let params = SvmParams::default();
        let a = LinearSvm::fit(&samples, &targets, labels(), 4, &params).unwrap();
        let b = LinearSvm::fit(&samples, &targets, labels(), 4, &params).unwrap();

        let query = SparseVector::from_pairs(vec![(0, 0.5), (1, 0.5)]);
        assert_eq!(a.decision_function(&query), b.decision_function(&query));
    }

    #[test]
    fn test_balanced_class_weights() {
        let weights = balanced_class_weights(&[0, 0, 0, 1], 3);
        assert!((weights[0] - 4.0 / 9.0).abs() < 1e-12);
        assert!((weights[1] - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(weights[2], 0.0);
    }

    #[test]
    fn test_single_class_rejected() {
        let samples = vec![SparseVector::from_pairs(vec![(0, 1.0)])];
        let err = LinearSvm::fit(&samples, &[0], vec!["huur".to_string()], 1, &SvmParams::default())
            .unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_empty_sample_scores_bias_only() {
        let (samples, targets) = toy();
        let svm = LinearSvm::fit(&samples, &targets, labels(), 4, &SvmParams::default()).unwrap();

        let margins = svm.decision_function(&SparseVector::default());
        for (label, margin) in margins.iter().enumerate() {
            let (_, bias) = svm.coefficients(label).unwrap();
            assert_eq!(*margin, bias);
        }
    }
}
