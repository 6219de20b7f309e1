//! Machine learning building blocks for tag recommendation.
//!
//! - [`features`] turns a transaction into a bag of terms.
//! - [`tfidf`] weighs those terms into sparse vectors.
//! - [`linear_svm`] fits one linear classifier per tag.
//! - [`confidence`] maps margins into `[0, 1]` and ranks them.
//! - [`keyword_classifier`] and [`counterparty`] are the fallbacks used when
//!   the classifier is not confident.
//! - [`model`] bundles all of the above into one serializable model.

pub mod confidence;
pub mod counterparty;
pub mod features;
pub mod keyword_classifier;
pub mod linear_svm;
pub mod model;
pub mod tfidf;
