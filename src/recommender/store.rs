//! On-disk model cache.
//!
//! A trained model is written as one bincode blob prefixed with a format
//! version and the corpus fingerprint, so a stale or foreign cache is detected
//! before it is used.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggerError};
use crate::ml::model::{Fingerprint, TrainedModel};

/// Version of the cache layout. Bump on any change to the serialized model.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format_version: u32,
    fingerprint: &'a Fingerprint,
    model: &'a TrainedModel,
}

#[derive(Deserialize)]
struct Envelope {
    format_version: u32,
    fingerprint: Fingerprint,
    model: TrainedModel,
}

/// A model cache file.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        ModelStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the model, replacing any previous cache atomically.
    pub fn save(&self, model: &TrainedModel) -> Result<()> {
        let bytes = bincode::serialize(&EnvelopeRef {
            format_version: MODEL_FORMAT_VERSION,
            fingerprint: model.fingerprint(),
            model,
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &bytes)?;
        fs::rename(&temp_path, &self.path)?;

        debug!(
            "saved model {} ({} bytes) to {}",
            model.fingerprint(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read the cached model, if there is one.
    pub fn load(&self) -> Result<Option<TrainedModel>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let version: u32 = bincode::deserialize(&bytes)?;
        if version != MODEL_FORMAT_VERSION {
            return Err(TaggerError::storage(format!(
                "model cache {} has format version {version}, expected {MODEL_FORMAT_VERSION}",
                self.path.display()
            )));
        }

        let envelope: Envelope = bincode::deserialize(&bytes)?;
        if envelope.format_version != version || &envelope.fingerprint != envelope.model.fingerprint() {
            return Err(TaggerError::storage(format!(
                "model cache {} is inconsistent",
                self.path.display()
            )));
        }
        Ok(Some(envelope.model))
    }

    /// Read the cached model only if it was trained on the given fingerprint.
    ///
    /// An unreadable cache is logged and treated as absent.
    pub fn load_matching(&self, fingerprint: &Fingerprint) -> Option<TrainedModel> {
        match self.load() {
            Ok(Some(model)) if model.fingerprint() == fingerprint => Some(model),
            Ok(Some(model)) => {
                debug!(
                    "model cache {} is stale ({} != {})",
                    self.path.display(),
                    model.fingerprint(),
                    fingerprint
                );
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!("ignoring model cache {}: {err}", self.path.display());
                None
            }
        }
    }
}
