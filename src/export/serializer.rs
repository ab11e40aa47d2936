//! Artifact serialization
//!
//! Any serde-serializable object (a fitted model, a fitted preprocessor) is
//! bincode-encoded and wrapped in an envelope carrying magic bytes, a format
//! version, metadata and an FNV-1a checksum of the payload.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, ScorecastError};

/// Descriptive data stored next to an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Artifact name (e.g. the winning candidate)
    pub name: String,
    /// Rust type or family of the stored object
    pub model_type: String,
    /// When the artifact was written
    pub created_at: DateTime<Utc>,
    /// Input feature names, if known
    pub feature_names: Vec<String>,
    /// Evaluation metrics
    pub metrics: BTreeMap<String, f64>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_type: "unknown".to_string(),
            created_at: Utc::now(),
            feature_names: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// Set model type
    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = model_type.into();
        self
    }

    /// Set feature names
    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.feature_names = features;
        self
    }

    /// Add metric
    pub fn add_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }
}

/// On-disk wrapper around the encoded object
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    format_version: u32,
    metadata: ModelMetadata,
    payload: Vec<u8>,
    checksum: u64,
}

impl Envelope {
    const MAGIC: [u8; 4] = *b"SCST";
    const VERSION: u32 = 1;

    fn new(metadata: ModelMetadata, payload: Vec<u8>) -> Self {
        let checksum = fnv1a(&payload);
        Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            metadata,
            payload,
            checksum,
        }
    }

    fn verify(&self) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(ScorecastError::SerializationError(
                "not a scorecast artifact (bad magic bytes)".to_string(),
            ));
        }
        if self.format_version != Self::VERSION {
            return Err(ScorecastError::SerializationError(format!(
                "unsupported artifact format version {}",
                self.format_version
            )));
        }
        if fnv1a(&self.payload) != self.checksum {
            return Err(ScorecastError::SerializationError(
                "checksum verification failed, file may be corrupted".to_string(),
            ));
        }
        Ok(())
    }
}

/// FNV-1a 64-bit hash
fn fnv1a(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    data.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ *byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Write `obj` to `path`, creating parent directories as needed
pub fn save_object<T: Serialize>(obj: &T, path: impl AsRef<Path>, metadata: ModelMetadata) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let payload = bincode::serialize(obj)?;
    let envelope = Envelope::new(metadata, payload);

    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &envelope)?;
    writer.flush()?;

    Ok(())
}

/// Read an object written by [`save_object`]
pub fn load_object<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    load_object_with_metadata(path).map(|(obj, _)| obj)
}

/// Read an object together with its metadata
pub fn load_object_with_metadata<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<(T, ModelMetadata)> {
    let envelope = read_envelope(path.as_ref())?;
    let obj = bincode::deserialize(&envelope.payload).map_err(|e| {
        ScorecastError::SerializationError(format!("failed to decode payload: {}", e))
    })?;
    Ok((obj, envelope.metadata))
}

/// Read only the metadata of an artifact
pub fn read_metadata(path: impl AsRef<Path>) -> Result<ModelMetadata> {
    read_envelope(path.as_ref()).map(|e| e.metadata)
}

fn read_envelope(path: &Path) -> Result<Envelope> {
    // Decoding from a slice bounds every length prefix by the file size
    let bytes = fs::read(path)?;
    let envelope: Envelope = bincode::deserialize(&bytes).map_err(|e| {
        ScorecastError::SerializationError(format!("failed to read {}: {}", path.display(), e))
    })?;
    envelope.verify()?;
    Ok(envelope)
}
