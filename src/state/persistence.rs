use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::layer::Layer;
use crate::util::time;

/// Errors that can occur while encoding or decoding a snapshot
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid snapshot data: {0}")]
    Invalid(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// The document as handed to the persistence bridge. The storage format
/// is up to the bridge; JSON helpers are provided for convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub layers: Vec<Layer>,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
    pub version: String,
}

impl DocumentSnapshot {
    pub fn new(document: &Document) -> Self {
        Self {
            layers: document.layers().to_vec(),
            timestamp: time::timestamp_millis(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Rejects snapshots whose layers carry non-finite geometry.
    pub fn validate(&self) -> PersistenceResult<()> {
        if self.version != env!("CARGO_PKG_VERSION") {
            warn!(
                "Snapshot version {} differs from current version {}",
                self.version,
                env!("CARGO_PKG_VERSION")
            );
        }
        for layer in &self.layers {
            let values = [layer.x, layer.y, layer.rotation, layer.scale_x, layer.scale_y, layer.opacity];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(PersistenceError::Invalid(format!("layer {} has non-finite geometry", layer.id)));
            }
        }
        Ok(())
    }

    /// Builds a document, dropping duplicate ids and parent cycles.
    pub fn into_document(self) -> Document {
        Document::from_layers(self.layers)
    }
}
