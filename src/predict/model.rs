use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Model boundary
// ---------------------------------------------------------------------------

/// A pretrained scoring model, treated purely as a function over a
/// feature vector. Loaded once at process start; training and storage
/// format are the artifact's business, not the engine's.
pub trait Model {
    /// Number of features the model was trained on.
    fn n_features(&self) -> usize;

    /// Score a feature vector of exactly `n_features` values. Callers
    /// are responsible for the shape check (see the adapter).
    fn predict(&self, features: &[f64]) -> f64;
}

// ---------------------------------------------------------------------------
// JSON artifact
// ---------------------------------------------------------------------------

/// Serialized scoring function: per-feature weights plus an intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub n_features: usize,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

/// A [`Model`] backed by a JSON artifact on disk.
#[derive(Debug, Clone)]
pub struct ArtifactModel {
    artifact: ModelArtifact,
}

impl ArtifactModel {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        if artifact.weights.len() != artifact.n_features {
            bail!(
                "artifact {}: {} weights for {} declared features",
                artifact.name,
                artifact.weights.len(),
                artifact.n_features
            );
        }
        Ok(ArtifactModel { artifact })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading model artifact {}", path.display()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&text).context("parsing model artifact JSON")?;
        Self::from_artifact(artifact)
    }

    pub fn name(&self) -> &str {
        &self.artifact.name
    }
}

impl Model for ArtifactModel {
    fn n_features(&self) -> usize {
        self.artifact.n_features
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.artifact
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.artifact.intercept
    }
}
