//! Offline trust-weight optimizer.
//!
//! Converts per-topic, per-strategy accuracy into weights that sum to one
//! for every topic, and persists them as a JSON artifact.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SageError;

/// topic -> strategy -> accuracy in [0, 1]
pub type PerformanceTable = BTreeMap<String, BTreeMap<String, f64>>;

/// topic -> strategy -> normalized weight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonerWeights(BTreeMap<String, BTreeMap<String, f64>>);

impl ReasonerWeights {
    pub fn get(&self, topic: &str, strategy: &str) -> Option<f64> {
        self.0.get(topic).and_then(|s| s.get(strategy)).copied()
    }

    pub fn topic(&self, topic: &str) -> Option<&BTreeMap<String, f64>> {
        self.0.get(topic)
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, f64>)> {
        self.0.iter()
    }
}

/// Normalize accuracies into per-topic weights.
///
/// A topic whose accuracies sum to exactly zero gets uniform weights.
/// Every topic needs at least one strategy, and every accuracy must lie
/// in [0, 1].
pub fn optimize_weights(performance: &PerformanceTable) -> Result<ReasonerWeights, SageError> {
    info!("Optimizing reasoner weights for {} topics", performance.len());

    let mut weights = BTreeMap::new();
    for (topic, accuracies) in performance {
        if accuracies.is_empty() {
            return Err(SageError::InvalidPerformance(format!(
                "{} has no strategies",
                topic
            )));
        }
        if let Some((strategy, acc)) = accuracies
            .iter()
            .find(|(_, acc)| !(0.0..=1.0).contains(*acc))
        {
            return Err(SageError::InvalidPerformance(format!(
                "{}/{} has accuracy {}",
                topic, strategy, acc
            )));
        }

        let total: f64 = accuracies.values().sum();
        let normalized: BTreeMap<String, f64> = if total == 0.0 {
            let uniform = 1.0 / accuracies.len() as f64;
            accuracies.keys().map(|s| (s.clone(), uniform)).collect()
        } else {
            accuracies
                .iter()
                .map(|(s, acc)| (s.clone(), acc / total))
                .collect()
        };
        weights.insert(topic.clone(), normalized);
    }

    info!("Weight optimization complete");
    Ok(ReasonerWeights(weights))
}

/// Persisted optimizer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsArtifact {
    pub generated_at: DateTime<Utc>,
    pub weights: ReasonerWeights,
}

impl WeightsArtifact {
    pub fn new(weights: ReasonerWeights) -> Self {
        Self {
            generated_at: Utc::now(),
            weights,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved weights artifact to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SageError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
