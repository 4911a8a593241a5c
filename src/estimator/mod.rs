//! Weight Estimation
//!
//! Predicts an item's weight from its dimensions and a density factor. A
//! configured [`WeightPredictor`] is asked first; whenever it is missing or
//! fails, the closed-form fallback `l × w × h × density × 0.001` is used, so
//! estimation itself never fails.

pub mod command;

pub use command::CommandPredictor;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Density factor used when a caller does not provide one
pub const DEFAULT_DENSITY_FACTOR: f64 = 0.85;

/// Scale of the fallback formula
const FALLBACK_SCALE: f64 = 0.001;

/// Model input: `[length, width, height, density_factor]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightFeatures {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub density_factor: f64,
}

impl WeightFeatures {
    pub fn new(length: f64, width: f64, height: f64, density_factor: f64) -> Self {
        Self {
            length,
            width,
            height,
            density_factor,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.length, self.width, self.height, self.density_factor]
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

impl From<[f64; 4]> for WeightFeatures {
    fn from([length, width, height, density_factor]: [f64; 4]) -> Self {
        Self::new(length, width, height, density_factor)
    }
}

/// Deterministic volume × density estimate
pub fn fallback_weight(features: &WeightFeatures) -> f64 {
    features.volume() * features.density_factor * FALLBACK_SCALE
}

/// A model able to predict weights. Implementations may fail freely.
#[async_trait]
pub trait WeightPredictor: Send + Sync {
    fn name(&self) -> &str;

    async fn predict(&self, features: &WeightFeatures) -> Result<f64>;
}

/// Where an estimate came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightEstimate {
    pub weight: f64,
    pub source: WeightSource,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimatorStatus {
    /// "model" when a predictor is configured, otherwise "fallback"
    pub mode: String,
    pub predictor: Option<String>,
}

/// Predictor with a guaranteed fallback
#[derive(Clone, Default)]
pub struct WeightEstimator {
    predictor: Option<Arc<dyn WeightPredictor>>,
}

impl WeightEstimator {
    /// Estimator that only uses the fallback formula
    pub fn fallback_only() -> Self {
        Self { predictor: None }
    }

    pub fn with_predictor(predictor: Arc<dyn WeightPredictor>) -> Self {
        Self {
            predictor: Some(predictor),
        }
    }

    pub fn status(&self) -> EstimatorStatus {
        match &self.predictor {
            Some(p) => EstimatorStatus {
                mode: "model".to_string(),
                predictor: Some(p.name().to_string()),
            },
            None => EstimatorStatus {
                mode: "fallback".to_string(),
                predictor: None,
            },
        }
    }

    pub async fn estimate(&self, features: &WeightFeatures) -> WeightEstimate {
        if let Some(predictor) = &self.predictor {
            match predictor.predict(features).await {
                Ok(weight) if weight.is_finite() && weight >= 0.0 => {
                    debug!(predictor = predictor.name(), weight, "Weight predicted by model");
                    return WeightEstimate {
                        weight,
                        source: WeightSource::Model,
                    };
                }
                Ok(weight) => {
                    warn!(predictor = predictor.name(), weight, "Model returned an unusable weight");
                }
                Err(e) => {
                    warn!(predictor = predictor.name(), "Failed to predict weight: {:#}", e);
                }
            }
        }

        let weight = fallback_weight(features);
        debug!(weight, ?features, "Using fallback weight calculation");
        WeightEstimate {
            weight,
            source: WeightSource::Fallback,
        }
    }

    /// `predict_weight([length, width, height, density_factor])`
    pub async fn predict_weight(&self, features: [f64; 4]) -> f64 {
        self.estimate(&WeightFeatures::from(features)).await.weight
    }
}
