use std::path::Path;
use std::time::Duration;

use loanrisk_core::{FEATURE_COUNT, FEATURE_SCHEMA};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureScale {
    pub min: f64,
    pub max: f64,
}

/// Parameters of an already-trained logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_model_name")]
    pub model: String,
    pub intercept: f64,
    pub weights: Vec<f64>,
    /// Optional min-max scaling applied per feature before the dot product.
    #[serde(default)]
    pub scaling: Option<Vec<FeatureScale>>,
}

fn default_schema() -> String {
    FEATURE_SCHEMA.to_string()
}

fn default_model_name() -> String {
    "logistic".to_string()
}

impl LogisticModel {
    pub fn from_json(raw: &str) -> Result<Self, ProviderError> {
        let model: Self = serde_json::from_str(raw)?;
        model.check()?;
        Ok(model)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn check(&self) -> Result<(), ProviderError> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(ProviderError::Config(format!(
                "logistic model has {} weights, expected {FEATURE_COUNT}",
                self.weights.len()
            )));
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ProviderError::Config(
                "logistic model parameters must be finite".to_string(),
            ));
        }
        if let Some(scaling) = &self.scaling {
            if scaling.len() != FEATURE_COUNT {
                return Err(ProviderError::Config(format!(
                    "logistic model has {} scaling entries, expected {FEATURE_COUNT}",
                    scaling.len()
                )));
            }
            if scaling
                .iter()
                .any(|s| !s.min.is_finite() || !s.max.is_finite() || s.max < s.min)
            {
                return Err(ProviderError::Config(
                    "logistic model scaling bounds must be finite with min <= max".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LogisticConfig {
    pub model: LogisticModel,
}

impl LogisticConfig {
    pub const fn new(model: LogisticModel) -> Self {
        Self { model }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        Ok(Self::new(LogisticModel::from_path(path)?))
    }
}

#[derive(Debug, Clone)]
pub struct HttpClassifierConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout: Duration,
}

impl HttpClassifierConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: None,
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClassifierProviderConfig {
    Logistic(LogisticConfig),
    Http(HttpClassifierConfig),
}
