use loanrisk_core::FeatureVector;
use tracing::warn;

use crate::config::{LogisticConfig, LogisticModel};
use crate::error::ProviderError;
use crate::traits::ClassifierProvider;
use crate::types::{PredictionRequest, PredictionResponse};

/// In-process logistic regression over the encoded feature vector.
#[derive(Debug, Clone)]
pub struct LogisticClassifierProvider {
    model: LogisticModel,
}

impl LogisticClassifierProvider {
    pub fn new(config: LogisticConfig) -> Result<Self, ProviderError> {
        config.model.check()?;
        Ok(Self {
            model: config.model,
        })
    }

    fn check_vector(&self, features: &FeatureVector) -> Result<(), ProviderError> {
        if features.schema != self.model.schema {
            return Err(ProviderError::RejectedFeatures(format!(
                "schema `{}` does not match model schema `{}`",
                features.schema, self.model.schema
            )));
        }
        if features.len() != self.model.weights.len() {
            return Err(ProviderError::RejectedFeatures(format!(
                "expected {} features, got {}",
                self.model.weights.len(),
                features.len()
            )));
        }
        if features.values.iter().any(|v| !v.is_finite()) {
            return Err(ProviderError::RejectedFeatures(
                "feature vector contains non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    fn linear_term(&self, features: &FeatureVector) -> f64 {
        let dot: f64 = match &self.model.scaling {
            Some(scaling) => features
                .values
                .iter()
                .zip(scaling)
                .zip(&self.model.weights)
                .map(|((x, s), w)| w * min_max(*x, s.min, s.max))
                .sum(),
            None => features
                .values
                .iter()
                .zip(&self.model.weights)
                .map(|(x, w)| w * x)
                .sum(),
        };
        self.model.intercept + dot
    }
}

fn min_max(x: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 { (x - min) / span } else { 0.0 }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[async_trait::async_trait]
impl ClassifierProvider for LogisticClassifierProvider {
    fn name(&self) -> &'static str {
        "logistic"
    }

    async fn predict(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionResponse, ProviderError> {
        if let Err(err) = self.check_vector(&request.features) {
            warn!(model = %self.model.model, error = %err, "logistic model rejected features");
            return Err(err);
        }

        let probability = sigmoid(self.linear_term(&request.features));
        Ok(PredictionResponse {
            provider: self.name().to_string(),
            model: self.model.model.clone(),
            probability,
        })
    }
}
