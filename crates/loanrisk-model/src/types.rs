use loanrisk_core::FeatureVector;

#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub features: FeatureVector,
}

impl PredictionRequest {
    pub const fn new(features: FeatureVector) -> Self {
        Self { features }
    }
}

/// Raw classifier output. `probability` is unchecked until it reaches the scorer.
#[derive(Debug, Clone)]
pub struct PredictionResponse {
    pub provider: String,
    pub model: String,
    pub probability: f64,
}
