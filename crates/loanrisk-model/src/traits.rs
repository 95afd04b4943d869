use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{PredictionRequest, PredictionResponse};

/// A trained binary classifier returning the probability of default.
#[async_trait]
pub trait ClassifierProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn predict(&self, request: PredictionRequest)
    -> Result<PredictionResponse, ProviderError>;
}
