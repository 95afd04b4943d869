use std::sync::Arc;

use crate::config::ClassifierProviderConfig;
use crate::error::ProviderError;
use crate::providers::{HttpClassifierProvider, LogisticClassifierProvider};
use crate::traits::ClassifierProvider;

pub fn build_classifier_provider(
    cfg: ClassifierProviderConfig,
) -> Result<Arc<dyn ClassifierProvider>, ProviderError> {
    match cfg {
        ClassifierProviderConfig::Logistic(c) => Ok(Arc::new(LogisticClassifierProvider::new(c)?)),
        ClassifierProviderConfig::Http(c) => Ok(Arc::new(HttpClassifierProvider::new(c)?)),
    }
}
