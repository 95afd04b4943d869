pub mod assessor;
pub mod report;

pub use assessor::*;
pub use loanrisk_core::*;
pub use loanrisk_model::{
    build_classifier_provider, ClassifierProvider, ClassifierProviderConfig, FeatureScale,
    HttpClassifierConfig, LogisticConfig, LogisticModel, PredictionRequest, PredictionResponse,
    ProviderError,
};
pub use report::*;
