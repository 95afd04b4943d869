use loanrisk_core::AssessmentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("classifier returned invalid response: {0}")]
    InvalidResponse(String),

    #[error("classifier API error: status={status}, body={body}")]
    Api { status: u16, body: String },

    #[error("feature vector rejected: {0}")]
    RejectedFeatures(String),
}

impl From<ProviderError> for AssessmentError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RejectedFeatures(msg) => Self::InvalidFeatureVector(msg),
            other => Self::ModelUnavailable(other.to_string()),
        }
    }
}
