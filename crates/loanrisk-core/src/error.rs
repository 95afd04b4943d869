use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    /// A field is outside its documented domain. Never retried.
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The classifier could not be reached, is not configured, or timed out.
    #[error("classifier unavailable: {0}")]
    ModelUnavailable(String),

    /// The classifier rejected the encoded vector (schema/version mismatch).
    #[error("classifier rejected feature vector: {0}")]
    InvalidFeatureVector(String),
}

impl AssessmentError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used by the tool surface.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::InvalidFeatureVector(_) => "invalid_feature_vector",
        }
    }
}
