use loanrisk_core::{
    derive_features, ApplicantProfile, AssessmentError, DerivedFeatures, QuickMetrics,
    RiskAssessment, RiskFactorProfile,
};
use serde::Serialize;

/// Everything that can be said about an applicant without a classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantMetrics {
    pub features: DerivedFeatures,
    pub metrics: QuickMetrics,
    pub factors: RiskFactorProfile,
}

impl ApplicantMetrics {
    pub fn from_parts(profile: &ApplicantProfile, features: DerivedFeatures) -> Self {
        Self {
            metrics: QuickMetrics::from_derived(&features),
            factors: RiskFactorProfile::compute(profile, &features),
            features,
        }
    }
}

pub fn applicant_metrics(profile: &ApplicantProfile) -> Result<ApplicantMetrics, AssessmentError> {
    let features = derive_features(profile)?;
    Ok(ApplicantMetrics::from_parts(profile, features))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub assessment: RiskAssessment,
    #[serde(flatten)]
    pub applicant: ApplicantMetrics,
    pub provider: String,
    pub model: String,
}
