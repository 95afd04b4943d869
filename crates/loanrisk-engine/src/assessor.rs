use std::sync::Arc;

use loanrisk_core::{
    assess_probability, build_feature_vector, ApplicantInput, ApplicantProfile, AssessmentError,
};
use loanrisk_model::{ClassifierProvider, PredictionRequest};
use tracing::{debug, error, warn};

use crate::report::{ApplicantMetrics, RiskReport};

/// Runs one assessment per call: derive, encode, classify, score.
///
/// Holds no per-request state, so a single assessor can serve concurrent
/// callers.
#[derive(Clone)]
pub struct RiskAssessor {
    classifier: Arc<dyn ClassifierProvider>,
}

impl RiskAssessor {
    pub fn new(classifier: Arc<dyn ClassifierProvider>) -> Self {
        Self { classifier }
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub async fn assess_input(&self, input: ApplicantInput) -> Result<RiskReport, AssessmentError> {
        let profile = input.into_profile()?;
        self.assess(&profile).await
    }

    pub async fn assess(&self, profile: &ApplicantProfile) -> Result<RiskReport, AssessmentError> {
        let (features, vector) = build_feature_vector(profile)?;
        debug!(
            classifier = self.classifier.name(),
            schema = %vector.schema,
            loan_to_income = features.loan_to_income_ratio,
            emi_to_income = features.emi_to_income_ratio,
            "invoking classifier"
        );

        let prediction = self
            .classifier
            .predict(PredictionRequest::new(vector))
            .await
            .map_err(|err| {
                let err = AssessmentError::from(err);
                match &err {
                    AssessmentError::InvalidFeatureVector(msg) => error!(
                        classifier = self.classifier.name(),
                        reason = %msg,
                        "classifier rejected feature vector"
                    ),
                    other => warn!(
                        classifier = self.classifier.name(),
                        error = %other,
                        "classifier call failed"
                    ),
                }
                err
            })?;

        let assessment = assess_probability(prediction.probability).map_err(|err| {
            error!(
                provider = %prediction.provider,
                model = %prediction.model,
                probability = prediction.probability,
                "classifier returned an out-of-range probability"
            );
            err
        })?;

        debug!(
            score = assessment.credit_score,
            band = %assessment.band,
            grade = %assessment.grade,
            "assessment complete"
        );

        Ok(RiskReport {
            assessment,
            applicant: ApplicantMetrics::from_parts(profile, features),
            provider: prediction.provider,
            model: prediction.model,
        })
    }
}
