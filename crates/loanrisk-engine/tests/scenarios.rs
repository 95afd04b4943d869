use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use loanrisk_engine::{
    ApplicantInput, ClassifierProvider, CreditGrade, PredictionRequest, PredictionResponse,
    ProviderError, RiskAssessor, RiskBand,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    applicant: ApplicantInput,
    probability: f64,
    expected: Option<Expected>,
    expected_error: Option<String>,
    expected_loan_to_income: Option<f64>,
    expected_emi_to_income: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Expected {
    band: RiskBand,
    credit_score: u16,
    grade: CreditGrade,
}

/// Returns whatever probability the case dictates.
struct ScriptedClassifier(f64);

#[async_trait]
impl ClassifierProvider for ScriptedClassifier {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn predict(
        &self,
        _request: PredictionRequest,
    ) -> Result<PredictionResponse, ProviderError> {
        Ok(PredictionResponse {
            provider: self.name().to_string(),
            model: "scripted".to_string(),
            probability: self.0,
        })
    }
}

fn load_cases() -> Vec<Case> {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let fixture = root
        .join("..")
        .join("..")
        .join("data")
        .join("scenarios")
        .join("assessment_cases.json");

    let content = fs::read_to_string(&fixture)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", fixture.display()));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", fixture.display()))
}

#[tokio::test]
async fn scenario_cases_pass() {
    let cases = load_cases();
    assert!(!cases.is_empty());

    for case in cases {
        let assessor = RiskAssessor::new(Arc::new(ScriptedClassifier(case.probability)));
        let result = assessor.assess_input(case.applicant).await;

        match (&case.expected, &case.expected_error) {
            (Some(expected), None) => {
                let report = result.unwrap_or_else(|e| panic!("case {} failed: {e}", case.name));
                let got = report.assessment;
                assert_eq!(got.band, expected.band, "case {} band", case.name);
                assert_eq!(
                    got.credit_score, expected.credit_score,
                    "case {} score",
                    case.name
                );
                assert_eq!(got.grade, expected.grade, "case {} grade", case.name);
                assert!((got.probability - case.probability).abs() < f64::EPSILON);

                if let Some(lti) = case.expected_loan_to_income {
                    let actual = report.applicant.features.loan_to_income_ratio;
                    assert!((actual - lti).abs() < 1e-3, "case {} lti={actual}", case.name);
                }
                if let Some(eti) = case.expected_emi_to_income {
                    let actual = report.applicant.features.emi_to_income_ratio;
                    assert!((actual - eti).abs() < 1e-3, "case {} eti={actual}", case.name);
                }
            }
            (None, Some(code)) => {
                let err = match result {
                    Ok(report) => panic!("case {} should fail, got {report:?}", case.name),
                    Err(err) => err,
                };
                assert_eq!(err.code(), code, "case {} error code", case.name);
            }
            _ => panic!("case {} must set exactly one of expected/expected_error", case.name),
        }
    }
}
