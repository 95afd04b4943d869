//! Feature derivation and classifier encoding.
//!
//! The encoding is versioned by [`FEATURE_SCHEMA`]. Any change to the order,
//! the baselines of the one-hot groups, or the derived ratios needs a new
//! schema tag so classifiers trained on the old layout reject the vector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;
use crate::profile::{ApplicantProfile, LoanPurpose, LoanType, ResidenceType};

pub const FEATURE_SCHEMA: &str = "loan-risk/v1";

/// Flat monthly installment rate applied to the principal.
///
/// This is an approximation, not an amortization schedule.
pub const EMI_MONTHLY_RATE: f64 = 0.01;

pub const FEATURE_NAMES: [&str; 14] = [
    "age",
    "loan_tenure_months",
    "num_open_accounts",
    "credit_utilization_ratio",
    "loan_to_income_ratio",
    "delinquency_ratio",
    "avg_days_past_due",
    "emi_to_income_ratio",
    "residence_type_owned",
    "residence_type_rented",
    "loan_purpose_education",
    "loan_purpose_home",
    "loan_purpose_personal",
    "loan_type_unsecured",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// One-hot columns. The omitted variant of each group is its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoding {
    pub residence_type_owned: bool,
    pub residence_type_rented: bool,
    pub loan_purpose_education: bool,
    pub loan_purpose_home: bool,
    pub loan_purpose_personal: bool,
    pub loan_type_unsecured: bool,
}

impl CategoricalEncoding {
    pub fn new(residence: ResidenceType, purpose: LoanPurpose, loan_type: LoanType) -> Self {
        Self {
            residence_type_owned: residence == ResidenceType::Owned,
            residence_type_rented: residence == ResidenceType::Rented,
            loan_purpose_education: purpose == LoanPurpose::Education,
            loan_purpose_home: purpose == LoanPurpose::Home,
            loan_purpose_personal: purpose == LoanPurpose::Personal,
            loan_type_unsecured: loan_type == LoanType::Unsecured,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub loan_to_income_ratio: f64,
    pub monthly_income: f64,
    pub estimated_emi: f64,
    /// Percentage of monthly income consumed by the estimated installment.
    pub emi_to_income_ratio: f64,
    pub categorical: CategoricalEncoding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub schema: String,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let pos = FEATURE_NAMES.iter().position(|n| *n == name)?;
        self.values.get(pos).copied()
    }

    /// Named view for classifiers that take features by column name.
    pub fn named(&self) -> BTreeMap<&'static str, f64> {
        FEATURE_NAMES
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect()
    }
}

/// Computes the ratios the classifier consumes. Zero income gives zero ratios.
pub fn derive_features(profile: &ApplicantProfile) -> Result<DerivedFeatures, AssessmentError> {
    profile.validate()?;

    let loan_to_income_ratio = if profile.annual_income > 0.0 {
        profile.loan_amount / profile.annual_income
    } else {
        0.0
    };
    let monthly_income = profile.annual_income / 12.0;
    let estimated_emi = profile.loan_amount * EMI_MONTHLY_RATE;
    let emi_to_income_ratio = if monthly_income > 0.0 {
        (estimated_emi / monthly_income) * 100.0
    } else {
        0.0
    };
    if !(loan_to_income_ratio.is_finite() && emi_to_income_ratio.is_finite()) {
        return Err(AssessmentError::invalid_input(
            "annual_income",
            "too small relative to loan_amount; income ratios overflow",
        ));
    }

    Ok(DerivedFeatures {
        loan_to_income_ratio,
        monthly_income,
        estimated_emi,
        emi_to_income_ratio,
        categorical: CategoricalEncoding::new(
            profile.residence_type,
            profile.loan_purpose,
            profile.loan_type,
        ),
    })
}

/// Lays out `profile` and `derived` in [`FEATURE_NAMES`] order.
pub fn encode(profile: &ApplicantProfile, derived: &DerivedFeatures) -> FeatureVector {
    let flag = |on: bool| if on { 1.0 } else { 0.0 };
    let cat = &derived.categorical;
    let values = vec![
        f64::from(profile.age),
        f64::from(profile.loan_tenure_months),
        f64::from(profile.num_open_accounts),
        profile.credit_utilization_ratio,
        derived.loan_to_income_ratio,
        profile.delinquency_ratio,
        profile.avg_days_past_due,
        derived.emi_to_income_ratio,
        flag(cat.residence_type_owned),
        flag(cat.residence_type_rented),
        flag(cat.loan_purpose_education),
        flag(cat.loan_purpose_home),
        flag(cat.loan_purpose_personal),
        flag(cat.loan_type_unsecured),
    ];

    FeatureVector {
        schema: FEATURE_SCHEMA.to_string(),
        values,
    }
}

/// Derive then encode in one step.
pub fn build_feature_vector(
    profile: &ApplicantProfile,
) -> Result<(DerivedFeatures, FeatureVector), AssessmentError> {
    let derived = derive_features(profile)?;
    let vector = encode(profile, &derived);
    Ok((derived, vector))
}
