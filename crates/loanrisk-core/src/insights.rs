//! Descriptive metrics shown next to an assessment.
//!
//! None of these feed the classifier; they summarize the applicant for a
//! human reviewer.

use serde::{Deserialize, Serialize};

use crate::features::DerivedFeatures;
use crate::profile::ApplicantProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanToIncomeLevel {
    LowRisk,
    Acceptable,
    HighRisk,
}

impl LoanToIncomeLevel {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 5.0 {
            Self::HighRisk
        } else if ratio > 3.0 {
            Self::Acceptable
        } else {
            Self::LowRisk
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmiBurden {
    Manageable,
    High,
}

impl EmiBurden {
    /// `emi_to_income_ratio` is a percentage.
    pub fn from_ratio(emi_to_income_ratio: f64) -> Self {
        if emi_to_income_ratio > 50.0 {
            Self::High
        } else {
            Self::Manageable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuickMetrics {
    pub loan_to_income_ratio: f64,
    pub loan_to_income_level: LoanToIncomeLevel,
    pub monthly_income: f64,
    pub emi_to_income_ratio: f64,
    pub emi_burden: EmiBurden,
}

impl QuickMetrics {
    pub fn from_derived(derived: &DerivedFeatures) -> Self {
        Self {
            loan_to_income_ratio: derived.loan_to_income_ratio,
            loan_to_income_level: LoanToIncomeLevel::from_ratio(derived.loan_to_income_ratio),
            monthly_income: derived.monthly_income,
            emi_to_income_ratio: derived.emi_to_income_ratio,
            emi_burden: EmiBurden::from_ratio(derived.emi_to_income_ratio),
        }
    }
}

/// Five 0..=100 health factors, higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorProfile {
    pub credit_history: f64,
    pub income_stability: f64,
    pub debt_burden: f64,
    pub credit_utilization: f64,
    pub account_management: f64,
}

impl RiskFactorProfile {
    pub fn compute(profile: &ApplicantProfile, derived: &DerivedFeatures) -> Self {
        let account_management = if profile.num_open_accounts <= 5 {
            f64::from(5 - profile.num_open_accounts) * 20.0
        } else {
            0.0
        };

        Self {
            credit_history: clamp_factor(
                100.0 - (profile.delinquency_ratio + profile.avg_days_past_due / 2.0),
            ),
            income_stability: clamp_factor(profile.annual_income / 1_000_000.0 * 50.0),
            debt_burden: clamp_factor(100.0 - derived.loan_to_income_ratio * 20.0),
            credit_utilization: clamp_factor(100.0 - profile.credit_utilization_ratio),
            account_management: clamp_factor(account_management),
        }
    }

    pub fn as_pairs(&self) -> [(&'static str, f64); 5] {
        [
            ("credit_history", self.credit_history),
            ("income_stability", self.income_stability),
            ("debt_burden", self.debt_burden),
            ("credit_utilization", self.credit_utilization),
            ("account_management", self.account_management),
        ]
    }
}

fn clamp_factor(x: f64) -> f64 {
    x.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_features;
    use crate::profile::{LoanPurpose, LoanType, ResidenceType};

    fn sample() -> ApplicantProfile {
        ApplicantProfile {
            age: 28,
            annual_income: 1_200_000.0,
            residence_type: ResidenceType::Owned,
            loan_amount: 2_560_000.0,
            loan_tenure_months: 36,
            loan_purpose: LoanPurpose::Home,
            loan_type: LoanType::Secured,
            avg_days_past_due: 20.0,
            delinquency_ratio: 30.0,
            credit_utilization_ratio: 30.0,
            num_open_accounts: 2,
        }
    }

    #[test]
    fn loan_to_income_levels() {
        assert_eq!(LoanToIncomeLevel::from_ratio(2.13), LoanToIncomeLevel::LowRisk);
        assert_eq!(LoanToIncomeLevel::from_ratio(3.0), LoanToIncomeLevel::LowRisk);
        assert_eq!(LoanToIncomeLevel::from_ratio(3.5), LoanToIncomeLevel::Acceptable);
        assert_eq!(LoanToIncomeLevel::from_ratio(5.01), LoanToIncomeLevel::HighRisk);
    }

    #[test]
    fn emi_burden_threshold() {
        assert_eq!(EmiBurden::from_ratio(50.0), EmiBurden::Manageable);
        assert_eq!(EmiBurden::from_ratio(50.5), EmiBurden::High);
    }

    #[test]
    fn reference_applicant_factors() {
        let profile = sample();
        let derived = derive_features(&profile).expect("derive");
        let factors = RiskFactorProfile::compute(&profile, &derived);

        assert!((factors.credit_history - 60.0).abs() < 1e-9);
        assert!((factors.income_stability - 60.0).abs() < 1e-9);
        assert!((factors.debt_burden - 57.333_333).abs() < 1e-3);
        assert!((factors.credit_utilization - 70.0).abs() < 1e-9);
        assert!((factors.account_management - 60.0).abs() < 1e-9);
    }

    #[test]
    fn factors_are_clamped() {
        let mut profile = sample();
        profile.delinquency_ratio = 100.0;
        profile.avg_days_past_due = 90.0;
        profile.annual_income = 10_000_000.0;
        profile.loan_amount = 0.0;
        profile.num_open_accounts = 8;
        let derived = derive_features(&profile).expect("derive");
        let factors = RiskFactorProfile::compute(&profile, &derived);

        assert_eq!(factors.credit_history, 0.0);
        assert_eq!(factors.income_stability, 100.0);
        assert_eq!(factors.debt_burden, 100.0);
        assert_eq!(factors.account_management, 0.0);
        for (name, value) in factors.as_pairs() {
            assert!((0.0..=100.0).contains(&value), "{name} out of range");
        }
    }
}
