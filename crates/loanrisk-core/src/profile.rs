//! Applicant data model and boundary validation.
//!
//! Callers hand over an [`ApplicantInput`] (free-form categorical strings,
//! signed integers) and get back a validated [`ApplicantProfile`] whose
//! categorical fields are closed enums. Everything downstream of this module
//! assumes a profile that passed [`ApplicantProfile::validate`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 100;
pub const MIN_TENURE_MONTHS: u32 = 1;
pub const MAX_TENURE_MONTHS: u32 = 360;
pub const MAX_OPEN_ACCOUNTS: u32 = 10;
pub const MAX_PERCENTAGE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResidenceType {
    Owned,
    Rented,
    Mortgage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanPurpose {
    Education,
    Home,
    Auto,
    Personal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanType {
    Unsecured,
    Secured,
}

impl ResidenceType {
    pub const ALL: [Self; 3] = [Self::Owned, Self::Rented, Self::Mortgage];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owned => "Owned",
            Self::Rented => "Rented",
            Self::Mortgage => "Mortgage",
        }
    }
}

impl LoanPurpose {
    pub const ALL: [Self; 4] = [Self::Education, Self::Home, Self::Auto, Self::Personal];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Education => "Education",
            Self::Home => "Home",
            Self::Auto => "Auto",
            Self::Personal => "Personal",
        }
    }
}

impl LoanType {
    pub const ALL: [Self; 2] = [Self::Unsecured, Self::Secured];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsecured => "Unsecured",
            Self::Secured => "Secured",
        }
    }
}

/// Case-insensitive lookup of `raw` among the labels of `variants`.
fn parse_variant<T: Copy>(
    field: &'static str,
    raw: &str,
    variants: &[T],
    label: fn(T) -> &'static str,
) -> Result<T, AssessmentError> {
    let wanted = raw.trim();
    variants
        .iter()
        .copied()
        .find(|v| label(*v).eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            let allowed = variants
                .iter()
                .map(|v| label(*v))
                .collect::<Vec<_>>()
                .join(", ");
            AssessmentError::invalid_input(
                field,
                format!("unknown value `{wanted}`, expected one of: {allowed}"),
            )
        })
}

impl FromStr for ResidenceType {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("residence_type", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for LoanPurpose {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("loan_purpose", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for LoanType {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("loan_type", s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for ResidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LoanPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated applicant, immutable for the lifetime of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub age: u32,
    pub annual_income: f64,
    pub residence_type: ResidenceType,
    pub loan_amount: f64,
    pub loan_tenure_months: u32,
    pub loan_purpose: LoanPurpose,
    pub loan_type: LoanType,
    pub avg_days_past_due: f64,
    pub delinquency_ratio: f64,
    pub credit_utilization_ratio: f64,
    pub num_open_accounts: u32,
}

impl ApplicantProfile {
    pub fn validate(&self) -> Result<(), AssessmentError> {
        check_int("age", self.age, MIN_AGE, MAX_AGE)?;
        check_non_negative("annual_income", self.annual_income)?;
        check_non_negative("loan_amount", self.loan_amount)?;
        check_int(
            "loan_tenure_months",
            self.loan_tenure_months,
            MIN_TENURE_MONTHS,
            MAX_TENURE_MONTHS,
        )?;
        check_non_negative("avg_days_past_due", self.avg_days_past_due)?;
        check_percentage("delinquency_ratio", self.delinquency_ratio)?;
        check_percentage("credit_utilization_ratio", self.credit_utilization_ratio)?;
        check_int("num_open_accounts", self.num_open_accounts, 0, MAX_OPEN_ACCOUNTS)?;
        Ok(())
    }
}

/// Raw applicant fields as an external collaborator submits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantInput {
    pub age: i64,
    pub annual_income: f64,
    pub residence_type: String,
    pub loan_amount: f64,
    pub loan_tenure_months: i64,
    pub loan_purpose: String,
    pub loan_type: String,
    pub avg_days_past_due: f64,
    pub delinquency_ratio: f64,
    pub credit_utilization_ratio: f64,
    pub num_open_accounts: i64,
}

impl ApplicantInput {
    pub fn into_profile(self) -> Result<ApplicantProfile, AssessmentError> {
        let profile = ApplicantProfile {
            age: to_u32("age", self.age)?,
            annual_income: self.annual_income,
            residence_type: self.residence_type.parse()?,
            loan_amount: self.loan_amount,
            loan_tenure_months: to_u32("loan_tenure_months", self.loan_tenure_months)?,
            loan_purpose: self.loan_purpose.parse()?,
            loan_type: self.loan_type.parse()?,
            avg_days_past_due: self.avg_days_past_due,
            delinquency_ratio: self.delinquency_ratio,
            credit_utilization_ratio: self.credit_utilization_ratio,
            num_open_accounts: to_u32("num_open_accounts", self.num_open_accounts)?,
        };
        profile.validate()?;
        Ok(profile)
    }
}

impl TryFrom<ApplicantInput> for ApplicantProfile {
    type Error = AssessmentError;

    fn try_from(input: ApplicantInput) -> Result<Self, Self::Error> {
        input.into_profile()
    }
}

fn to_u32(field: &'static str, value: i64) -> Result<u32, AssessmentError> {
    u32::try_from(value)
        .map_err(|_| AssessmentError::invalid_input(field, format!("{value} is out of range")))
}

fn check_int(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), AssessmentError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(AssessmentError::invalid_input(
            field,
            format!("{value} is outside {min}..={max}"),
        ))
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), AssessmentError> {
    if !value.is_finite() {
        return Err(AssessmentError::invalid_input(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(AssessmentError::invalid_input(
            field,
            format!("{value} must not be negative"),
        ));
    }
    Ok(())
}

fn check_percentage(field: &'static str, value: f64) -> Result<(), AssessmentError> {
    check_non_negative(field, value)?;
    if value > MAX_PERCENTAGE {
        return Err(AssessmentError::invalid_input(
            field,
            format!("{value} exceeds {MAX_PERCENTAGE}%"),
        ));
    }
    Ok(())
}
