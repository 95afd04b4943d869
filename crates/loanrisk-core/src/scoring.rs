use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

pub const MIN_SCORE: u16 = 300;
pub const MAX_SCORE: u16 = 850;

/// Upper bound (inclusive) of the probability range rated Low.
pub const LOW_RISK_CEILING: f64 = 0.05;
/// Upper bound (inclusive) of the probability range rated Medium.
pub const MEDIUM_RISK_CEILING: f64 = 0.15;

/// `(probability, score)` knots of the piecewise-linear score curve.
const SCORE_KNOTS: [(f64, f64); 4] = [
    (0.0, 850.0),
    (LOW_RISK_CEILING, 700.0),
    (MEDIUM_RISK_CEILING, 580.0),
    (1.0, 300.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Band for a probability already known to lie in `[0, 1]`.
    pub fn from_probability(probability: f64) -> Self {
        if probability <= LOW_RISK_CEILING {
            Self::Low
        } else if probability <= MEDIUM_RISK_CEILING {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub const fn from_score(score: u16) -> Self {
        if score >= 700 {
            Self::Low
        } else if score >= 580 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Inclusive score range owned by this band.
    pub const fn score_range(self) -> (u16, u16) {
        match self {
            Self::Low => (700, MAX_SCORE),
            Self::Medium => (580, 699),
            Self::High => (MIN_SCORE, 579),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CreditGrade {
    A,
    B,
    C,
    D,
    E,
}

impl CreditGrade {
    pub const fn from_score(score: u16) -> Self {
        if score >= 750 {
            Self::A
        } else if score >= 700 {
            Self::B
        } else if score >= 640 {
            Self::C
        } else if score >= 580 {
            Self::D
        } else {
            Self::E
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }
}

impl fmt::Display for CreditGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub probability: f64,
    pub credit_score: u16,
    pub band: RiskBand,
    pub grade: CreditGrade,
}

/// Rejects anything a well-behaved classifier cannot return. No clamping.
pub fn validate_probability(probability: f64) -> Result<f64, AssessmentError> {
    if !probability.is_finite() {
        return Err(AssessmentError::invalid_input(
            "probability",
            "must be a finite number",
        ));
    }
    if !(0.0..=1.0).contains(&probability) {
        return Err(AssessmentError::invalid_input(
            "probability",
            format!("{probability} is outside [0, 1]"),
        ));
    }
    Ok(probability)
}

/// Maps a default probability to a score in `[300, 850]`.
///
/// The curve interpolates linearly between [`SCORE_KNOTS`], so the band
/// thresholds land exactly on the band score boundaries (0.05 → 700,
/// 0.15 → 580). The rounded value is then held inside the band's score range
/// so `RiskBand::from_score(score)` agrees with `RiskBand::from_probability`.
pub fn credit_score(probability: f64) -> Result<u16, AssessmentError> {
    let p = validate_probability(probability)?;
    let (lo, hi) = RiskBand::from_probability(p).score_range();
    let raw = interpolate_score(p).round().clamp(f64::from(lo), f64::from(hi));
    // `raw` is a whole number inside [300, 850] here.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = raw as u16;
    Ok(score)
}

fn interpolate_score(p: f64) -> f64 {
    for pair in SCORE_KNOTS.windows(2) {
        if let [(p0, s0), (p1, s1)] = pair {
            if p <= *p1 {
                let t = (p - p0) / (p1 - p0);
                return s0 + t * (s1 - s0);
            }
        }
    }
    f64::from(MIN_SCORE)
}

pub fn assess_probability(probability: f64) -> Result<RiskAssessment, AssessmentError> {
    let credit_score = credit_score(probability)?;
    Ok(RiskAssessment {
        probability,
        credit_score,
        band: RiskBand::from_probability(probability),
        grade: CreditGrade::from_score(credit_score),
    })
}
