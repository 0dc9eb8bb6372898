//! Composite earnings manipulation probability.
//!
//! Four risk contributions, each in [0, 1], are averaged and scaled to a
//! 0-100 probability:
//! 1. **Beneish** -- 1 if the M-Score proxy exceeds -2.22, else 0.
//! 2. **Piotroski** -- 0 at 7, 0.5 at 4-6, otherwise 1. A missing F-Score
//!    falls into the high-risk branch.
//! 3. **Accruals** -- 0 if |accruals ratio| < 0.05, 0.5 if < 0.10, else 1.
//!    A missing ratio is treated as high risk as well.
//! 4. **REM** -- the REM index, passed through.
//!
//! Banding: < 30 Low, < 60 Moderate, otherwise High. The thresholds are
//! fixed constants.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ForensicError;
use crate::scoring::beneish;
use crate::scoring::piotroski::MAX_SCORE;
use crate::ForensicResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Pre-computed sub-scores for the composite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManipulationRiskInput {
    pub beneish_m_score: Option<Decimal>,
    pub piotroski_f_score: Option<u8>,
    /// Signed accruals ratio; the magnitude is taken here.
    pub accruals_ratio: Option<Decimal>,
    pub rem_index: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContributions {
    pub beneish: Decimal,
    pub piotroski: Decimal,
    pub accruals: Decimal,
    pub rem: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskBand::Low => "Low",
            RiskBand::Moderate => "Moderate",
            RiskBand::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulationRiskOutput {
    pub contributions: RiskContributions,
    /// Percentage in [0, 100], two decimals.
    pub manipulation_probability: Decimal,
    pub risk_band: RiskBand,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const HALF: Decimal = dec!(0.5);
const PIOTROSKI_MODERATE: u8 = 4;
const ACCRUALS_GREEN: Decimal = dec!(0.05);
const ACCRUALS_AMBER: Decimal = dec!(0.10);
const BAND_LOW: Decimal = dec!(30);
const BAND_MODERATE: Decimal = dec!(60);
const COMPONENTS: Decimal = dec!(4);

// ---------------------------------------------------------------------------
// Contribution rules
// ---------------------------------------------------------------------------

pub fn beneish_contribution(m_score: Option<Decimal>) -> Decimal {
    match m_score {
        Some(m) if m > beneish::THRESHOLD => Decimal::ONE,
        _ => Decimal::ZERO,
    }
}

pub fn piotroski_contribution(f_score: Option<u8>) -> Decimal {
    match f_score {
        Some(f) if f >= MAX_SCORE => Decimal::ZERO,
        Some(f) if f >= PIOTROSKI_MODERATE => HALF,
        _ => Decimal::ONE,
    }
}

pub fn accruals_contribution(accruals_ratio: Option<Decimal>) -> Decimal {
    match accruals_ratio.map(|a| a.abs()) {
        Some(a) if a < ACCRUALS_GREEN => Decimal::ZERO,
        Some(a) if a < ACCRUALS_AMBER => HALF,
        _ => Decimal::ONE,
    }
}

pub fn classify(probability: Decimal) -> RiskBand {
    if probability < BAND_LOW {
        RiskBand::Low
    } else if probability < BAND_MODERATE {
        RiskBand::Moderate
    } else {
        RiskBand::High
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Combine the sub-scores into a manipulation probability and risk band.
pub fn calculate_manipulation_risk(
    input: &ManipulationRiskInput,
) -> ForensicResult<ManipulationRiskOutput> {
    if input.piotroski_f_score.is_some_and(|f| f > MAX_SCORE) {
        return Err(ForensicError::InvalidInput {
            field: "piotroski_f_score".into(),
            reason: "Must be 0-7".into(),
        });
    }
    if input.rem_index < Decimal::ZERO || input.rem_index > Decimal::ONE {
        return Err(ForensicError::InvalidInput {
            field: "rem_index".into(),
            reason: "Must be in [0, 1]".into(),
        });
    }

    let contributions = RiskContributions {
        beneish: beneish_contribution(input.beneish_m_score),
        piotroski: piotroski_contribution(input.piotroski_f_score),
        accruals: accruals_contribution(input.accruals_ratio),
        rem: input.rem_index,
    };

    let total = contributions.beneish
        + contributions.piotroski
        + contributions.accruals
        + contributions.rem;
    let manipulation_probability = (total / COMPONENTS * dec!(100)).round_dp(2);

    Ok(ManipulationRiskOutput {
        risk_band: classify(manipulation_probability),
        manipulation_probability,
        contributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(
        m: Option<Decimal>,
        f: Option<u8>,
        accruals: Option<Decimal>,
        rem: Decimal,
    ) -> ManipulationRiskInput {
        ManipulationRiskInput {
            beneish_m_score: m,
            piotroski_f_score: f,
            accruals_ratio: accruals,
            rem_index: rem,
        }
    }

    #[test]
    fn test_accruals_contribution_bands() {
        assert_eq!(accruals_contribution(Some(dec!(0.03))), Decimal::ZERO);
        assert_eq!(accruals_contribution(Some(dec!(0.07))), HALF);
        assert_eq!(accruals_contribution(Some(dec!(0.5))), Decimal::ONE);
    }

    #[test]
    fn test_accruals_uses_magnitude() {
        assert_eq!(accruals_contribution(Some(dec!(-0.03))), Decimal::ZERO);
        assert_eq!(accruals_contribution(Some(dec!(-0.0619))), HALF);
        assert_eq!(accruals_contribution(Some(dec!(-0.10))), Decimal::ONE);
    }

    #[test]
    fn test_zero_accruals_is_low_risk() {
        assert_eq!(accruals_contribution(Some(Decimal::ZERO)), Decimal::ZERO);
    }

    #[test]
    fn test_null_accruals_is_high_risk() {
        assert_eq!(accruals_contribution(None), Decimal::ONE);
    }

    #[test]
    fn test_beneish_contribution() {
        assert_eq!(beneish_contribution(Some(dec!(-1.5))), Decimal::ONE);
        assert_eq!(beneish_contribution(Some(Decimal::ZERO)), Decimal::ONE);
        assert_eq!(beneish_contribution(Some(dec!(-2.22))), Decimal::ZERO);
        assert_eq!(beneish_contribution(Some(dec!(-3))), Decimal::ZERO);
        assert_eq!(beneish_contribution(None), Decimal::ZERO);
    }

    #[test]
    fn test_piotroski_contribution() {
        assert_eq!(piotroski_contribution(Some(7)), Decimal::ZERO);
        assert_eq!(piotroski_contribution(Some(6)), HALF);
        assert_eq!(piotroski_contribution(Some(4)), HALF);
        assert_eq!(piotroski_contribution(Some(3)), Decimal::ONE);
        assert_eq!(piotroski_contribution(Some(0)), Decimal::ONE);
    }

    #[test]
    fn test_missing_piotroski_treated_as_high_risk() {
        assert_eq!(piotroski_contribution(None), Decimal::ONE);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(classify(dec!(29.99)), RiskBand::Low);
        assert_eq!(classify(dec!(30)), RiskBand::Moderate);
        assert_eq!(classify(dec!(59.99)), RiskBand::Moderate);
        assert_eq!(classify(dec!(60)), RiskBand::High);
    }

    #[test]
    fn test_all_clear_is_zero() {
        let out =
            calculate_manipulation_risk(&input(Some(dec!(-3)), Some(7), Some(dec!(0.01)), Decimal::ZERO))
                .unwrap();
        assert_eq!(out.manipulation_probability, Decimal::ZERO);
        assert_eq!(out.risk_band, RiskBand::Low);
    }

    #[test]
    fn test_all_raised_is_hundred() {
        let out = calculate_manipulation_risk(&input(None, None, None, Decimal::ONE)).unwrap();
        assert_eq!(out.manipulation_probability, dec!(100));
        assert_eq!(out.risk_band, RiskBand::High);
    }

    #[test]
    fn test_mixed_profile() {
        // 0 + 0.5 + 0.5 + 1/3 = 1.3333 -> 33.33%
        let rem = Decimal::ONE / dec!(3);
        let out =
            calculate_manipulation_risk(&input(Some(dec!(-2.5)), Some(6), Some(dec!(-0.0619)), rem))
                .unwrap();
        assert_eq!(out.contributions.piotroski, HALF);
        assert_eq!(out.contributions.accruals, HALF);
        assert_eq!(out.manipulation_probability, dec!(33.33));
        assert_eq!(out.risk_band, RiskBand::Moderate);
    }

    #[test]
    fn test_probability_two_decimals() {
        let rem = dec!(2) / dec!(3);
        let out = calculate_manipulation_risk(&input(None, Some(7), Some(dec!(0)), rem)).unwrap();
        assert_eq!(out.manipulation_probability, dec!(16.67));
        assert!(out.manipulation_probability.scale() <= 2);
    }

    #[test]
    fn test_invalid_f_score_rejected() {
        match calculate_manipulation_risk(&input(None, Some(8), None, Decimal::ZERO)).unwrap_err() {
            ForensicError::InvalidInput { field, .. } => assert_eq!(field, "piotroski_f_score"),
            e => panic!("Expected InvalidInput, got {e}"),
        }
    }

    #[test]
    fn test_rem_out_of_range_rejected() {
        assert!(calculate_manipulation_risk(&input(None, None, None, dec!(1.5))).is_err());
        assert!(calculate_manipulation_risk(&input(None, None, None, dec!(-0.1))).is_err());
    }

    #[test]
    fn test_band_display() {
        assert_eq!(RiskBand::Moderate.to_string(), "Moderate");
        assert_eq!(serde_json::to_string(&RiskBand::High).unwrap(), "\"High\"");
    }
}
