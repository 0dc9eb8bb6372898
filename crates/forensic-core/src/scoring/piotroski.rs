//! Piotroski F-Score proxy for financial quality.
//!
//! Seven of the nine Piotroski (2000) signals, evaluated on the latest two
//! years of the feature table:
//!
//! 1. Net income > 0
//! 2. OCF > 0
//! 3. ROA improving
//! 4. OCF > net income
//! 5. Revenue growing
//! 6. Gross margin improving
//! 7. Total assets not growing
//!
//! A comparison with a null operand counts as a failed signal.
//! Score 7 = Strong, 4-6 = Moderate, 0-3 = Weak.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::features::FeatureTable;
use crate::numeric::pct_change;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Individual signal results and the composite F-Score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiotroskiProxyOutput {
    pub net_income_positive: bool,
    pub ocf_positive: bool,
    pub roa_improving: bool,
    pub ocf_exceeds_net_income: bool,
    pub revenue_growing: bool,
    pub gross_margin_improving: bool,
    pub assets_not_growing: bool,

    /// Total score (0-7).
    pub f_score: u8,
    /// Classification: "Strong" (7), "Moderate" (4-6), "Weak" (0-3).
    pub strength: String,
}

pub const MAX_SCORE: u8 = 7;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn gt(a: Option<Decimal>, b: Option<Decimal>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

fn classify(score: u8) -> String {
    match score {
        7 => "Strong".to_string(),
        4..=6 => "Moderate".to_string(),
        _ => "Weak".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the F-Score proxy, or `None` with fewer than two years.
pub fn calculate_piotroski_proxy(table: &FeatureTable) -> Option<PiotroskiProxyOutput> {
    let Some((prior, current)) = table.last_two() else {
        log::debug!("piotroski: {} usable year(s), need 2", table.len());
        return None;
    };

    let net_income_positive = current.net_income > Decimal::ZERO;
    let ocf_positive = current.operating_cash_flow > Decimal::ZERO;
    let roa_improving = gt(current.roa, prior.roa);
    let ocf_exceeds_net_income = current.operating_cash_flow > current.net_income;
    let revenue_growing = gt(current.revenue_growth, Some(Decimal::ZERO));
    let gross_margin_improving = gt(current.gross_margin, prior.gross_margin);
    let assets_not_growing = pct_change(Some(current.total_assets), Some(prior.total_assets))
        .is_some_and(|g| g <= Decimal::ZERO);

    let signals = [
        net_income_positive,
        ocf_positive,
        roa_improving,
        ocf_exceeds_net_income,
        revenue_growing,
        gross_margin_improving,
        assets_not_growing,
    ];
    let f_score = signals.iter().filter(|&&s| s).count() as u8;

    Some(PiotroskiProxyOutput {
        net_income_positive,
        ocf_positive,
        roa_improving,
        ocf_exceeds_net_income,
        revenue_growing,
        gross_margin_improving,
        assets_not_growing,
        f_score,
        strength: classify(f_score),
    })
}
