//! Beneish M-Score proxy for accrual-based earnings manipulation.
//!
//! A four-variable reduction of the Beneish (1999) model built only from
//! the line items an annual statement feed reliably carries:
//! DSRI, GMI, SGI and TATA. The coefficients of the retained variables are
//! kept (TATA uses the AQI weight of 0.404, as the dashboard heuristic does).
//!
//! DSRI, GMI and SGI fall back to 1 (no change) when there is no valid
//! year-over-year value. TATA has no fallback: without it the score is null.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::features::FeatureTable;
use crate::numeric::{latest_present, pct_change_series, ratio};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Beneish proxy components and composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneishProxyOutput {
    pub dsri: Decimal,
    pub gmi: Decimal,
    pub sgi: Decimal,
    pub tata: Option<Decimal>,
    /// Components that fell back to 1.
    pub defaulted: Vec<String>,
    pub m_score: Option<Decimal>,
    /// True when the M-Score exceeds -2.22.
    pub manipulation_likely: bool,
}

// Coefficients
const INTERCEPT: Decimal = dec!(-4.84);
const C_DSRI: Decimal = dec!(0.92);
const C_GMI: Decimal = dec!(0.528);
const C_SGI: Decimal = dec!(0.892);
const C_TATA: Decimal = dec!(0.404);
pub const THRESHOLD: Decimal = dec!(-2.22);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Latest non-null pct-change of receivables / revenue, plus one.
fn dsri_proxy(table: &FeatureTable) -> Option<Decimal> {
    let recv_to_rev = table.column(|r| ratio(r.receivables, Some(r.revenue)));
    latest_present(&pct_change_series(&recv_to_rev))?.checked_add(Decimal::ONE)
}

/// Latest non-null ratio of prior to current gross margin.
fn gmi_proxy(table: &FeatureTable) -> Option<Decimal> {
    let gm = table.column(|r| r.gross_margin);
    let gmi: Vec<Option<Decimal>> = gm.windows(2).map(|w| ratio(w[0], w[1])).collect();
    latest_present(&gmi)
}

/// Latest non-null revenue pct-change, plus one.
fn sgi_proxy(table: &FeatureTable) -> Option<Decimal> {
    let revenue = table.column(|r| Some(r.revenue));
    latest_present(&pct_change_series(&revenue))?.checked_add(Decimal::ONE)
}

fn or_default(value: Option<Decimal>, name: &str, defaulted: &mut Vec<String>) -> Decimal {
    value.unwrap_or_else(|| {
        defaulted.push(name.to_string());
        Decimal::ONE
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the Beneish M-Score proxy for the latest year of `table`.
///
/// Never fails: an empty table gives defaulted components and a null score.
pub fn calculate_beneish_proxy(table: &FeatureTable) -> BeneishProxyOutput {
    let mut defaulted = Vec::new();
    let dsri = or_default(dsri_proxy(table), "DSRI", &mut defaulted);
    let gmi = or_default(gmi_proxy(table), "GMI", &mut defaulted);
    let sgi = or_default(sgi_proxy(table), "SGI", &mut defaulted);
    let tata = table.latest().and_then(|r| r.accruals_ratio);

    if !defaulted.is_empty() {
        log::debug!("beneish: {} defaulted to 1", defaulted.join(", "));
    }

    // Overflow on extreme components is treated as non-finite.
    let m_score = tata.and_then(|tata| {
        [(C_DSRI, dsri), (C_GMI, gmi), (C_SGI, sgi), (C_TATA, tata)]
            .iter()
            .try_fold(INTERCEPT, |acc, (c, x)| acc.checked_add(c.checked_mul(*x)?))
    });

    BeneishProxyOutput {
        dsri,
        gmi,
        sgi,
        tata,
        defaulted,
        m_score,
        manipulation_likely: m_score.is_some_and(|m| m > THRESHOLD),
    }
}
