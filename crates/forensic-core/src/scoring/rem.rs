//! Real earnings management (REM) risk index.
//!
//! Three binary flags on the latest year, averaged into [0, 1]:
//! - weak cash conversion: OCF / revenue below 10%,
//! - sales outpacing cash: revenue growth exceeds OCF growth by more than 10pp,
//! - cost compression: COGS / revenue fell by more than 5% since the last
//!   year that reported COGS.
//!
//! A flag whose input is null is not raised (scores 0) and is listed in
//! `unevaluated`, so a thin history can understate the index but never
//! inflate it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::features::FeatureTable;
use crate::numeric::pct_change_series;
use crate::types::Rate;

const OCF_TO_REVENUE_FLOOR: Decimal = dec!(0.10);
const SALES_CASH_GAP_CEILING: Decimal = dec!(0.10);
const COGS_RATIO_DROP: Decimal = dec!(-0.05);
const SIGNAL_COUNT: Decimal = dec!(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemSignal {
    LowCashConversion,
    SalesOutpacingCash,
    CostCompression,
}

/// REM flags, the latest-year values behind them and the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemRiskOutput {
    pub ocf_to_revenue: Option<Rate>,
    pub sales_cash_gap: Option<Rate>,
    pub cogs_to_revenue: Option<Rate>,
    pub cogs_to_revenue_change: Option<Rate>,

    pub low_cash_conversion: bool,
    pub sales_outpacing_cash: bool,
    pub cost_compression: bool,
    /// Signals scored 0 because their input was null.
    pub unevaluated: Vec<RemSignal>,

    /// Mean of the three flags (0, 1/3, 2/3 or 1).
    pub index: Decimal,
}

fn flag(
    value: Option<Decimal>,
    signal: RemSignal,
    test: impl Fn(Decimal) -> bool,
    unevaluated: &mut Vec<RemSignal>,
) -> bool {
    match value {
        Some(v) => test(v),
        None => {
            unevaluated.push(signal);
            false
        }
    }
}

/// Compute the REM risk index for the latest year of `table`.
pub fn calculate_rem_risk(table: &FeatureTable) -> RemRiskOutput {
    let latest = table.latest();
    let ocf_to_revenue = latest.and_then(|r| r.ocf_to_revenue);
    let sales_cash_gap = latest.and_then(|r| r.sales_cash_gap);
    let cogs_to_revenue = latest.and_then(|r| r.cogs_to_revenue);
    let cogs_to_revenue_change = pct_change_series(&table.column(|r| r.cogs_to_revenue))
        .last()
        .copied()
        .flatten();

    let mut unevaluated = Vec::new();
    let low_cash_conversion = flag(
        ocf_to_revenue,
        RemSignal::LowCashConversion,
        |v| v < OCF_TO_REVENUE_FLOOR,
        &mut unevaluated,
    );
    let sales_outpacing_cash = flag(
        sales_cash_gap,
        RemSignal::SalesOutpacingCash,
        |v| v > SALES_CASH_GAP_CEILING,
        &mut unevaluated,
    );
    let cost_compression = flag(
        cogs_to_revenue_change,
        RemSignal::CostCompression,
        |v| v < COGS_RATIO_DROP,
        &mut unevaluated,
    );

    let raised = [low_cash_conversion, sales_outpacing_cash, cost_compression]
        .iter()
        .filter(|&&f| f)
        .count();
    let index = Decimal::from(raised as u32) / SIGNAL_COUNT;

    RemRiskOutput {
        ocf_to_revenue,
        sales_cash_gap,
        cogs_to_revenue,
        cogs_to_revenue_change,
        low_cash_conversion,
        sales_outpacing_cash,
        cost_compression,
        unevaluated,
        index,
    }
}
