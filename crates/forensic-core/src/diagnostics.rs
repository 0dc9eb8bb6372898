//! Chart-ready series for the forensic visual diagnostics.
//!
//! Rendering belongs to the presentation layer; this module only shapes the
//! data and fits the gross-margin vs. revenue-growth trendline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::features::FeatureTable;
use crate::numeric::safe_div;
use crate::types::{FiscalYear, Money, Rate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueCashPoint {
    pub year: FiscalYear,
    pub revenue: Money,
    pub operating_cash_flow: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: FiscalYear,
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemBreakdown {
    pub year: FiscalYear,
    pub ocf_to_revenue: Option<Rate>,
    pub sales_cash_gap: Option<Rate>,
    pub cogs_to_revenue: Option<Rate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub year: FiscalYear,
    pub revenue_growth: Rate,
    pub gross_margin: Rate,
}

/// Ordinary least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    pub slope: Decimal,
    pub intercept: Decimal,
    pub points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub revenue_vs_ocf: Vec<RevenueCashPoint>,
    pub accruals_trend: Vec<SeriesPoint>,
    pub rem_breakdown: Option<RemBreakdown>,
    pub margin_vs_growth: Vec<ScatterPoint>,
    pub margin_growth_trendline: Option<Trendline>,
}

/// Fit a least squares line through `(x, y)` points.
///
/// `None` with fewer than two points, when every `x` is equal, or when an
/// intermediate sum overflows.
pub fn ols_trendline(points: &[(Decimal, Decimal)]) -> Option<Trendline> {
    if points.len() < 2 {
        return None;
    }
    let n = Decimal::from(points.len() as u64);
    let (sum_x, sum_y) = points
        .iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(sx, sy), (x, y)| {
            Some((sx.checked_add(*x)?, sy.checked_add(*y)?))
        })?;
    let mean_x = safe_div(sum_x, n)?;
    let mean_y = safe_div(sum_y, n)?;

    let mut sxx = Decimal::ZERO;
    let mut sxy = Decimal::ZERO;
    for (x, y) in points {
        let dx = x.checked_sub(mean_x)?;
        let dy = y.checked_sub(mean_y)?;
        sxx = sxx.checked_add(dx.checked_mul(dx)?)?;
        sxy = sxy.checked_add(dx.checked_mul(dy)?)?;
    }

    let slope = safe_div(sxy, sxx)?;
    Some(Trendline {
        slope,
        intercept: mean_y.checked_sub(slope.checked_mul(mean_x)?)?,
        points: points.len(),
    })
}

pub fn build_diagnostics(table: &FeatureTable) -> Diagnostics {
    let revenue_vs_ocf = table
        .rows
        .iter()
        .map(|r| RevenueCashPoint {
            year: r.year,
            revenue: r.revenue,
            operating_cash_flow: r.operating_cash_flow,
        })
        .collect();

    let accruals_trend = table
        .rows
        .iter()
        .map(|r| SeriesPoint {
            year: r.year,
            value: r.accruals_ratio,
        })
        .collect();

    let rem_breakdown = table.latest().map(|r| RemBreakdown {
        year: r.year,
        ocf_to_revenue: r.ocf_to_revenue,
        sales_cash_gap: r.sales_cash_gap,
        cogs_to_revenue: r.cogs_to_revenue,
    });

    let margin_vs_growth: Vec<ScatterPoint> = table
        .rows
        .iter()
        .filter_map(|r| {
            Some(ScatterPoint {
                year: r.year,
                revenue_growth: r.revenue_growth?,
                gross_margin: r.gross_margin?,
            })
        })
        .collect();

    let xy: Vec<(Decimal, Decimal)> = margin_vs_growth
        .iter()
        .map(|p| (p.revenue_growth, p.gross_margin))
        .collect();

    Diagnostics {
        revenue_vs_ocf,
        accruals_trend,
        rem_breakdown,
        margin_growth_trendline: ols_trendline(&xy),
        margin_vs_growth,
    }
}
