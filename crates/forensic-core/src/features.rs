//! Feature engine: per-year forensic ratios derived from canonical line items.
//!
//! Years missing Revenue, Net Income, OCF or Total Assets are dropped before
//! any ratio is computed. Receivables and COGS may be null; ratios built on
//! them are then null too. Growth columns are null for the first retained
//! year.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ForensicError;
use crate::numeric::{difference, pct_change_series, ratio, round_opt};
use crate::statements::{CanonicalField, StatementRecord};
use crate::types::{FiscalYear, Money, Rate};
use crate::ForensicResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One retained year with its derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub year: FiscalYear,
    pub revenue: Money,
    pub net_income: Money,
    pub operating_cash_flow: Money,
    pub total_assets: Money,
    pub receivables: Option<Money>,
    pub cogs: Option<Money>,

    pub gross_margin: Option<Rate>,
    pub accruals_ratio: Option<Rate>,
    pub roa: Option<Rate>,
    pub ocf_to_revenue: Option<Rate>,
    pub revenue_growth: Option<Rate>,
    pub ocf_growth: Option<Rate>,
    pub sales_cash_gap: Option<Rate>,
    pub cogs_to_revenue: Option<Rate>,
}

/// A year excluded from the feature table and the mandatory fields it lacked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedYear {
    pub year: FiscalYear,
    pub missing: Vec<CanonicalField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
    pub dropped: Vec<DroppedYear>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    /// The latest two rows as `(prior, current)`.
    pub fn last_two(&self) -> Option<(&FeatureRow, &FeatureRow)> {
        match self.rows.as_slice() {
            [.., prior, current] => Some((prior, current)),
            _ => None,
        }
    }

    /// Extract one nullable column, oldest first.
    pub fn column<F>(&self, f: F) -> Vec<Option<Decimal>>
    where
        F: Fn(&FeatureRow) -> Option<Decimal>,
    {
        self.rows.iter().map(f).collect()
    }

    /// Copy of the table with every value rounded for display.
    pub fn rounded(&self, dp: u32) -> FeatureTable {
        let rows = self
            .rows
            .iter()
            .map(|r| FeatureRow {
                year: r.year,
                revenue: r.revenue.round_dp(dp),
                net_income: r.net_income.round_dp(dp),
                operating_cash_flow: r.operating_cash_flow.round_dp(dp),
                total_assets: r.total_assets.round_dp(dp),
                receivables: round_opt(r.receivables, dp),
                cogs: round_opt(r.cogs, dp),
                gross_margin: round_opt(r.gross_margin, dp),
                accruals_ratio: round_opt(r.accruals_ratio, dp),
                roa: round_opt(r.roa, dp),
                ocf_to_revenue: round_opt(r.ocf_to_revenue, dp),
                revenue_growth: round_opt(r.revenue_growth, dp),
                ocf_growth: round_opt(r.ocf_growth, dp),
                sales_cash_gap: round_opt(r.sales_cash_gap, dp),
                cogs_to_revenue: round_opt(r.cogs_to_revenue, dp),
            })
            .collect();
        FeatureTable {
            rows,
            dropped: self.dropped.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the feature table from canonical records ordered by ascending,
/// unique year.
pub fn build_feature_table(records: &[StatementRecord]) -> ForensicResult<FeatureTable> {
    if let Some(w) = records.windows(2).find(|w| w[0].year >= w[1].year) {
        return Err(ForensicError::InvalidInput {
            field: "year".into(),
            reason: format!(
                "Records must be strictly ascending by year ({} followed by {})",
                w[0].year, w[1].year
            ),
        });
    }

    let mut dropped = Vec::new();
    let mut rows: Vec<FeatureRow> = Vec::with_capacity(records.len());

    for rec in records {
        let (Some(revenue), Some(net_income), Some(ocf), Some(total_assets)) = (
            rec.revenue,
            rec.net_income,
            rec.operating_cash_flow,
            rec.total_assets,
        ) else {
            let missing = rec.missing_mandatory();
            log::debug!("dropping fiscal year {}: missing {:?}", rec.year, missing);
            dropped.push(DroppedYear {
                year: rec.year,
                missing,
            });
            continue;
        };

        let rev = Some(revenue);
        let ta = Some(total_assets);
        rows.push(FeatureRow {
            year: rec.year,
            revenue,
            net_income,
            operating_cash_flow: ocf,
            total_assets,
            receivables: rec.receivables,
            cogs: rec.cogs,
            gross_margin: ratio(difference(rev, rec.cogs), rev),
            accruals_ratio: ratio(difference(Some(net_income), Some(ocf)), ta),
            roa: ratio(Some(net_income), ta),
            ocf_to_revenue: ratio(Some(ocf), rev),
            revenue_growth: None,
            ocf_growth: None,
            sales_cash_gap: None,
            cogs_to_revenue: ratio(rec.cogs, rev),
        });
    }

    let revenue: Vec<Option<Decimal>> = rows.iter().map(|r| Some(r.revenue)).collect();
    let ocf: Vec<Option<Decimal>> = rows.iter().map(|r| Some(r.operating_cash_flow)).collect();
    let revenue_growth = pct_change_series(&revenue);
    let ocf_growth = pct_change_series(&ocf);

    for (i, row) in rows.iter_mut().enumerate() {
        row.revenue_growth = revenue_growth[i];
        row.ocf_growth = ocf_growth[i];
        row.sales_cash_gap = difference(revenue_growth[i], ocf_growth[i]);
    }

    Ok(FeatureTable { rows, dropped })
}
