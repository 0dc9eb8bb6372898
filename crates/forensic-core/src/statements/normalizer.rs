//! Canonical schema and label aliasing.
//!
//! Providers label the same line item differently ("Operating Cash Flow",
//! "Total Cash From Operating Activities"). An [`AliasTable`] lists the
//! accepted labels per canonical field; the first one present in the
//! joined table is used. A field with no matching label is simply null.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::coerce_value;
use crate::statements::raw::MergedStatements;
use crate::types::{FiscalYear, Money};

// ---------------------------------------------------------------------------
// Canonical fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Revenue,
    NetIncome,
    OperatingCashFlow,
    TotalAssets,
    Receivables,
    Cogs,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Revenue,
        CanonicalField::NetIncome,
        CanonicalField::OperatingCashFlow,
        CanonicalField::TotalAssets,
        CanonicalField::Receivables,
        CanonicalField::Cogs,
    ];

    /// Fields a year must carry to enter the feature table.
    pub const MANDATORY: [CanonicalField; 4] = [
        CanonicalField::Revenue,
        CanonicalField::NetIncome,
        CanonicalField::OperatingCashFlow,
        CanonicalField::TotalAssets,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::Revenue => "Revenue",
            CanonicalField::NetIncome => "Net_Income",
            CanonicalField::OperatingCashFlow => "OCF",
            CanonicalField::TotalAssets => "Total_Assets",
            CanonicalField::Receivables => "Receivables",
            CanonicalField::Cogs => "COGS",
        }
    }
}

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// Accepted provider labels per canonical field, in priority order.
///
/// Deserializes with per-field defaults, so an override file only needs
/// the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasTable {
    pub revenue: Vec<String>,
    pub net_income: Vec<String>,
    pub operating_cash_flow: Vec<String>,
    pub total_assets: Vec<String>,
    pub receivables: Vec<String>,
    pub cogs: Vec<String>,
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            revenue: labels(&["Total Revenue"]),
            net_income: labels(&["Net Income"]),
            operating_cash_flow: labels(&[
                "Total Cash From Operating Activities",
                "Operating Cash Flow",
            ]),
            total_assets: labels(&["Total Assets"]),
            receivables: labels(&["Net Receivables"]),
            cogs: labels(&["Cost Of Revenue"]),
        }
    }
}

impl AliasTable {
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        match field {
            CanonicalField::Revenue => &self.revenue,
            CanonicalField::NetIncome => &self.net_income,
            CanonicalField::OperatingCashFlow => &self.operating_cash_flow,
            CanonicalField::TotalAssets => &self.total_assets,
            CanonicalField::Receivables => &self.receivables,
            CanonicalField::Cogs => &self.cogs,
        }
    }
}

// ---------------------------------------------------------------------------
// Statement record
// ---------------------------------------------------------------------------

/// One fiscal year on the canonical schema. Any field may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRecord {
    pub year: FiscalYear,
    pub revenue: Option<Money>,
    pub net_income: Option<Money>,
    pub operating_cash_flow: Option<Money>,
    pub total_assets: Option<Money>,
    pub receivables: Option<Money>,
    pub cogs: Option<Money>,
}

impl StatementRecord {
    pub fn empty(year: FiscalYear) -> Self {
        Self {
            year,
            revenue: None,
            net_income: None,
            operating_cash_flow: None,
            total_assets: None,
            receivables: None,
            cogs: None,
        }
    }

    pub fn get(&self, field: CanonicalField) -> Option<Decimal> {
        match field {
            CanonicalField::Revenue => self.revenue,
            CanonicalField::NetIncome => self.net_income,
            CanonicalField::OperatingCashFlow => self.operating_cash_flow,
            CanonicalField::TotalAssets => self.total_assets,
            CanonicalField::Receivables => self.receivables,
            CanonicalField::Cogs => self.cogs,
        }
    }

    fn set(&mut self, field: CanonicalField, value: Option<Decimal>) {
        let slot = match field {
            CanonicalField::Revenue => &mut self.revenue,
            CanonicalField::NetIncome => &mut self.net_income,
            CanonicalField::OperatingCashFlow => &mut self.operating_cash_flow,
            CanonicalField::TotalAssets => &mut self.total_assets,
            CanonicalField::Receivables => &mut self.receivables,
            CanonicalField::Cogs => &mut self.cogs,
        };
        *slot = value;
    }

    /// Mandatory fields that are null for this year.
    pub fn missing_mandatory(&self) -> Vec<CanonicalField> {
        CanonicalField::MANDATORY
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The first alias that exists as a column of `table`, if any.
pub fn resolve_column<'a>(table: &MergedStatements, aliases: &'a [String]) -> Option<&'a str> {
    aliases
        .iter()
        .find(|a| table.has_column(a))
        .map(|a| a.as_str())
}

/// Map every joined year onto the canonical schema.
///
/// Each field resolves its column independently. A missing column, a
/// missing cell and an uncoercible cell all produce null.
pub fn normalize(table: &MergedStatements, aliases: &AliasTable) -> Vec<StatementRecord> {
    let columns: Vec<(CanonicalField, Option<&str>)> = CanonicalField::ALL
        .iter()
        .map(|f| (*f, resolve_column(table, aliases.aliases(*f))))
        .collect();

    for (field, column) in &columns {
        if column.is_none() {
            log::debug!("no column found for {}", field.name());
        }
    }

    table
        .rows
        .iter()
        .map(|row| {
            let mut record = StatementRecord::empty(row.year);
            for (field, column) in &columns {
                let value = column
                    .and_then(|c| row.items.get(c))
                    .and_then(coerce_value);
                record.set(*field, value);
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::raw::MergedRow;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn table(rows: Vec<(i32, serde_json::Value)>) -> MergedStatements {
        MergedStatements {
            rows: rows
                .into_iter()
                .map(|(year, items)| MergedRow {
                    year,
                    items: serde_json::from_value(items).unwrap(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_resolve_first_present_alias() {
        let t = table(vec![(
            2023,
            json!({"Operating Cash Flow": 25, "Total Cash From Operating Activities": 24}),
        )]);
        let aliases = AliasTable::default();
        assert_eq!(
            resolve_column(&t, &aliases.operating_cash_flow),
            Some("Total Cash From Operating Activities")
        );
    }

    #[test]
    fn test_resolve_falls_back_to_later_alias() {
        let t = table(vec![(2023, json!({"Operating Cash Flow": 25}))]);
        let aliases = AliasTable::default();
        assert_eq!(
            resolve_column(&t, &aliases.operating_cash_flow),
            Some("Operating Cash Flow")
        );
    }

    #[test]
    fn test_resolve_missing_column_is_none() {
        let t = table(vec![(2023, json!({"Total Revenue": 1}))]);
        assert_eq!(resolve_column(&t, &AliasTable::default().receivables), None);
    }

    #[test]
    fn test_column_presence_is_table_wide() {
        // The first alias exists in 2022 only, so 2023 reads it as null.
        let t = table(vec![
            (2022, json!({"Total Cash From Operating Activities": 20})),
            (2023, json!({"Operating Cash Flow": 25})),
        ]);
        let records = normalize(&t, &AliasTable::default());
        assert_eq!(records[0].operating_cash_flow, Some(dec!(20)));
        assert_eq!(records[1].operating_cash_flow, None);
    }

    #[test]
    fn test_normalize_maps_all_fields() {
        let t = table(vec![(
            2023,
            json!({
                "Total Revenue": 110,
                "Net Income": 12,
                "Operating Cash Flow": 25,
                "Total Assets": 210,
                "Net Receivables": 16,
                "Cost Of Revenue": 65
            }),
        )]);
        let r = &normalize(&t, &AliasTable::default())[0];
        assert_eq!(r.year, 2023);
        assert_eq!(r.revenue, Some(dec!(110)));
        assert_eq!(r.net_income, Some(dec!(12)));
        assert_eq!(r.operating_cash_flow, Some(dec!(25)));
        assert_eq!(r.total_assets, Some(dec!(210)));
        assert_eq!(r.receivables, Some(dec!(16)));
        assert_eq!(r.cogs, Some(dec!(65)));
        assert!(r.missing_mandatory().is_empty());
    }

    #[test]
    fn test_uncoercible_cell_is_null() {
        let t = table(vec![(2023, json!({"Total Revenue": "NaN", "Net Income": null}))]);
        let r = &normalize(&t, &AliasTable::default())[0];
        assert_eq!(r.revenue, None);
        assert_eq!(r.net_income, None);
        assert_eq!(
            r.missing_mandatory(),
            CanonicalField::MANDATORY.to_vec()
        );
    }

    #[test]
    fn test_custom_aliases() {
        let t = table(vec![(2023, json!({"Revenues": 500}))]);
        let aliases = AliasTable {
            revenue: vec!["Total Revenue".into(), "Revenues".into()],
            ..AliasTable::default()
        };
        assert_eq!(normalize(&t, &aliases)[0].revenue, Some(dec!(500)));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let aliases: AliasTable =
            serde_json::from_value(json!({"cogs": ["Cost Of Goods Sold"]})).unwrap();
        assert_eq!(aliases.cogs, vec!["Cost Of Goods Sold".to_string()]);
        assert_eq!(aliases.revenue, AliasTable::default().revenue);
    }

    #[test]
    fn test_optional_fields_not_mandatory() {
        let mut r = StatementRecord::empty(2023);
        for f in CanonicalField::MANDATORY {
            r.set(f, Some(Decimal::ONE));
        }
        assert!(r.missing_mandatory().is_empty());
        assert_eq!(r.receivables, None);
        assert_eq!(r.cogs, None);
    }
}
