//! Provider statement shapes and the year-indexed inner join.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{Currency, FiscalYear};

/// Raw line items for one period, keyed by the provider's label.
pub type LineItems = BTreeMap<String, serde_json::Value>;

/// One reported period of a single statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub period_end: NaiveDate,
    #[serde(default)]
    pub items: LineItems,
}

impl StatementPeriod {
    pub fn fiscal_year(&self) -> FiscalYear {
        self.period_end.year()
    }
}

/// The three annual statements of one issuer, as supplied by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub ticker: String,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub income_statement: Vec<StatementPeriod>,
    #[serde(default)]
    pub balance_sheet: Vec<StatementPeriod>,
    #[serde(default)]
    pub cash_flow: Vec<StatementPeriod>,
}

/// One fiscal year after the join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub year: FiscalYear,
    pub items: LineItems,
}

/// Joined statements, ascending by year with unique years.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedStatements {
    pub rows: Vec<MergedRow>,
}

impl MergedStatements {
    /// True if any year carries `label`, mirroring column presence in a
    /// joined table.
    pub fn has_column(&self, label: &str) -> bool {
        self.rows.iter().any(|r| r.items.contains_key(label))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn duplicate_warning(name: &str, year: FiscalYear, kept: NaiveDate, ignored: NaiveDate) -> String {
    format!("{name}: two periods end in {year}; kept {kept} and ignored {ignored}")
}

fn index_by_year<'a>(
    statement: &'a [StatementPeriod],
    name: &str,
    warnings: &mut Vec<String>,
) -> BTreeMap<FiscalYear, &'a StatementPeriod> {
    let mut by_year: BTreeMap<FiscalYear, &StatementPeriod> = BTreeMap::new();
    for period in statement {
        let year = period.fiscal_year();
        let kept = match by_year.get(&year).map(|p| p.period_end) {
            Some(existing) if existing >= period.period_end => {
                warnings.push(duplicate_warning(name, year, existing, period.period_end));
                existing
            }
            Some(existing) => {
                warnings.push(duplicate_warning(name, year, period.period_end, existing));
                by_year.insert(year, period);
                period.period_end
            }
            None => {
                by_year.insert(year, period);
                continue;
            }
        };
        log::warn!("{name}: duplicate fiscal year {year}, keeping {kept}");
    }
    by_year
}

/// Year-index each statement and inner-join them.
///
/// A year missing from any one statement is excluded. When a label appears
/// in more than one statement, the income statement wins over the balance
/// sheet, which wins over the cash flow statement.
pub fn merge_statements(
    statements: &FinancialStatements,
    warnings: &mut Vec<String>,
) -> MergedStatements {
    let income = index_by_year(&statements.income_statement, "income_statement", warnings);
    let balance = index_by_year(&statements.balance_sheet, "balance_sheet", warnings);
    let cash = index_by_year(&statements.cash_flow, "cash_flow", warnings);

    let mut rows = Vec::new();
    for (year, inc) in &income {
        let (Some(bal), Some(cf)) = (balance.get(year), cash.get(year)) else {
            log::debug!("{}: fiscal year {year} not present in all statements", statements.ticker);
            continue;
        };
        let mut items = inc.items.clone();
        for source in [&bal.items, &cf.items] {
            for (label, value) in source {
                items.entry(label.clone()).or_insert_with(|| value.clone());
            }
        }
        rows.push(MergedRow { year: *year, items });
    }

    MergedStatements { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn period(date: &str, items: serde_json::Value) -> StatementPeriod {
        StatementPeriod {
            period_end: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            items: serde_json::from_value(items).unwrap(),
        }
    }

    fn statements() -> FinancialStatements {
        FinancialStatements {
            ticker: "ACME".into(),
            currency: Currency::USD,
            income_statement: vec![
                period("2023-12-31", json!({"Total Revenue": 110, "Net Income": 12})),
                period("2021-12-31", json!({"Total Revenue": 90, "Net Income": 8})),
                period("2022-12-31", json!({"Total Revenue": 100, "Net Income": 10})),
            ],
            balance_sheet: vec![
                period("2022-12-31", json!({"Total Assets": 200})),
                period("2023-12-31", json!({"Total Assets": 210})),
                period("2021-12-31", json!({"Total Assets": 190})),
            ],
            cash_flow: vec![
                period("2023-12-31", json!({"Operating Cash Flow": 25})),
                period("2022-12-31", json!({"Operating Cash Flow": 20})),
            ],
        }
    }

    #[test]
    fn test_inner_join_drops_years_missing_a_statement() {
        let mut warnings = Vec::new();
        let merged = merge_statements(&statements(), &mut warnings);
        assert_eq!(merged.rows.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2022, 2023]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_rows_are_ascending_and_combined() {
        let mut warnings = Vec::new();
        let merged = merge_statements(&statements(), &mut warnings);
        let last = &merged.rows[1];
        assert_eq!(last.items["Total Revenue"], json!(110));
        assert_eq!(last.items["Total Assets"], json!(210));
        assert_eq!(last.items["Operating Cash Flow"], json!(25));
    }

    #[test]
    fn test_income_statement_label_wins_on_overlap() {
        let mut s = statements();
        s.cash_flow[0].items.insert("Net Income".into(), json!(999));
        let merged = merge_statements(&s, &mut Vec::new());
        assert_eq!(merged.rows[1].items["Net Income"], json!(12));
    }

    #[test]
    fn test_duplicate_year_keeps_later_period() {
        let mut s = statements();
        s.income_statement
            .push(period("2023-01-31", json!({"Total Revenue": 1, "Net Income": 1})));
        let mut warnings = Vec::new();
        let merged = merge_statements(&s, &mut warnings);
        assert_eq!(merged.rows[1].items["Total Revenue"], json!(110));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("income_statement"));
    }

    #[test]
    fn test_has_column() {
        let merged = merge_statements(&statements(), &mut Vec::new());
        assert!(merged.has_column("Total Assets"));
        assert!(!merged.has_column("Net Receivables"));
    }

    #[test]
    fn test_empty_statements_merge_empty() {
        let s = FinancialStatements {
            ticker: "NONE".into(),
            currency: Currency::default(),
            income_statement: vec![],
            balance_sheet: vec![],
            cash_flow: vec![],
        };
        assert!(merge_statements(&s, &mut Vec::new()).is_empty());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let s: FinancialStatements = serde_json::from_value(json!({
            "ticker": "ACME",
            "income_statement": [{"period_end": "2023-12-31", "items": {"Total Revenue": 1}}]
        }))
        .unwrap();
        assert_eq!(s.currency, Currency::USD);
        assert!(s.balance_sheet.is_empty());
        assert_eq!(s.income_statement[0].fiscal_year(), 2023);
    }
}
