use forensic_core::aggregator::{
    accruals_contribution, calculate_manipulation_risk, ManipulationRiskInput, RiskBand,
};
use forensic_core::features::{FeatureRow, FeatureTable};
use forensic_core::pipeline::score_features;
use forensic_core::scoring::{calculate_piotroski_proxy, calculate_rem_risk};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Helpers
// ===========================================================================

fn row(year: i32) -> FeatureRow {
    FeatureRow {
        year,
        revenue: dec!(100),
        net_income: dec!(10),
        operating_cash_flow: dec!(20),
        total_assets: dec!(200),
        receivables: None,
        cogs: None,
        gross_margin: None,
        accruals_ratio: Some(dec!(-0.05)),
        roa: Some(dec!(0.05)),
        ocf_to_revenue: Some(dec!(0.2)),
        revenue_growth: None,
        ocf_growth: None,
        sales_cash_gap: None,
        cogs_to_revenue: None,
    }
}

fn table(rows: Vec<FeatureRow>) -> FeatureTable {
    FeatureTable {
        rows,
        dropped: vec![],
    }
}

// ===========================================================================
// REM
// ===========================================================================

#[test]
fn test_rem_all_three_flags() {
    let mut prior = row(2022);
    prior.cogs_to_revenue = Some(dec!(0.50));
    let mut current = row(2023);
    current.ocf_to_revenue = Some(dec!(0.05));
    current.sales_cash_gap = Some(dec!(0.15));
    current.cogs_to_revenue = Some(dec!(0.46));

    let out = calculate_rem_risk(&table(vec![prior, current]));
    assert_eq!(out.cogs_to_revenue_change, Some(dec!(-0.08)));
    assert!(out.low_cash_conversion);
    assert!(out.sales_outpacing_cash);
    assert!(out.cost_compression);
    assert_eq!(out.index, Decimal::ONE);
}

#[test]
fn test_rem_null_inputs_score_zero() {
    let mut current = row(2023);
    current.ocf_to_revenue = None;
    let out = calculate_rem_risk(&table(vec![row(2022), current]));
    assert_eq!(out.index, Decimal::ZERO);
    assert_eq!(out.unevaluated.len(), 3);
}

// ===========================================================================
// Piotroski null semantics
// ===========================================================================

#[test]
fn test_piotroski_null_comparisons_are_false() {
    let mut prior = row(2022);
    prior.roa = None;
    let mut current = row(2023);
    current.roa = Some(dec!(0.5));
    current.gross_margin = Some(dec!(0.9));
    let out = calculate_piotroski_proxy(&table(vec![prior, current])).unwrap();
    // Null prior ROA and null prior margin fail signals 3 and 6;
    // null revenue growth fails signal 5.
    assert!(!out.roa_improving);
    assert!(!out.gross_margin_improving);
    assert!(!out.revenue_growing);
    // NI > 0, OCF > 0, OCF > NI, assets flat.
    assert_eq!(out.f_score, 4);
}

// ===========================================================================
// Aggregator
// ===========================================================================

#[test]
fn test_accruals_examples() {
    assert_eq!(accruals_contribution(Some(dec!(0.03))), Decimal::ZERO);
    assert_eq!(accruals_contribution(Some(dec!(0.07))), dec!(0.5));
    assert_eq!(accruals_contribution(Some(dec!(0.5))), Decimal::ONE);
}

#[test]
fn test_probability_bounded_over_input_grid() {
    let m_scores = [None, Some(dec!(-5)), Some(dec!(-2.22)), Some(dec!(-1)), Some(dec!(3))];
    let f_scores = [None, Some(0u8), Some(4), Some(7)];
    let accruals = [None, Some(dec!(0)), Some(dec!(-0.07)), Some(dec!(2))];
    let rems = [Decimal::ZERO, Decimal::ONE / dec!(3), dec!(2) / dec!(3), Decimal::ONE];
    for m in m_scores {
        for f in f_scores {
            for a in accruals {
                for r in rems {
                    let out = calculate_manipulation_risk(&ManipulationRiskInput {
                        beneish_m_score: m,
                        piotroski_f_score: f,
                        accruals_ratio: a,
                        rem_index: r,
                    })
                    .unwrap();
                    let p = out.manipulation_probability;
                    assert!(p >= Decimal::ZERO && p <= dec!(100), "p = {p}");
                    let expected_band = if p < dec!(30) {
                        RiskBand::Low
                    } else if p < dec!(60) {
                        RiskBand::Moderate
                    } else {
                        RiskBand::High
                    };
                    assert_eq!(out.risk_band, expected_band);
                }
            }
        }
    }
}

#[test]
fn test_score_features_on_handbuilt_table() {
    let mut current = row(2023);
    current.accruals_ratio = Some(dec!(0.12));
    current.ocf_to_revenue = Some(dec!(0.08));
    let scores = score_features(&table(vec![row(2022), current])).unwrap();
    assert_eq!(scores.year, 2023);
    assert_eq!(scores.abs_accruals_ratio, Some(dec!(0.12)));
    assert_eq!(scores.risk.contributions.accruals, Decimal::ONE);
    assert!(scores.rem.low_cash_conversion);
}
