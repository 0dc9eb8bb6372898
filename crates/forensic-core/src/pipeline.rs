//! End-to-end forensic analysis: statements → features → scores → risk.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregator::{calculate_manipulation_risk, ManipulationRiskInput, ManipulationRiskOutput, RiskBand};
use crate::diagnostics::{build_diagnostics, Diagnostics};
use crate::error::ForensicError;
use crate::features::{build_feature_table, FeatureTable};
use crate::numeric::round_opt;
use crate::provider::StatementProvider;
use crate::scoring::{
    calculate_beneish_proxy, calculate_piotroski_proxy, calculate_rem_risk, BeneishProxyOutput,
    PiotroskiProxyOutput, RemRiskOutput,
};
use crate::statements::{merge_statements, normalize, AliasTable, FinancialStatements};
use crate::types::{with_metadata, ComputationOutput, Currency, FiscalYear, Rate};
use crate::ForensicResult;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Run configuration, passed explicitly into every analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub aliases: AliasTable,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Full-precision scores for the latest fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub year: FiscalYear,
    pub beneish: BeneishProxyOutput,
    pub piotroski: Option<PiotroskiProxyOutput>,
    pub accruals_ratio: Option<Rate>,
    pub abs_accruals_ratio: Option<Rate>,
    pub rem: RemRiskOutput,
    pub risk: ManipulationRiskOutput,
}

/// Display-rounded headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub beneish_m_score: Option<Decimal>,
    pub piotroski_f_score: Option<u8>,
    pub accruals_ratio: Option<Decimal>,
    pub rem_score: Decimal,
    pub manipulation_probability: Decimal,
    pub risk_band: RiskBand,
}

impl From<&ScoreSet> for Scorecard {
    fn from(s: &ScoreSet) -> Self {
        Scorecard {
            beneish_m_score: round_opt(s.beneish.m_score, 2),
            piotroski_f_score: s.piotroski.as_ref().map(|p| p.f_score),
            accruals_ratio: round_opt(s.abs_accruals_ratio, 3),
            rem_score: s.rem.index.round_dp(2),
            manipulation_probability: s.risk.manipulation_probability,
            risk_band: s.risk.risk_band,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForensicReport {
    pub ticker: String,
    pub currency: Currency,
    pub features: FeatureTable,
    pub scores: ScoreSet,
    pub scorecard: Scorecard,
    pub diagnostics: Diagnostics,
    pub conclusion: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score the latest year of a feature table.
///
/// Fails only when the table is empty; every other shortfall yields null
/// sub-scores handled by the aggregator's defaults.
pub fn score_features(table: &FeatureTable) -> ForensicResult<ScoreSet> {
    let latest = table.latest().ok_or_else(|| {
        ForensicError::InsufficientData("No fiscal year carries all mandatory line items".into())
    })?;

    let beneish = calculate_beneish_proxy(table);
    let piotroski = calculate_piotroski_proxy(table);
    let rem = calculate_rem_risk(table);
    let accruals_ratio = latest.accruals_ratio;

    let risk = calculate_manipulation_risk(&ManipulationRiskInput {
        beneish_m_score: beneish.m_score,
        piotroski_f_score: piotroski.as_ref().map(|p| p.f_score),
        accruals_ratio,
        rem_index: rem.index,
    })?;

    Ok(ScoreSet {
        year: latest.year,
        beneish,
        piotroski,
        accruals_ratio,
        abs_accruals_ratio: accruals_ratio.map(|a| a.abs()),
        rem,
        risk,
    })
}

/// Narrative summary of the composite result.
pub fn conclusion(band: RiskBand, probability: Decimal) -> String {
    format!(
        "Overall Assessment: {band} Earnings Manipulation Risk. \
         The company shows an estimated earnings manipulation probability of {probability}%. \
         The analysis combines accrual-based indicators (Beneish M-Score, Accruals Ratio), \
         financial quality signals (Piotroski F-Score) and Real Earnings Management (REM) \
         indicators capturing early managerial behavior. These results are risk signals, \
         not evidence of fraud, and are intended to support audit planning, investment \
         analysis and credit evaluation."
    )
}

fn score_warnings(table: &FeatureTable, scores: &ScoreSet, warnings: &mut Vec<String>) {
    for d in &table.dropped {
        let missing: Vec<&str> = d.missing.iter().map(|f| f.name()).collect();
        warnings.push(format!(
            "Fiscal year {} excluded: missing {}",
            d.year,
            missing.join(", ")
        ));
    }
    if !scores.beneish.defaulted.is_empty() {
        warnings.push(format!(
            "Beneish {} unavailable; defaulted to 1",
            scores.beneish.defaulted.join(", ")
        ));
    }
    if scores.beneish.m_score.is_none() {
        warnings.push("Beneish M-Score unavailable: latest accruals ratio is null".into());
    }
    if scores.piotroski.is_none() {
        warnings.push(format!(
            "Piotroski F-Score unavailable: {} usable year(s), 2 required; scored as high risk",
            table.len()
        ));
    }
    if scores.accruals_ratio.is_none() {
        warnings.push("Accruals ratio unavailable; scored as high risk".into());
    }
    for signal in &scores.rem.unevaluated {
        warnings.push(format!("REM signal {signal:?} not evaluated (null input); scored 0"));
    }
}

/// Run the full pipeline on already-fetched statements.
pub fn analyze(
    statements: &FinancialStatements,
    config: &AnalysisConfig,
) -> ForensicResult<ComputationOutput<ForensicReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // -- Validation ----------------------------------------------------------
    let ticker = statements.ticker.trim();
    if ticker.is_empty() {
        return Err(ForensicError::InvalidInput {
            field: "ticker".into(),
            reason: "Ticker must not be empty".into(),
        });
    }

    // -- Intake ---------------------------------------------------------------
    let merged = merge_statements(statements, &mut warnings);
    if merged.is_empty() {
        return Err(ForensicError::FetchError {
            ticker: ticker.to_string(),
            reason: "no fiscal year is present in all three statements".into(),
        });
    }
    let records = normalize(&merged, &config.aliases);

    // -- Features and scores --------------------------------------------------
    let features = build_feature_table(&records)?;
    let scores = score_features(&features)?;
    score_warnings(&features, &scores, &mut warnings);

    let scorecard = Scorecard::from(&scores);
    log::info!(
        "{ticker}: {} year(s) scored, probability {}% ({})",
        features.len(),
        scorecard.manipulation_probability,
        scorecard.risk_band
    );

    let report = ForensicReport {
        ticker: ticker.to_string(),
        currency: statements.currency.clone(),
        diagnostics: build_diagnostics(&features),
        conclusion: conclusion(scorecard.risk_band, scorecard.manipulation_probability),
        features,
        scores,
        scorecard,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "statement_join": "inner join on fiscal year",
        "mandatory_items": ["Revenue", "Net_Income", "OCF", "Total_Assets"],
        "beneish_defaults": "DSRI, GMI, SGI default to 1 without a valid change",
        "piotroski_null_comparison": "false",
        "piotroski_missing": "scored as high risk",
        "rem_null_flag": "0",
        "risk_bands": "Low < 30 <= Moderate < 60 <= High"
    });

    Ok(with_metadata(
        "Forensic earnings manipulation screen (Beneish / Piotroski / REM proxies)",
        &assumptions,
        warnings,
        elapsed,
        report,
    ))
}

/// Fetch statements for `ticker` and analyze them.
pub fn run_for_ticker<P: StatementProvider + ?Sized>(
    provider: &P,
    ticker: &str,
    config: &AnalysisConfig,
) -> ForensicResult<ComputationOutput<ForensicReport>> {
    if ticker.trim().is_empty() {
        return Err(ForensicError::InvalidInput {
            field: "ticker".into(),
            reason: "Ticker must not be empty".into(),
        });
    }
    let statements = provider.fetch(ticker)?;
    analyze(&statements, config)
}
