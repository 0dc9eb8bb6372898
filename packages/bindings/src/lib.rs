use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use forensic_core::aggregator::ManipulationRiskInput;
use forensic_core::pipeline::AnalysisConfig;
use forensic_core::statements::{merge_statements, normalize, FinancialStatements};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Statements plus an optional configuration override.
#[derive(Deserialize)]
struct AnalysisRequest {
    statements: FinancialStatements,
    #[serde(default)]
    config: AnalysisConfig,
}

fn parse_request(input_json: &str) -> NapiResult<AnalysisRequest> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_statements(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output =
        forensic_core::analyze(&request.statements, &request.config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_features(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let merged = merge_statements(&request.statements, &mut Vec::new());
    let records = normalize(&merged, &request.config.aliases);
    let table = forensic_core::features::build_feature_table(&records).map_err(to_napi_error)?;
    serde_json::to_string(&table.rounded(3)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

#[napi]
pub fn manipulation_risk(input_json: String) -> NapiResult<String> {
    let input: ManipulationRiskInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = forensic_core::aggregator::calculate_manipulation_risk(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
