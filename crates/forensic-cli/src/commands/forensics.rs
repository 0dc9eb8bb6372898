use clap::Args;
use serde_json::Value;

use forensic_core::aggregator::{self, ManipulationRiskInput};
use forensic_core::features::{build_feature_table, FeatureTable};
use forensic_core::pipeline::{self, AnalysisConfig};
use forensic_core::provider::{InMemoryProvider, StatementProvider};
use forensic_core::scoring::{beneish, piotroski, rem};
use forensic_core::statements::{merge_statements, normalize, FinancialStatements};

use crate::input;

/// Decimal places for displayed feature tables.
const DISPLAY_DP: u32 = 3;

#[derive(Args)]
pub struct StatementArgs {
    /// Statements JSON file (one issuer object, or an array of them)
    #[arg(long)]
    pub input: Option<String>,

    /// Ticker to analyze when the input holds several issuers
    #[arg(long)]
    pub ticker: Option<String>,

    /// Label alias overrides (YAML or JSON)
    #[arg(long)]
    pub aliases: Option<String>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub statements: StatementArgs,

    /// Keep full decimal precision in the feature table
    #[arg(long)]
    pub full_precision: bool,
}

#[derive(Args)]
pub struct FeaturesArgs {
    #[command(flatten)]
    pub statements: StatementArgs,
}

#[derive(Args)]
pub struct BeneishArgs {
    #[command(flatten)]
    pub statements: StatementArgs,
}

#[derive(Args)]
pub struct PiotroskiArgs {
    #[command(flatten)]
    pub statements: StatementArgs,
}

#[derive(Args)]
pub struct RemArgs {
    #[command(flatten)]
    pub statements: StatementArgs,
}

#[derive(Args)]
pub struct RiskArgs {
    /// JSON with beneish_m_score, piotroski_f_score, accruals_ratio, rem_index
    #[arg(long)]
    pub input: Option<String>,
}

fn load_config(args: &StatementArgs) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = AnalysisConfig::default();
    if let Some(ref path) = args.aliases {
        config.aliases = input::file::read_aliases(path)?;
    }
    Ok(config)
}

/// Select the issuer to analyze from the input document.
fn load_statements(args: &StatementArgs) -> Result<FinancialStatements, Box<dyn std::error::Error>> {
    let data = input::stdin::read_input(args.input.as_deref())?;
    let mut issuers: Vec<FinancialStatements> = match data {
        Value::Array(_) => serde_json::from_value(data)?,
        _ => vec![serde_json::from_value(data)?],
    };

    match (&args.ticker, issuers.len()) {
        (Some(ticker), _) => {
            let provider = issuers
                .into_iter()
                .fold(InMemoryProvider::new(), |p, s| p.with(s));
            Ok(provider.fetch(ticker)?)
        }
        (None, 1) => Ok(issuers.remove(0)),
        (None, 0) => Err("input holds no issuer statements".into()),
        (None, n) => Err(format!("input holds {n} issuers; select one with --ticker").into()),
    }
}

fn load_features(args: &StatementArgs) -> Result<FeatureTable, Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let statements = load_statements(args)?;
    let mut warnings = Vec::new();
    let merged = merge_statements(&statements, &mut warnings);
    for w in &warnings {
        log::warn!("{w}");
    }
    Ok(build_feature_table(&normalize(&merged, &config.aliases))?)
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(&args.statements)?;
    let statements = load_statements(&args.statements)?;
    let mut result = pipeline::analyze(&statements, &config)?;
    if !args.full_precision {
        result.result.features = result.result.features.rounded(DISPLAY_DP);
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_features(args: FeaturesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_features(&args.statements)?;
    Ok(serde_json::to_value(table.rounded(DISPLAY_DP))?)
}

pub fn run_beneish(args: BeneishArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_features(&args.statements)?;
    let result = beneish::calculate_beneish_proxy(&table);
    Ok(serde_json::to_value(result)?)
}

pub fn run_piotroski(args: PiotroskiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_features(&args.statements)?;
    let result = piotroski::calculate_piotroski_proxy(&table)
        .ok_or("Piotroski F-Score needs at least two usable fiscal years")?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rem(args: RemArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_features(&args.statements)?;
    let result = rem::calculate_rem_risk(&table);
    Ok(serde_json::to_value(result)?)
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = input::stdin::read_input(args.input.as_deref())?;
    let input_data: ManipulationRiskInput = serde_json::from_value(data)?;
    let result = aggregator::calculate_manipulation_risk(&input_data)?;
    Ok(serde_json::to_value(result)?)
}
