mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::forensics::{
    AnalyzeArgs, BeneishArgs, FeaturesArgs, PiotroskiArgs, RemArgs, RiskArgs,
};

/// Forensic financial statement analysis
#[derive(Parser)]
#[command(
    name = "fsa",
    version,
    about = "Forensic financial statement analysis",
    long_about = "Screens a company's annual statements for earnings manipulation risk \
                  using accrual-based and real earnings management proxies: Beneish \
                  M-Score, Piotroski F-Score, accruals ratio and a REM risk index, \
                  combined into a manipulation probability and risk band."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug detail (dropped years, defaulted inputs) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full forensic analysis
    Analyze(AnalyzeArgs),
    /// Build the feature table only
    Features(FeaturesArgs),
    /// Beneish M-Score proxy for the latest year
    Beneish(BeneishArgs),
    /// Piotroski F-Score proxy for the latest year
    Piotroski(PiotroskiArgs),
    /// Real earnings management risk index for the latest year
    Rem(RemArgs),
    /// Combine pre-computed sub-scores into a manipulation probability
    Risk(RiskArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// `-v` forces debug; otherwise `RUST_LOG` applies, defaulting to warn.
fn log_filter(verbose: bool, rust_log: Option<String>) -> String {
    if verbose {
        return "debug".to_string();
    }
    rust_log
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| "warn".to_string())
}

fn init_logging(verbose: bool) {
    let filter = log_filter(verbose, std::env::var("RUST_LOG").ok());
    env_logger::Builder::new()
        .parse_filters(&filter)
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::forensics::run_analyze(args),
        Commands::Features(args) => commands::forensics::run_features(args),
        Commands::Beneish(args) => commands::forensics::run_beneish(args),
        Commands::Piotroski(args) => commands::forensics::run_piotroski(args),
        Commands::Rem(args) => commands::forensics::run_rem(args),
        Commands::Risk(args) => commands::forensics::run_risk(args),
        Commands::Version => {
            println!("fsa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("run failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
