//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::analysis::{AnalysisReport, Analyzer, ExternalInputs};
use crate::domain::backtest::{BacktestEngine, BacktestResult};
use crate::domain::catalog::StrategyKind;
use crate::domain::config_validation::{
    load_backtest_config, load_industry_averages, load_parameter_ranges, load_strategy_config,
    validate_strategy_config,
};
use crate::domain::error::QuantError;
use crate::domain::metrics::Metrics;
use crate::domain::optimizer::OptimizationResult;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_LOG_FILTER: &str = "quantcore=info";

#[derive(Parser, Debug)]
#[command(name = "quantcore", about = "Quantitative stock analysis and strategy backtesting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a symbol and produce a recommendation
    Analyze {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        symbol: String,
        /// Externally computed sentiment score in [0, 1]
        #[arg(long, default_value_t = 0.5)]
        sentiment: f64,
        /// Externally computed macroeconomic score in [0, 1]
        #[arg(long = "macro", default_value_t = 0.5)]
        macro_score: f64,
        /// INI file with an [industry] section of average ratios
        #[arg(long)]
        industry: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the configured strategy over a symbol's history
    Backtest {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Grid-search the configured strategy's parameters
    Optimize {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List catalog strategies and their default parameters
    Strategies,
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Analyze {
            data,
            symbol,
            sentiment,
            macro_score,
            industry,
            output,
        } => run_analyze(
            &data,
            &symbol,
            sentiment,
            macro_score,
            industry.as_deref(),
            output.as_deref(),
        ),
        Command::Backtest {
            data,
            symbol,
            config,
            output,
        } => run_backtest(&data, &symbol, &config, output.as_deref()),
        Command::Optimize {
            data,
            symbol,
            config,
            output,
        } => run_optimize(&data, &symbol, &config, output.as_deref()),
        Command::Strategies => {
            print!("{}", format_strategies());
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

fn clamp_score(name: &str, value: f64) -> f64 {
    let clamped = if value.is_nan() { 0.5 } else { value.clamp(0.0, 1.0) };
    if clamped != value {
        tracing::warn!(name, value, clamped, "score outside [0, 1]; clamped");
    }
    clamped
}

fn run_analyze(
    data: &Path,
    symbol: &str,
    sentiment: f64,
    macro_score: f64,
    industry: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), QuantError> {
    let industry = industry
        .map(|path| load_industry_averages(&FileConfigAdapter::from_file(path)?))
        .transpose()?;
    let adapter = CsvAdapter::new(data);
    let bars = adapter.fetch_prices(symbol)?;
    let reports = adapter.fetch_fundamentals(symbol)?;

    let external = ExternalInputs {
        sentiment: clamp_score("sentiment", sentiment),
        macro_score: clamp_score("macro", macro_score),
        industry,
    };
    let report = Analyzer::default().analyze(symbol, &bars, &reports, &external)?;

    print!("{}", format_analysis(&report));
    if let Some(path) = output {
        JsonReportAdapter::new().write_analysis(&report, path)?;
    }
    Ok(())
}

fn run_backtest(
    data: &Path,
    symbol: &str,
    config_path: &Path,
    output: Option<&Path>,
) -> Result<(), QuantError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let engine = BacktestEngine::new(load_backtest_config(&config)?);
    let (kind, overrides) = load_strategy_config(&config)?;
    let strategy = kind.build(&overrides)?;

    let bars = CsvAdapter::new(data).fetch_prices(symbol)?;
    tracing::info!(symbol, strategy = %strategy.name, bars = bars.len(), "running backtest");
    let result = engine.run(&strategy, &bars)?;

    print!("{}", format_backtest(symbol, &result));
    if let Some(path) = output {
        JsonReportAdapter::new().write_backtest(&result, path)?;
    }
    Ok(())
}

fn run_optimize(
    data: &Path,
    symbol: &str,
    config_path: &Path,
    output: Option<&Path>,
) -> Result<(), QuantError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let engine = BacktestEngine::new(load_backtest_config(&config)?);
    validate_strategy_config(&config)?;
    let (kind, base) = load_strategy_config(&config)?;
    let ranges = load_parameter_ranges(&config)?;

    let bars = CsvAdapter::new(data).fetch_prices(symbol)?;
    let result = engine.optimize(&bars, &ranges, |params| {
        let mut merged = base.clone();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), *v)));
        kind.build(&merged)
    })?;

    print!("{}", format_optimization(symbol, &result));
    if let Some(path) = output {
        JsonReportAdapter::new().write_optimization(&result, path)?;
    }
    Ok(())
}

pub fn format_strategies() -> String {
    let mut out = String::new();
    for kind in StrategyKind::ALL {
        out.push_str(&format!("{:<14} {}\n", kind.key(), kind.description()));
        for (name, value) in kind.default_parameters() {
            out.push_str(&format!("    {name} = {value}\n"));
        }
    }
    out
}

fn format_analysis(report: &AnalysisReport) -> String {
    let rec = &report.recommendation;
    let mut out = format!(
        "{} as of {} (close {:.2})\n\
         Recommendation: {} (score {:.3}, confidence {:.3})\n\
         Risk: {:?}  Horizon: {:?}\n\
         Scores: technical {:.3}, fundamental {:.3}, sentiment {:.3}, macro {:.3}\n\
         {}\n",
        report.symbol,
        report.as_of,
        report.price,
        rec.recommendation,
        rec.overall_score,
        rec.confidence,
        rec.risk_level,
        rec.time_horizon,
        report.scores.technical,
        report.scores.fundamental,
        report.scores.sentiment,
        report.scores.macro_score,
        rec.reasoning,
    );
    for reason in &report.signals.reasons {
        out.push_str(&format!("  + {reason}\n"));
    }
    for warning in &report.risk_warnings {
        out.push_str(&format!("  ! {warning}\n"));
    }
    out
}

fn format_metrics(metrics: &Metrics) -> String {
    metrics
        .to_map()
        .into_iter()
        .map(|(name, value)| format!("  {name:<24} {value:.4}\n"))
        .collect()
}

fn format_backtest(symbol: &str, result: &BacktestResult) -> String {
    format!(
        "{} on {}: {} trades, final capital {:.2}\n{}",
        result.strategy.name,
        symbol,
        result.trades.len(),
        result.final_capital,
        format_metrics(&result.metrics)
    )
}

fn format_optimization(symbol: &str, result: &OptimizationResult) -> String {
    let params: Vec<String> = result
        .best_parameters
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    format!(
        "{} on {}: {} combinations evaluated, {} failed, {} skipped\nbest: {}\n{}",
        result.best.strategy.name,
        symbol,
        result.runs.len(),
        result.failures.len(),
        result.skipped,
        params.join(", "),
        format_metrics(&result.best.metrics)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backtest_command() {
        let cli = Cli::try_parse_from([
            "quantcore", "backtest", "--data", "d", "--symbol", "AAA", "--config", "c.ini",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest { symbol, output, .. } => {
                assert_eq!(symbol, "AAA");
                assert!(output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn analyze_defaults_external_scores() {
        let cli = Cli::try_parse_from(["quantcore", "analyze", "--data", "d", "--symbol", "AAA"])
            .unwrap();
        match cli.command {
            Command::Analyze {
                sentiment,
                macro_score,
                industry,
                ..
            } => {
                assert_eq!(sentiment, 0.5);
                assert_eq!(macro_score, 0.5);
                assert!(industry.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn clamp_score_bounds() {
        assert_eq!(clamp_score("s", 1.4), 1.0);
        assert_eq!(clamp_score("s", -0.2), 0.0);
        assert_eq!(clamp_score("s", 0.3), 0.3);
        assert_eq!(clamp_score("s", f64::NAN), 0.5);
    }

    #[test]
    fn strategies_listing_covers_catalog() {
        let listing = format_strategies();
        for kind in StrategyKind::ALL {
            assert!(listing.contains(kind.key()));
        }
        assert!(listing.contains("notional = 10000"));
    }
}
