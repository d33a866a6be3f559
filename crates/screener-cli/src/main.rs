use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use screener_core::{PriceSummary, ScoreResult};
use value_screener::{
    render_table, render_top_picks, resolve_ticker, save_csv, CachedProvider, FundamentalsCache,
    ScanReport, ScannerConfig, StockUniverse, ValueScreener,
};
use yahoo_client::YahooFinanceClient;

mod config;

use config::{split_symbols, ScreenerConfig};

const USAGE: &str = "\
Usage:
  screener [--symbols A B C | --universe nifty|us-large] [--csv PATH] [--top] [--json]
  screener analyze SYMBOL";

const HISTORY_RANGE: &str = "5y";

#[derive(Debug, Default, PartialEq)]
struct ScanArgs {
    symbols: Vec<String>,
    universe: Option<String>,
    csv: Option<PathBuf>,
    top_only: bool,
    json: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Scan(ScanArgs),
    Analyze(String),
    Help,
}

fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();

    if args.peek().map(String::as_str) == Some("analyze") {
        args.next();
        let symbol = args.next().context("analyze needs a SYMBOL")?;
        if let Some(extra) = args.next() {
            bail!("Unexpected argument after symbol: {}", extra);
        }
        return Ok(Command::Analyze(symbol));
    }

    let mut scan = ScanArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--symbols" => {
                while let Some(next) = args.next_if(|a| !a.starts_with("--")) {
                    scan.symbols.extend(split_symbols(&next));
                }
                if scan.symbols.is_empty() {
                    bail!("--symbols needs at least one symbol");
                }
            }
            "--universe" => {
                scan.universe = Some(args.next().context("--universe needs a name")?);
            }
            "--csv" => {
                scan.csv = Some(PathBuf::from(args.next().context("--csv needs a path")?));
            }
            "--top" => scan.top_only = true,
            "--json" => scan.json = true,
            "-h" | "--help" => return Ok(Command::Help),
            other => bail!("Unknown argument: {}\n{}", other, USAGE),
        }
    }

    Ok(Command::Scan(scan))
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so stdout stays clean for the table or JSON.
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    let command = parse_args(std::env::args().skip(1))?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = ScreenerConfig::from_env()?;
    tracing::info!(
        "Configuration loaded: suffix {:?}, concurrency {}, Yahoo limit {}/min, cache TTL {}s",
        config.exchange_suffix,
        config.max_concurrency,
        config.yahoo_rate_limit,
        config.cache_ttl_secs
    );

    let yahoo = Arc::new(YahooFinanceClient::with_limits(
        config.yahoo_rate_limit,
        Duration::from_secs(config.yahoo_timeout_secs),
    ));
    let cache = Arc::new(FundamentalsCache::new(chrono::Duration::seconds(
        config.cache_ttl_secs,
    )));
    let provider = Arc::new(CachedProvider::new(yahoo.clone(), cache));

    let screener = ValueScreener::new(provider).with_config(ScannerConfig {
        max_concurrency: config.max_concurrency,
        exchange_suffix: config.exchange_suffix.clone(),
    });

    match command {
        Command::Scan(args) => run_scan(&screener, &config, args).await,
        Command::Analyze(symbol) => run_analyze(&screener, &yahoo, &config, &symbol).await,
        Command::Help => Ok(()),
    }
}

async fn run_scan(screener: &ValueScreener, config: &ScreenerConfig, args: ScanArgs) -> Result<()> {
    let universe = if !args.symbols.is_empty() {
        StockUniverse::Custom(args.symbols)
    } else if let Some(name) = &args.universe {
        name.parse().map_err(anyhow::Error::msg)?
    } else {
        config.stock_universe()?
    };

    let report = screener.scan_universe(&universe).await;
    let rows = exported_rows(&report, args.top_only);

    if args.json && args.top_only {
        let top = ScanReport {
            results: rows.clone(),
            ..report.clone()
        };
        println!("{}", serde_json::to_string_pretty(&top)?);
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.top_only {
        println!("{}", render_top_picks(&report));
    } else {
        println!("{}", render_table(&report));
    }

    if let Some(path) = args.csv.or_else(|| config.report_path.clone()) {
        let saved = save_csv(&rows, &path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("💾 Report saved to {}", saved.display());
    }

    Ok(())
}

/// Rows for export: every result, or only the top picks.
fn exported_rows(report: &ScanReport, top_only: bool) -> Vec<ScoreResult> {
    report
        .results
        .iter()
        .filter(|r| !top_only || r.is_top_pick())
        .cloned()
        .collect()
}

async fn run_analyze(
    screener: &ValueScreener,
    yahoo: &YahooFinanceClient,
    config: &ScreenerConfig,
    symbol: &str,
) -> Result<()> {
    let result = screener
        .analyze_symbol(symbol)
        .await
        .with_context(|| format!("Analysis failed for {}", symbol))?;

    print_analysis(&result);

    let ticker = resolve_ticker(symbol, &config.exchange_suffix);
    let bars = match yahoo.get_price_history(&ticker, HISTORY_RANGE).await {
        Ok(bars) => bars,
        Err(e) => {
            tracing::warn!("Price history unavailable for {}: {}", ticker, e);
            Vec::new()
        }
    };

    println!();
    match PriceSummary::from_bars(&bars) {
        Some(summary) => {
            println!("📈 Price history ({}, {} sessions)", HISTORY_RANGE, bars.len());
            println!(
                "  {} -> {}",
                summary.start.format("%Y-%m-%d"),
                summary.end.format("%Y-%m-%d")
            );
            println!(
                "  First {:.2}  Last {:.2}  Low {:.2}  High {:.2}",
                summary.first_close, summary.last_close, summary.min_close, summary.max_close
            );
            println!("  Total return {:.2}%", summary.total_return_percent);
        }
        None => println!("No price history available."),
    }

    Ok(())
}

fn print_analysis(result: &ScoreResult) {
    println!("🔍 {}", result.symbol);
    println!(
        "Verdict: {} ({}/4, {})",
        result.recommendation.label(),
        result.score,
        result.recommendation.color()
    );
    println!(
        "Price {:.2} | Intrinsic {:.2} | {}",
        result.price,
        result.intrinsic_value,
        result.valuation_label()
    );
    println!();

    for row in result.checklist_rows() {
        let mark = if row.passed { "PASS" } else { "FAIL" };
        println!("  [{}] {:<30} {}", mark, row.criterion, row.value);
    }

    for warning in &result.warnings {
        println!("  ⚠️  {}", warning);
    }

    if let Some(summary) = &result.company_summary {
        println!();
        println!("{}", summary);
    }
}
