//! signal-runner: compute fundamental signals for tickers in a fundamentals file.
//!
//! Reads a JSON array of per-period fundamentals, scores the latest two periods of each
//! requested ticker and prints one `{"result": ...}` document per ticker on stdout.
//!
//! Usage:
//!   cargo run -p signal-runner -- --tickers AAPL MSFT
//!   cargo run -p signal-runner -- --all --pretty
//!   cargo run -p signal-runner -- --filing-quarter

mod config;

use std::sync::Arc;

use analysis_core::{
    quarter_end_date, AnalysisError, Clock, Fundamentals, PeriodResolver, SignalResponse,
    SystemClock,
};
use anyhow::{bail, Context, Result};
use fundamental_analysis::{
    FundamentalSignalEngine, InMemoryFundamentalsRepository, SentimentThresholds, SignalAggregator,
};
use serde_json::json;

use config::RunnerConfig;

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

async fn load_fundamentals(config: &RunnerConfig) -> Result<InMemoryFundamentalsRepository> {
    let raw = tokio::fs::read_to_string(&config.fundamentals_path)
        .await
        .with_context(|| format!("reading {}", config.fundamentals_path.display()))?;
    let records: Vec<Fundamentals> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", config.fundamentals_path.display()))?;

    let repository = InMemoryFundamentalsRepository::new();
    let inserted = repository.extend(records)?;
    tracing::info!(
        "Loaded {} fiscal periods from {}",
        inserted,
        config.fundamentals_path.display()
    );
    Ok(repository)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = RunnerConfig::from_env()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "signal_runner=info,fundamental_analysis=info".into());
    if config.json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let args: Vec<String> = std::env::args().collect();
    let pretty = args.iter().any(|a| a == "--pretty");
    let use_all = args.iter().any(|a| a == "--all");
    let filing_quarter = args.iter().any(|a| a == "--filing-quarter");
    let tickers: Vec<String> = args
        .iter()
        .skip_while(|a| *a != "--tickers")
        .skip(1)
        .take_while(|a| !a.starts_with("--"))
        .map(|t| t.to_uppercase())
        .collect();

    if filing_quarter {
        let now = SystemClock.now();
        let quarter = PeriodResolver::new().most_recent_filing_quarter(now);
        tracing::info!("Most recent complete filing quarter as of {}: {}", now, quarter);
        print_json(
            &json!({
                "filingQuarter": quarter,
                "quarterEnd": quarter_end_date(quarter.year, quarter.quarter).to_string(),
            }),
            pretty,
        )?;
        if tickers.is_empty() && !use_all {
            return Ok(());
        }
    }

    if tickers.is_empty() && !use_all {
        bail!("nothing to do: pass --tickers T1 T2 ..., --all, or --filing-quarter");
    }

    let thresholds = SentimentThresholds::new(config.bullish_threshold, config.bearish_threshold)?;
    let repository = Arc::new(load_fundamentals(&config).await?);
    let engine = FundamentalSignalEngine::new(repository)
        .with_aggregator(SignalAggregator::with_thresholds(thresholds));

    let outcomes: Vec<(String, Result<_, AnalysisError>)> = if use_all {
        engine.compute_all().await?
    } else {
        let mut outcomes = Vec::with_capacity(tickers.len());
        for ticker in &tickers {
            outcomes.push((ticker.clone(), engine.compute(ticker).await));
        }
        outcomes
    };

    let mut failures = 0usize;
    for (ticker, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                print_json(&serde_json::to_value(SignalResponse::from(result))?, pretty)?;
            }
            Err(e) => {
                failures += 1;
                tracing::error!("{}: {}", ticker, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} ticker(s) could not be scored", failures);
    }
    Ok(())
}
