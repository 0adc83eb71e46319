use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::{error, info};

mod analytics;
mod config;
mod data;
mod web;

use analytics::betting::{backtest_report, HistoricalGame};
use config::{Command, Config};
use data::{spawn_reload_task, Artifacts, DataStore};
use web::{AppState, CachePolicy};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    match config.command() {
        Command::Serve => serve(&config).await,
        Command::Check => check(&config),
        Command::Backtest {
            games,
            thresholds,
            stake,
            kelly_fraction,
            starting_bankroll,
        } => {
            let raw = std::fs::read(&games)
                .with_context(|| format!("reading {}", games.display()))?;
            let games: Vec<HistoricalGame> = serde_json::from_slice(&raw)
                .with_context(|| format!("parsing {}", games.display()))?;
            info!(
                "Backtesting {} games across {} edge gates",
                games.len(),
                thresholds.len()
            );
            let report =
                backtest_report(&games, &thresholds, stake, kelly_fraction, starting_bankroll);
            info!(
                "Kelly x{}: bankroll {:.2} -> {:.2} over {} bets",
                kelly_fraction,
                starting_bankroll,
                report.kelly.final_bankroll,
                report.kelly.metrics.bets
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

async fn serve(config: &Config) -> Result<()> {
    let store = DataStore::open(&config.data_dir)
        .with_context(|| format!("loading artifacts from {}", config.data_dir.display()))?;

    if config.reload_interval_secs > 0 {
        spawn_reload_task(
            store.clone(),
            Duration::from_secs(config.reload_interval_secs),
        );
    }

    let state = AppState {
        store,
        cache: CachePolicy {
            predictions_secs: config.predictions_cache_secs,
            goalie_secs: config.goalie_cache_secs,
            stale_while_revalidate_secs: config.stale_while_revalidate_secs,
        },
    };
    let app = web::router(state, config.static_dir.as_deref());

    let addr = config.listen_addr()?;
    info!("🏒 Puckcast listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run site server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}

fn check(config: &Config) -> Result<()> {
    match Artifacts::load(&config.data_dir) {
        Ok(a) => {
            println!(
                "{}: {} games, {} goalies, {} strategies, {} teams",
                config.data_dir.display(),
                a.predictions.games.len(),
                a.goalie_pulse.goalies.len(),
                a.insights.strategies.len(),
                a.standings.teams.len()
            );
            Ok(())
        }
        Err(e) => {
            error!("Artifact check failed: {}", e);
            anyhow::bail!("artifact check failed: {}", e)
        }
    }
}
