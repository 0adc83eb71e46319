use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Puckcast NHL prediction site
#[derive(Parser, Debug, Clone)]
#[command(name = "puckcast-site", version, about)]
pub struct Config {
    /// Site listen address
    #[arg(long, env = "SITE_ADDR", default_value = "0.0.0.0:3000", global = true)]
    pub listen_addr: String,

    /// Directory holding the model's JSON artifacts
    #[arg(long, env = "DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Optional directory served under /static (logos, images)
    #[arg(long, env = "STATIC_DIR", global = true)]
    pub static_dir: Option<PathBuf>,

    /// Re-read the data directory every N seconds (0 = only at startup)
    #[arg(long, env = "RELOAD_INTERVAL_SECS", default_value = "0", global = true)]
    pub reload_interval_secs: u64,

    /// Shared-cache fresh window for /api/predictions
    #[arg(long, env = "PREDICTIONS_CACHE_SECS", default_value = "60", global = true)]
    pub predictions_cache_secs: u64,

    /// Shared-cache fresh window for /api/goalie-pulse
    #[arg(long, env = "GOALIE_CACHE_SECS", default_value = "300", global = true)]
    pub goalie_cache_secs: u64,

    /// stale-while-revalidate window for both JSON endpoints
    #[arg(
        long,
        env = "STALE_WHILE_REVALIDATE_SECS",
        default_value = "300",
        global = true
    )]
    pub stale_while_revalidate_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Serve the site (default)
    Serve,
    /// Load and validate every artifact, then exit
    Check,
    /// Backtest edge gates over historical games and print strategy summaries as JSON
    Backtest {
        /// JSON array of settled games (modelProbHome, homeOdds, awayOdds, homeWin)
        #[arg(long)]
        games: PathBuf,

        /// Edge gates in percentage points
        #[arg(long, value_delimiter = ',', default_value = "0,5,10,15")]
        thresholds: Vec<f64>,

        /// Flat stake per bet (one unit)
        #[arg(long, default_value = "100.0")]
        stake: f64,

        /// Fraction of full Kelly for the compounding simulation
        #[arg(long, default_value = "0.25")]
        kelly_fraction: f64,

        /// Starting bankroll for the Kelly simulation
        #[arg(long, default_value = "10000.0")]
        starting_bankroll: f64,
    },
}

impl Config {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address '{}': {}", self.listen_addr, e))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.listen_addr()?;
        if self.predictions_cache_secs == 0 {
            anyhow::bail!("predictions_cache_secs must be positive");
        }
        if self.goalie_cache_secs == 0 {
            anyhow::bail!("goalie_cache_secs must be positive");
        }
        if let Some(Command::Backtest {
            thresholds,
            stake,
            kelly_fraction,
            starting_bankroll,
            ..
        }) = &self.command
        {
            if *stake <= 0.0 {
                anyhow::bail!("stake must be positive");
            }
            if !(*kelly_fraction > 0.0 && *kelly_fraction <= 1.0) {
                anyhow::bail!("kelly_fraction must be in (0, 1]");
            }
            if *starting_bankroll <= 0.0 {
                anyhow::bail!("starting_bankroll must be positive");
            }
            if thresholds.is_empty() {
                anyhow::bail!("at least one threshold is required");
            }
            if thresholds.iter().any(|t| !(0.0..=50.0).contains(t)) {
                anyhow::bail!("thresholds must be between 0 and 50 edge points");
            }
        }
        Ok(())
    }
}
