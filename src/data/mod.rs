use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod models;
use models::*;

pub const PREDICTIONS_FILE: &str = "todaysPredictions.json";
pub const GOALIE_PULSE_FILE: &str = "goaliePulse.json";
pub const INSIGHTS_FILE: &str = "modelInsights.json";
pub const STANDINGS_FILE: &str = "currentStandings.json";

/// Allowed drift of home + away probability away from 1.0
const PROB_SUM_TOLERANCE: f64 = 0.02;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("artifact {path} is missing")]
    Missing { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, DataError>;

/// What to do with an artifact file that does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnMissing {
    /// Startup: serve an empty payload
    Empty,
    /// Reload: the file may be mid-replacement, so keep what is live
    Fail,
}

/// One consistent set of model artifacts
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    pub predictions: PredictionsPayload,
    pub goalie_pulse: GoaliePulse,
    pub insights: ModelInsights,
    pub standings: StandingsPayload,
}

impl Artifacts {
    /// Read and validate every artifact under `dir`.
    ///
    /// A missing file yields an empty payload; a malformed or invalid one is
    /// an error.
    pub fn load(dir: &Path) -> Result<Self> {
        Self::load_with(dir, OnMissing::Empty)
    }

    fn load_with(dir: &Path, on_missing: OnMissing) -> Result<Self> {
        let predictions: PredictionsPayload =
            read_artifact(&dir.join(PREDICTIONS_FILE), on_missing)?;
        validate_predictions(&dir.join(PREDICTIONS_FILE), &predictions)?;

        let goalie_pulse: GoaliePulse = read_artifact(&dir.join(GOALIE_PULSE_FILE), on_missing)?;
        validate_goalies(&dir.join(GOALIE_PULSE_FILE), &goalie_pulse)?;

        let insights: ModelInsights = read_artifact(&dir.join(INSIGHTS_FILE), on_missing)?;
        validate_insights(&dir.join(INSIGHTS_FILE), &insights)?;

        let standings: StandingsPayload = read_artifact(&dir.join(STANDINGS_FILE), on_missing)?;

        Ok(Artifacts {
            predictions,
            goalie_pulse,
            insights,
            standings,
        })
    }
}

/// Shared handle to the current artifact snapshot.
///
/// Readers take a cheap `Arc` clone; a reload swaps the whole snapshot so a
/// render never sees a mix of old and new files.
#[derive(Clone)]
pub struct DataStore {
    dir: PathBuf,
    current: Arc<RwLock<Arc<Artifacts>>>,
}

impl DataStore {
    /// Load artifacts from `dir`. Fails if any present file is malformed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let artifacts = Artifacts::load(&dir)?;
        log_counts(&dir, &artifacts);
        Ok(DataStore {
            dir,
            current: Arc::new(RwLock::new(Arc::new(artifacts))),
        })
    }

    /// Build a store around already-loaded artifacts
    #[cfg(test)]
    pub fn from_artifacts(dir: impl Into<PathBuf>, artifacts: Artifacts) -> Self {
        DataStore {
            dir: dir.into(),
            current: Arc::new(RwLock::new(Arc::new(artifacts))),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Artifacts> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Re-read the data directory. On failure the previous snapshot stays live.
    ///
    /// Unlike startup, a missing file is an error here: the job that writes
    /// artifacts may have removed it just before writing the new one.
    pub fn reload(&self) -> Result<()> {
        let artifacts = Artifacts::load_with(&self.dir, OnMissing::Fail)?;
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(artifacts);
        debug!("Artifacts reloaded from {}", self.dir.display());
        Ok(())
    }
}

/// Spawn a task that reloads the store every `interval`.
pub fn spawn_reload_task(store: DataStore, interval: Duration) {
    tokio::spawn(async move {
        info!(
            "Artifact reload task started (dir={}, interval={:?})",
            store.dir().display(),
            interval
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick fires immediately; the store was loaded at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = store.reload() {
                warn!("Artifact reload failed, keeping previous snapshot: {}", e);
            }
        }
    });
}

fn log_counts(dir: &Path, artifacts: &Artifacts) {
    info!(
        "Loaded artifacts from {}: {} games, {} goalies, {} strategies, {} teams",
        dir.display(),
        artifacts.predictions.games.len(),
        artifacts.goalie_pulse.goalies.len(),
        artifacts.insights.strategies.len(),
        artifacts.standings.teams.len()
    );
}

// ── Loading helpers ───────────────────────────────────────────────────────────

fn read_artifact<T: DeserializeOwned + Default>(path: &Path, on_missing: OnMissing) -> Result<T> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if on_missing == OnMissing::Fail {
                return Err(DataError::Missing {
                    path: path.to_path_buf(),
                });
            }
            warn!("{} not found, using empty payload", path.display());
            return Ok(T::default());
        }
        Err(source) => {
            return Err(DataError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn is_prob(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

fn invalid(path: &Path, reason: String) -> DataError {
    DataError::Invalid {
        path: path.to_path_buf(),
        reason,
    }
}

fn validate_predictions(path: &Path, payload: &PredictionsPayload) -> Result<()> {
    for game in &payload.games {
        if !is_prob(game.home_win_prob) || !is_prob(game.away_win_prob) {
            return Err(invalid(
                path,
                format!(
                    "game {}: probabilities out of range ({}, {})",
                    game.id, game.home_win_prob, game.away_win_prob
                ),
            ));
        }
        let sum = game.home_win_prob + game.away_win_prob;
        if (sum - 1.0).abs() > PROB_SUM_TOLERANCE {
            return Err(invalid(
                path,
                format!("game {}: probabilities sum to {:.3}", game.id, sum),
            ));
        }
    }
    Ok(())
}

fn validate_goalies(path: &Path, pulse: &GoaliePulse) -> Result<()> {
    for card in &pulse.goalies {
        if !is_prob(card.start_likelihood) {
            return Err(invalid(
                path,
                format!(
                    "goalie {}: start likelihood {} out of range",
                    card.name, card.start_likelihood
                ),
            ));
        }
    }
    Ok(())
}

fn validate_insights(path: &Path, insights: &ModelInsights) -> Result<()> {
    if !is_prob(insights.overall.accuracy) {
        return Err(invalid(
            path,
            format!("accuracy {} out of range", insights.overall.accuracy),
        ));
    }
    for s in &insights.strategies {
        if !is_prob(s.win_rate) {
            return Err(invalid(
                path,
                format!("strategy {}: win rate {} out of range", s.name, s.win_rate),
            ));
        }
    }
    Ok(())
}
