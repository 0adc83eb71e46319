use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ── Predictions ───────────────────────────────────────────────────────────────

/// Contents of `todaysPredictions.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionsPayload {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub games: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRef {
    pub name: String,
    pub abbrev: String,
}

/// One game prediction as exported by the model pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub game_date: NaiveDate,
    #[serde(default)]
    pub start_time_et: Option<String>,
    #[serde(default)]
    pub start_time_utc: Option<DateTime<Utc>>,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    /// Home win probability (0.0–1.0)
    pub home_win_prob: f64,
    /// Away win probability (0.0–1.0)
    pub away_win_prob: f64,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    /// Grade written by the exporter. Display always re-derives it.
    #[serde(default)]
    pub confidence_grade: Option<String>,
    /// Signed edge written by the exporter. Display always re-derives it.
    #[serde(default)]
    pub edge: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub model_favorite: Option<Side>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

pub const TBD: &str = "TBD";

impl Prediction {
    /// Edge as |P(home) − 0.5|, always derived from the probabilities.
    pub fn derived_edge(&self) -> f64 {
        (self.home_win_prob - 0.5).abs()
    }

    /// Home is the favorite at 50% or better, matching how edge is measured.
    pub fn favorite_side(&self) -> Side {
        if self.home_win_prob >= 0.5 {
            Side::Home
        } else {
            Side::Away
        }
    }

    pub fn favorite(&self) -> &TeamRef {
        match self.favorite_side() {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    /// Win probability of the model favorite
    pub fn favorite_prob(&self) -> f64 {
        match self.favorite_side() {
            Side::Home => self.home_win_prob,
            Side::Away => 1.0 - self.home_win_prob,
        }
    }

    /// "7:00 PM ET"; derived from the UTC start when the exporter left it out.
    pub fn start_time_label(&self) -> String {
        if let Some(et) = self.start_time_et.as_deref().filter(|s| !s.trim().is_empty()) {
            return et.to_string();
        }
        self.start_time_utc
            .as_ref()
            .and_then(format_eastern)
            .unwrap_or_else(|| TBD.to_string())
    }

    pub fn venue_label(&self) -> &str {
        self.venue.as_deref().unwrap_or(TBD)
    }
}

fn nth_sunday(year: i32, month: u32, n: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let to_sunday = (7 - first.weekday().num_days_from_sunday()) % 7;
    first.checked_add_days(Days::new(u64::from(to_sunday + 7 * (n - 1))))
}

/// US Eastern offset at an instant: EDT from the second Sunday of March
/// 07:00 UTC until the first Sunday of November 06:00 UTC, EST otherwise.
fn eastern_offset(utc: &DateTime<Utc>) -> Option<FixedOffset> {
    let year = utc.year();
    let dst_start = Utc.from_utc_datetime(&nth_sunday(year, 3, 2)?.and_hms_opt(7, 0, 0)?);
    let dst_end = Utc.from_utc_datetime(&nth_sunday(year, 11, 1)?.and_hms_opt(6, 0, 0)?);
    let hours = if *utc >= dst_start && *utc < dst_end { 4 } else { 5 };
    FixedOffset::west_opt(hours * 3600)
}

fn format_eastern(utc: &DateTime<Utc>) -> Option<String> {
    let offset = eastern_offset(utc)?;
    Some(format!("{} ET", utc.with_timezone(&offset).format("%-I:%M %p")))
}

// ── Goalies ───────────────────────────────────────────────────────────────────

/// Contents of `goaliePulse.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoaliePulse {
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub goalies: Vec<GoalieCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalieCard {
    pub name: String,
    pub team: String,
    /// Rolling goals saved above expected
    pub rolling_gsa: f64,
    pub season_gsa: f64,
    #[serde(default)]
    pub rest_days: u32,
    /// Likelihood of starting the next game (0.0–1.0)
    pub start_likelihood: f64,
    #[serde(default)]
    pub trend: Trend,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub watchouts: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Surging,
    Steady,
    Cooling,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Surging => "Surging",
            Trend::Steady => "Steady",
            Trend::Cooling => "Cooling",
            Trend::Unknown => "–",
        }
    }
}

// ── Model insights ────────────────────────────────────────────────────────────

/// Contents of `modelInsights.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInsights {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub overall: OverallMetrics,
    #[serde(default)]
    pub feature_importance: Vec<FeatureImportance>,
    #[serde(default)]
    pub distribution_findings: Vec<Finding>,
    #[serde(default)]
    pub confidence_buckets: Vec<ConfidenceBucket>,
    #[serde(default)]
    pub strategies: Vec<StrategySummary>,
    #[serde(default)]
    pub bankroll_series: Vec<BankrollPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallMetrics {
    #[serde(default)]
    pub games: u32,
    /// Share of games called correctly (0.0–1.0)
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub baseline_accuracy: Option<f64>,
    #[serde(default)]
    pub log_loss: f64,
    #[serde(default)]
    pub brier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceBucket {
    pub label: String,
    pub accuracy: f64,
    pub count: u32,
}

/// Backtest result for one edge gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    pub name: String,
    /// Minimum edge, in percentage points, required to place a bet
    pub edge_threshold: f64,
    /// Share of bets won (0.0–1.0)
    pub win_rate: f64,
    /// Return on investment, percent
    pub roi: f64,
    pub units: f64,
    pub bets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankrollPoint {
    pub label: String,
    pub bankroll: f64,
}

// ── Standings ─────────────────────────────────────────────────────────────────

/// Contents of `currentStandings.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsPayload {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub teams: Vec<Standing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub abbrev: String,
    pub name: String,
    #[serde(default)]
    pub games_played: Option<u32>,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub ot_losses: u32,
    pub points: u32,
    pub goal_differential: i32,
    #[serde(default)]
    pub point_pct: f64,
    /// Published standings rank, if the exporter wrote one
    #[serde(default)]
    pub rank: Option<u32>,
}

impl Standing {
    pub fn games(&self) -> u32 {
        self.games_played
            .unwrap_or(self.wins + self.losses + self.ot_losses)
    }

    /// "W-L-OT" record string
    pub fn record(&self) -> String {
        format!("{}-{}-{}", self.wins, self.losses, self.ot_losses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(home: f64, away: f64) -> Prediction {
        Prediction {
            id: "g".into(),
            game_date: NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(),
            start_time_et: None,
            start_time_utc: None,
            home_team: TeamRef {
                name: "Home Club".into(),
                abbrev: "HOM".into(),
            },
            away_team: TeamRef {
                name: "Away Club".into(),
                abbrev: "AWY".into(),
            },
            home_win_prob: home,
            away_win_prob: away,
            confidence_score: None,
            confidence_grade: None,
            edge: None,
            summary: None,
            model_favorite: None,
            venue: None,
            season: None,
        }
    }

    #[test]
    fn test_favorite_follows_home_probability() {
        // Sums to 0.98, inside the loader's tolerance
        let g = game(0.495, 0.485);
        assert_eq!(g.favorite_side(), Side::Away);
        assert_eq!(g.favorite().abbrev, "AWY");
        assert!((g.favorite_prob() - 0.505).abs() < 1e-9);

        let even = game(0.5, 0.5);
        assert_eq!(even.favorite_side(), Side::Home);
    }

    #[test]
    fn test_start_time_label_prefers_exported_text() {
        let mut g = game(0.6, 0.4);
        g.start_time_et = Some("7:30 PM ET".into());
        g.start_time_utc = Some(Utc.with_ymd_and_hms(2025, 11, 15, 0, 0, 0).unwrap());
        assert_eq!(g.start_time_label(), "7:30 PM ET");
    }

    #[test]
    fn test_start_time_label_converts_utc() {
        let mut g = game(0.6, 0.4);
        assert_eq!(g.start_time_label(), TBD);

        // Standard time in November
        g.start_time_utc = Some(Utc.with_ymd_and_hms(2025, 11, 15, 0, 0, 0).unwrap());
        assert_eq!(g.start_time_label(), "7:00 PM ET");

        // Daylight time in April
        g.start_time_utc = Some(Utc.with_ymd_and_hms(2025, 4, 10, 23, 30, 0).unwrap());
        assert_eq!(g.start_time_label(), "7:30 PM ET");
    }

    #[test]
    fn test_eastern_offset_switches_on_dst_boundaries() {
        let before = Utc.with_ymd_and_hms(2025, 3, 9, 6, 59, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 9, 7, 0, 0).unwrap();
        assert_eq!(format_eastern(&before).unwrap(), "1:59 AM ET");
        assert_eq!(format_eastern(&after).unwrap(), "3:00 AM ET");

        let fall = Utc.with_ymd_and_hms(2025, 11, 2, 6, 0, 0).unwrap();
        assert_eq!(format_eastern(&fall).unwrap(), "1:00 AM ET");
    }
}
