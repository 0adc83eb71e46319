//! Slate selection, date grouping and per-team snapshots over the prediction list.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::grade::{grade_for, PredictionGrade};
use crate::data::models::{Prediction, Side, Standing};

/// Games on the earliest date present in the file
pub fn select_current_slate(games: &[Prediction]) -> Vec<&Prediction> {
    let Some(first) = games.iter().map(|g| g.game_date).min() else {
        return Vec::new();
    };
    games.iter().filter(|g| g.game_date == first).collect()
}

/// Games grouped by date, earliest first. File order is kept within a date.
pub fn group_matchups_by_date(games: &[Prediction]) -> BTreeMap<NaiveDate, Vec<&Prediction>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Prediction>> = BTreeMap::new();
    for game in games {
        by_date.entry(game.game_date).or_default().push(game);
    }
    by_date
}

/// One team's view of its game on the slate
#[derive(Debug, Clone, Serialize)]
pub struct TeamSnapshot {
    pub abbrev: String,
    pub name: String,
    pub opponent: String,
    pub is_home: bool,
    pub win_prob: f64,
    pub favored: bool,
    pub grade: PredictionGrade,
    pub game_date: NaiveDate,
    /// "W-L-OT" when the team appears in standings
    pub record: Option<String>,
    pub points: Option<u32>,
}

/// Two snapshots per game (home and away), strongest win probability first.
///
/// A team playing more than once in `games` keeps only its first game.
pub fn build_team_snapshots(games: &[&Prediction], standings: &[Standing]) -> Vec<TeamSnapshot> {
    let by_abbrev: HashMap<&str, &Standing> =
        standings.iter().map(|s| (s.abbrev.as_str(), s)).collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut snapshots = Vec::with_capacity(games.len() * 2);

    for game in games {
        let grade = grade_for(game);
        let sides = [
            (&game.home_team, &game.away_team, true, game.home_win_prob),
            (&game.away_team, &game.home_team, false, game.away_win_prob),
        ];
        for (team, opponent, is_home, win_prob) in sides {
            if !seen.insert(team.abbrev.clone()) {
                continue;
            }
            let standing = by_abbrev.get(team.abbrev.as_str());
            snapshots.push(TeamSnapshot {
                abbrev: team.abbrev.clone(),
                name: team.name.clone(),
                opponent: opponent.abbrev.clone(),
                is_home,
                win_prob,
                favored: (game.favorite_side() == Side::Home) == is_home,
                grade,
                game_date: game.game_date,
                record: standing.map(|s| s.record()),
                points: standing.map(|s| s.points),
            });
        }
    }

    snapshots.sort_by(|a, b| {
        b.win_prob
            .partial_cmp(&a.win_prob)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    snapshots
}
