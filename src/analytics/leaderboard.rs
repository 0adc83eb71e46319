//! Power rankings built from the standings file.
//!
//! Power score = point% × 100 + goal differential per game × 10.
//!
//! Teams are sorted by score (descending) with a stable sort, so tied teams keep
//! the order they had in the standings file. Movement compares the new rank
//! with the rank published in the standings (or the file position when no
//! rank was published): positive means the team climbed.

use serde::Serialize;

use crate::data::models::Standing;

const GOAL_DIFF_WEIGHT: f64 = 10.0;

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub previous_rank: u32,
    /// previous_rank − rank
    pub movement: i32,
    pub power_score: f64,
    pub abbrev: String,
    pub name: String,
    pub record: String,
    pub points: u32,
    pub goal_differential: i32,
    pub point_pct: f64,
}

/// Point percentage, recomputed from points when the file left it at zero
pub fn effective_point_pct(standing: &Standing) -> f64 {
    let gp = standing.games();
    if standing.point_pct > 0.0 || gp == 0 {
        standing.point_pct
    } else {
        standing.points as f64 / (2.0 * gp as f64)
    }
}

pub fn power_score(standing: &Standing) -> f64 {
    let gp = standing.games();
    let goal_component = if gp == 0 {
        0.0
    } else {
        standing.goal_differential as f64 / gp as f64 * GOAL_DIFF_WEIGHT
    };
    effective_point_pct(standing) * 100.0 + goal_component
}

/// Rank teams by power score.
pub fn build_leaderboard(standings: &[Standing]) -> Vec<LeaderboardRow> {
    let mut scored: Vec<(usize, f64, &Standing)> = standings
        .iter()
        .enumerate()
        .map(|(i, s)| (i, power_score(s), s))
        .collect();

    // sort_by is stable: ties keep file order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .enumerate()
        .map(|(pos, (file_pos, score, s))| {
            let rank = pos as u32 + 1;
            let previous_rank = s.rank.unwrap_or(file_pos as u32 + 1);
            LeaderboardRow {
                rank,
                previous_rank,
                movement: previous_rank as i32 - rank as i32,
                power_score: score,
                abbrev: s.abbrev.clone(),
                name: s.name.clone(),
                record: s.record(),
                points: s.points,
                goal_differential: s.goal_differential,
                point_pct: effective_point_pct(s),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use approx::assert_relative_eq;

    fn standing(abbrev: &str, w: u32, l: u32, otl: u32, gd: i32, rank: Option<u32>) -> Standing {
        Standing {
            abbrev: abbrev.into(),
            name: abbrev.into(),
            games_played: None,
            wins: w,
            losses: l,
            ot_losses: otl,
            points: 2 * w + otl,
            goal_differential: gd,
            point_pct: 0.0,
            rank,
        }
    }

    #[test]
    fn test_power_score_formula() {
        let s = standing("TOR", 10, 4, 2, 8, None);
        // 22 pts / 32 possible = 0.6875 → 68.75; 8 / 16 × 10 = 5.0
        assert_relative_eq!(power_score(&s), 73.75, epsilon = 1e-9);
    }

    #[test]
    fn test_power_score_no_games() {
        let s = standing("NEW", 0, 0, 0, 0, None);
        assert_relative_eq!(power_score(&s), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_leaderboard_from_fixture() {
        let artifacts = fixtures::artifacts();
        let rows = build_leaderboard(&artifacts.standings.teams);
        let order: Vec<&str> = rows.iter().map(|r| r.abbrev.as_str()).collect();
        assert_eq!(order, vec!["TOR", "BOS", "SEA"]);

        // TOR published 2nd, now 1st
        assert_eq!(rows[0].movement, 1);
        assert_eq!(rows[1].movement, -1);
        assert_eq!(rows[2].movement, 0);
        assert_eq!(rows[0].record, "10-4-2");
    }

    #[test]
    fn test_ranks_are_positions() {
        let teams = vec![
            standing("A", 5, 5, 0, 0, None),
            standing("B", 8, 2, 0, 6, None),
            standing("C", 2, 8, 0, -9, None),
        ];
        let rows = build_leaderboard(&teams);
        let ranks: Vec<u32> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        // No published rank: movement measured against file position
        assert_eq!(rows[0].abbrev, "B");
        assert_eq!(rows[0].movement, 1);
        assert_eq!(rows[1].movement, -1);
    }

    #[test]
    fn test_ties_keep_file_order() {
        let teams = vec![
            standing("X", 6, 4, 0, 2, None),
            standing("Y", 6, 4, 0, 2, None),
            standing("Z", 6, 4, 0, 2, None),
        ];
        let rows = build_leaderboard(&teams);
        let order: Vec<&str> = rows.iter().map(|r| r.abbrev.as_str()).collect();
        assert_eq!(order, vec!["X", "Y", "Z"]);
        assert!(rows.iter().all(|r| r.movement == 0));
    }

    #[test]
    fn test_reranking_is_idempotent() {
        let teams = vec![
            standing("A", 7, 3, 1, 4, Some(3)),
            standing("B", 7, 3, 1, 4, Some(1)),
            standing("C", 9, 2, 0, 12, Some(2)),
            standing("D", 3, 7, 1, -8, Some(4)),
        ];
        let first = build_leaderboard(&teams);

        let reordered: Vec<Standing> = first
            .iter()
            .map(|r| teams.iter().find(|t| t.abbrev == r.abbrev).unwrap().clone())
            .collect();
        let second = build_leaderboard(&reordered);

        let a: Vec<&str> = first.iter().map(|r| r.abbrev.as_str()).collect();
        let b: Vec<&str> = second.iter().map(|r| r.abbrev.as_str()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_explicit_point_pct_is_used() {
        let mut s = standing("TOR", 10, 4, 2, 0, None);
        s.point_pct = 0.5;
        assert_relative_eq!(effective_point_pct(&s), 0.5, epsilon = 1e-9);
    }
}
