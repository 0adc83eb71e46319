pub mod betting;
pub mod goalies;
pub mod grade;
pub mod leaderboard;
pub mod sandbox;
pub mod slate;

pub use grade::PredictionGrade;
pub use leaderboard::build_leaderboard;
pub use sandbox::strategy_snapshot;
pub use slate::{build_team_snapshots, group_matchups_by_date, select_current_slate};
