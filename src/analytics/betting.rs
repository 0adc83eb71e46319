//! Betting math behind the strategy backtests shown on the performance and
//! sandbox pages.
//!
//! Odds are American (−150 favourite, +130 underdog). Market probabilities
//! have the bookmaker's vig removed proportionally before comparing them
//! with the model.
//!
//! Kelly sizing:
//!   f* = (b·p − q) / b
//! where
//!   b  = net odds received on the bet (profit per unit staked)
//!   p  = model probability of winning
//!   q  = 1 − p

use serde::{Deserialize, Serialize};

use crate::data::models::StrategySummary;

/// A settled game with the model's call and the closing moneyline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalGame {
    #[serde(default)]
    pub game_id: Option<String>,
    pub model_prob_home: f64,
    pub home_odds: f64,
    pub away_odds: f64,
    pub home_win: bool,
}

impl HistoricalGame {
    /// Vig-free market probabilities (home, away) from the closing lines
    pub fn market_probs(&self) -> (f64, f64) {
        remove_vig_proportional(
            american_to_probability(self.home_odds),
            american_to_probability(self.away_odds),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BetSide {
    Home,
    Away,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub game_id: Option<String>,
    pub side: BetSide,
    /// Model probability minus market probability for the side bet
    pub edge: f64,
    pub odds: f64,
    pub stake: f64,
    pub won: bool,
    pub profit: f64,
    pub cumulative_profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiMetrics {
    pub bets: u32,
    pub total_wagered: f64,
    pub total_profit: f64,
    /// Percent
    pub roi: f64,
    pub win_rate: f64,
    pub avg_profit: f64,
    /// Mean profit over its sample standard deviation, scaled by √n
    pub sharpe_ratio: f64,
    /// Largest fall from a running peak of cumulative profit
    pub max_drawdown: f64,
}

/// Implied probability of American odds.
pub fn american_to_probability(odds: f64) -> f64 {
    if odds < 0.0 {
        odds.abs() / (odds.abs() + 100.0)
    } else {
        100.0 / (odds + 100.0)
    }
}

/// Net profit per unit staked at American odds.
fn net_odds(odds: f64) -> f64 {
    if odds < 0.0 {
        100.0 / odds.abs()
    } else {
        odds / 100.0
    }
}

/// Scale two implied probabilities so they sum to exactly 1.
pub fn remove_vig_proportional(prob_home: f64, prob_away: f64) -> (f64, f64) {
    let total = prob_home + prob_away;
    if total <= 0.0 {
        return (0.5, 0.5);
    }
    (prob_home / total, prob_away / total)
}

/// Profit (or loss, negative) of a settled bet.
pub fn calculate_payout(stake: f64, odds: f64, won: bool) -> f64 {
    if won {
        stake * net_odds(odds)
    } else {
        -stake
    }
}

/// Fractional Kelly stake as a share of bankroll.
///
/// Returns `0.0` when the bet has no edge; the result is clamped to [0, 1].
pub fn kelly_criterion(model_prob: f64, odds: f64, kelly_fraction: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&model_prob), "model_prob out of range");
    debug_assert!(
        (0.0..=1.0).contains(&kelly_fraction),
        "kelly_fraction out of range"
    );

    let b = net_odds(odds);
    if b <= 0.0 || !b.is_finite() {
        return 0.0;
    }
    let p = model_prob;
    let q = 1.0 - p;
    let f = (b * p - q) / b;
    if f <= 0.0 {
        return 0.0; // no edge
    }
    (f * kelly_fraction).clamp(0.0, 1.0)
}

/// Fixed-stake bets on every game whose model-minus-market edge reaches
/// `edge_threshold` (a probability, e.g. 0.05). The home side is checked first.
pub fn simulate_threshold_betting(
    games: &[HistoricalGame],
    edge_threshold: f64,
    stake: f64,
) -> Vec<Bet> {
    let mut bets = Vec::new();
    let mut cumulative = 0.0;

    for game in games {
        let (market_home, market_away) = game.market_probs();
        let edge_home = game.model_prob_home - market_home;
        let edge_away = (1.0 - game.model_prob_home) - market_away;

        let pick = if edge_home >= edge_threshold {
            Some((BetSide::Home, edge_home, game.home_odds, game.home_win))
        } else if edge_away >= edge_threshold {
            Some((BetSide::Away, edge_away, game.away_odds, !game.home_win))
        } else {
            None
        };

        if let Some((side, edge, odds, won)) = pick {
            let profit = calculate_payout(stake, odds, won);
            cumulative += profit;
            bets.push(Bet {
                game_id: game.game_id.clone(),
                side,
                edge,
                odds,
                stake,
                won,
                profit,
                cumulative_profit: cumulative,
            });
        }
    }

    bets
}

/// Aggregate ROI metrics for a bet list.
pub fn roi_metrics(bets: &[Bet]) -> RoiMetrics {
    if bets.is_empty() {
        return RoiMetrics::default();
    }
    let n = bets.len() as f64;
    let total_wagered: f64 = bets.iter().map(|b| b.stake).sum();
    let total_profit: f64 = bets.iter().map(|b| b.profit).sum();
    let wins = bets.iter().filter(|b| b.won).count() as f64;

    let mut peak = 0.0f64;
    let mut max_drawdown = 0.0f64;
    for b in bets {
        peak = peak.max(b.cumulative_profit);
        max_drawdown = max_drawdown.max(peak - b.cumulative_profit);
    }

    RoiMetrics {
        bets: bets.len() as u32,
        total_wagered,
        total_profit,
        roi: if total_wagered > 0.0 {
            total_profit / total_wagered * 100.0
        } else {
            0.0
        },
        win_rate: wins / n,
        avg_profit: total_profit / n,
        sharpe_ratio: sharpe_ratio(bets),
        max_drawdown,
    }
}

fn sharpe_ratio(bets: &[Bet]) -> f64 {
    if bets.len() < 2 {
        return 0.0;
    }
    let n = bets.len() as f64;
    let mean = bets.iter().map(|b| b.profit).sum::<f64>() / n;
    let var = bets.iter().map(|b| (b.profit - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let sd = var.sqrt();
    if sd > 0.0 {
        mean / sd * n.sqrt()
    } else {
        0.0
    }
}

/// Largest peak-to-trough fall in a bankroll series.
pub fn series_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for &v in values {
        peak = peak.max(v);
        worst = worst.max(peak - v);
    }
    worst
}

/// Backtest each edge gate (in percentage points) and summarise it in the
/// shape stored in `modelInsights.json`.
pub fn strategy_summaries(
    games: &[HistoricalGame],
    thresholds_pts: &[f64],
    stake: f64,
) -> Vec<StrategySummary> {
    thresholds_pts
        .iter()
        .map(|&pts| {
            let bets = simulate_threshold_betting(games, pts / 100.0, stake);
            let m = roi_metrics(&bets);
            let to_units = |v: f64| if stake > 0.0 { v / stake } else { 0.0 };
            StrategySummary {
                name: if pts <= 0.0 {
                    "All model edges".to_string()
                } else {
                    format!("Edge >= {} pts", pts)
                },
                edge_threshold: pts,
                win_rate: m.win_rate,
                roi: m.roi,
                units: to_units(m.total_profit),
                bets: m.bets,
                note: Some(format!("max drawdown {:.1} units", to_units(m.max_drawdown))),
            }
        })
        .collect()
}

/// Bets smaller than this are skipped by the Kelly simulation
const MIN_KELLY_BET: f64 = 1.0;

/// A Kelly-sized bet with the bankroll it left behind
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KellyBet {
    #[serde(flatten)]
    pub bet: Bet,
    pub bankroll: f64,
    /// Percent return on the starting bankroll after this bet
    pub roi: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KellyRun {
    pub kelly_fraction: f64,
    pub starting_bankroll: f64,
    pub final_bankroll: f64,
    pub bets: Vec<KellyBet>,
}

impl KellyRun {
    pub fn metrics(&self) -> RoiMetrics {
        let bets: Vec<Bet> = self.bets.iter().map(|k| k.bet.clone()).collect();
        roi_metrics(&bets)
    }
}

/// Fractional Kelly over the game list, compounding on the running bankroll.
///
/// The side with positive model-minus-market edge is staked at
/// `bankroll * kelly`; stakes under one unit of currency are skipped.
pub fn simulate_kelly_betting(
    games: &[HistoricalGame],
    kelly_fraction: f64,
    starting_bankroll: f64,
) -> KellyRun {
    let mut bankroll = starting_bankroll;
    let mut bets = Vec::new();

    for game in games {
        let (market_home, market_away) = game.market_probs();
        let edge_home = game.model_prob_home - market_home;
        let edge_away = (1.0 - game.model_prob_home) - market_away;

        let pick = if edge_home > 0.0 {
            Some((BetSide::Home, edge_home, game.model_prob_home, game.home_odds, game.home_win))
        } else if edge_away > 0.0 {
            Some((BetSide::Away, edge_away, 1.0 - game.model_prob_home, game.away_odds, !game.home_win))
        } else {
            None
        };
        let Some((side, edge, prob, odds, won)) = pick else {
            continue;
        };

        let stake = bankroll * kelly_criterion(prob, odds, kelly_fraction);
        if stake < MIN_KELLY_BET {
            continue;
        }
        let profit = calculate_payout(stake, odds, won);
        bankroll += profit;
        bets.push(KellyBet {
            bet: Bet {
                game_id: game.game_id.clone(),
                side,
                edge,
                odds,
                stake,
                won,
                profit,
                cumulative_profit: bankroll - starting_bankroll,
            },
            bankroll,
            roi: (bankroll - starting_bankroll) / starting_bankroll * 100.0,
        });
    }

    KellyRun {
        kelly_fraction,
        starting_bankroll,
        final_bankroll: bankroll,
        bets,
    }
}

/// How the model's home probabilities compare with the vig-free market
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketComparison {
    pub games: u32,
    pub model_brier: f64,
    pub market_brier: f64,
    pub model_log_loss: f64,
    pub market_log_loss: f64,
    /// Mean of model − market
    pub mean_prob_diff: f64,
    pub abs_mean_prob_diff: f64,
    /// Pearson correlation; absent when either side has no variance
    pub correlation: Option<f64>,
}

const LOG_LOSS_CLIP: f64 = 1e-6;

fn brier(probs: &[f64], outcomes: &[f64]) -> f64 {
    probs
        .iter()
        .zip(outcomes)
        .map(|(p, y)| (p - y).powi(2))
        .sum::<f64>()
        / probs.len() as f64
}

fn log_loss(probs: &[f64], outcomes: &[f64]) -> f64 {
    -probs
        .iter()
        .zip(outcomes)
        .map(|(p, y)| {
            let p = p.clamp(LOG_LOSS_CLIP, 1.0 - LOG_LOSS_CLIP);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum::<f64>()
        / probs.len() as f64
}

fn correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx > 0.0 && vy > 0.0 {
        Some(cov / (vx.sqrt() * vy.sqrt()))
    } else {
        None
    }
}

/// Score model and market side by side. `None` for an empty game list.
pub fn compare_model_vs_market(games: &[HistoricalGame]) -> Option<MarketComparison> {
    if games.is_empty() {
        return None;
    }
    let model: Vec<f64> = games.iter().map(|g| g.model_prob_home).collect();
    let market: Vec<f64> = games.iter().map(|g| g.market_probs().0).collect();
    let outcomes: Vec<f64> = games
        .iter()
        .map(|g| if g.home_win { 1.0 } else { 0.0 })
        .collect();
    let n = games.len() as f64;
    let diffs: Vec<f64> = model.iter().zip(&market).map(|(a, b)| a - b).collect();

    Some(MarketComparison {
        games: games.len() as u32,
        model_brier: brier(&model, &outcomes),
        market_brier: brier(&market, &outcomes),
        model_log_loss: log_loss(&model, &outcomes),
        market_log_loss: log_loss(&market, &outcomes),
        mean_prob_diff: diffs.iter().sum::<f64>() / n,
        abs_mean_prob_diff: diffs.iter().map(|d| d.abs()).sum::<f64>() / n,
        correlation: correlation(&model, &market),
    })
}

/// Everything the `backtest` command prints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestReport {
    pub strategies: Vec<StrategySummary>,
    pub kelly: KellySummary,
    pub market: Option<MarketComparison>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KellySummary {
    pub kelly_fraction: f64,
    pub starting_bankroll: f64,
    pub final_bankroll: f64,
    /// Percent growth of the bankroll
    pub roi: f64,
    pub metrics: RoiMetrics,
}

pub fn backtest_report(
    games: &[HistoricalGame],
    thresholds_pts: &[f64],
    stake: f64,
    kelly_fraction: f64,
    starting_bankroll: f64,
) -> BacktestReport {
    let run = simulate_kelly_betting(games, kelly_fraction, starting_bankroll);
    BacktestReport {
        strategies: strategy_summaries(games, thresholds_pts, stake),
        kelly: KellySummary {
            kelly_fraction,
            starting_bankroll,
            final_bankroll: run.final_bankroll,
            roi: (run.final_bankroll - starting_bankroll) / starting_bankroll * 100.0,
            metrics: run.metrics(),
        },
        market: compare_model_vs_market(games),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hist(p: f64, home_odds: f64, away_odds: f64, home_win: bool) -> HistoricalGame {
        HistoricalGame {
            game_id: None,
            model_prob_home: p,
            home_odds,
            away_odds,
            home_win,
        }
    }

    #[test]
    fn test_american_to_probability() {
        assert_relative_eq!(american_to_probability(-150.0), 0.6, epsilon = 1e-9);
        assert_relative_eq!(american_to_probability(130.0), 100.0 / 230.0, epsilon = 1e-9);
        assert_relative_eq!(american_to_probability(100.0), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_remove_vig_sums_to_one() {
        let (h, a) = remove_vig_proportional(0.6, 0.4348);
        assert_relative_eq!(h + a, 1.0, epsilon = 1e-12);
        assert_relative_eq!(h, 0.6 / 1.0348, epsilon = 1e-9);
    }

    #[test]
    fn test_payout() {
        assert_relative_eq!(calculate_payout(150.0, -150.0, true), 100.0, epsilon = 1e-9);
        assert_relative_eq!(calculate_payout(100.0, 130.0, true), 130.0, epsilon = 1e-9);
        assert_relative_eq!(calculate_payout(100.0, 130.0, false), -100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_kelly_no_edge() {
        // Even money at a coin flip
        assert_relative_eq!(kelly_criterion(0.5, 100.0, 1.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_kelly_positive_edge() {
        // b = 1, p = 0.6 → f = 0.2
        assert_relative_eq!(kelly_criterion(0.6, 100.0, 1.0), 0.2, epsilon = 1e-9);
        assert_relative_eq!(kelly_criterion(0.6, 100.0, 0.25), 0.05, epsilon = 1e-9);
    }

    #[test]
    fn test_kelly_negative_edge() {
        assert_relative_eq!(kelly_criterion(0.3, -150.0, 1.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_threshold_betting_picks_sides() {
        let games = vec![
            // market 50/50, model 60% home → home edge 0.10
            hist(0.60, 100.0, 100.0, true),
            // model 40% home → away edge 0.10, away loses
            hist(0.40, 100.0, 100.0, true),
            // model 52% → edge 0.02, below gate
            hist(0.52, 100.0, 100.0, false),
        ];
        let bets = simulate_threshold_betting(&games, 0.05, 100.0);
        assert_eq!(bets.len(), 2);
        assert_eq!(bets[0].side, BetSide::Home);
        assert!(bets[0].won);
        assert_eq!(bets[1].side, BetSide::Away);
        assert!(!bets[1].won);
        assert_relative_eq!(bets[1].cumulative_profit, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_roi_metrics_and_drawdown() {
        let games = vec![
            hist(0.70, 100.0, 100.0, true),  // +100
            hist(0.70, 100.0, 100.0, false), // -100
            hist(0.70, 100.0, 100.0, false), // -100
            hist(0.70, 100.0, 100.0, true),  // +100
        ];
        let bets = simulate_threshold_betting(&games, 0.05, 100.0);
        let m = roi_metrics(&bets);
        assert_eq!(m.bets, 4);
        assert_relative_eq!(m.total_wagered, 400.0, epsilon = 1e-9);
        assert_relative_eq!(m.total_profit, 0.0, epsilon = 1e-9);
        assert_relative_eq!(m.win_rate, 0.5, epsilon = 1e-9);
        assert_relative_eq!(m.max_drawdown, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_roi_metrics_empty() {
        assert_eq!(roi_metrics(&[]), RoiMetrics::default());
    }

    #[test]
    fn test_series_drawdown() {
        assert_relative_eq!(series_drawdown(&[1000.0, 1140.0, 1060.0, 1220.0]), 80.0, epsilon = 1e-9);
        assert_relative_eq!(series_drawdown(&[]), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_strategy_summaries_gate_count() {
        let games = vec![
            hist(0.58, 100.0, 100.0, true),
            hist(0.70, 100.0, 100.0, true),
            hist(0.47, 100.0, 100.0, false),
        ];
        let summaries = strategy_summaries(&games, &[0.0, 5.0, 10.0, 15.0], 100.0);
        let counts: Vec<u32> = summaries.iter().map(|s| s.bets).collect();
        assert_eq!(counts, vec![3, 2, 1, 1]);
        assert_relative_eq!(summaries[3].units, 1.0, epsilon = 1e-9);
        assert_eq!(summaries[1].name, "Edge >= 5 pts");
    }

    #[test]
    fn test_sharpe_ratio() {
        // Profits +100, -100, +100: mean 33.3, sample sd 115.47
        let games = vec![
            hist(0.70, 100.0, 100.0, true),
            hist(0.70, 100.0, 100.0, false),
            hist(0.70, 100.0, 100.0, true),
        ];
        let m = roi_metrics(&simulate_threshold_betting(&games, 0.05, 100.0));
        let expected = (100.0 / 3.0) / (40000.0f64 / 3.0).sqrt() * 3.0f64.sqrt();
        assert_relative_eq!(m.sharpe_ratio, expected, epsilon = 1e-9);

        let single = roi_metrics(&simulate_threshold_betting(&games[..1], 0.05, 100.0));
        assert_relative_eq!(single.sharpe_ratio, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kelly_simulation_compounds() {
        // Even money, model 60% → full Kelly 0.2, quarter Kelly 0.05
        let games = vec![
            hist(0.60, 100.0, 100.0, true),
            hist(0.60, 100.0, 100.0, false),
        ];
        let run = simulate_kelly_betting(&games, 0.25, 1000.0);
        assert_eq!(run.bets.len(), 2);
        assert_relative_eq!(run.bets[0].bet.stake, 50.0, epsilon = 1e-9);
        assert_relative_eq!(run.bets[0].bankroll, 1050.0, epsilon = 1e-9);
        assert_relative_eq!(run.bets[0].roi, 5.0, epsilon = 1e-9);
        assert_relative_eq!(run.bets[1].bet.stake, 52.5, epsilon = 1e-9);
        assert_relative_eq!(run.final_bankroll, 997.5, epsilon = 1e-9);
        assert_relative_eq!(run.metrics().max_drawdown, 52.5, epsilon = 1e-9);
    }

    #[test]
    fn test_kelly_simulation_bets_away_edge() {
        let games = vec![hist(0.35, 100.0, 100.0, false)];
        let run = simulate_kelly_betting(&games, 0.5, 1000.0);
        assert_eq!(run.bets.len(), 1);
        assert_eq!(run.bets[0].bet.side, BetSide::Away);
        assert!(run.bets[0].bet.won);
    }

    #[test]
    fn test_kelly_simulation_skips_tiny_stakes() {
        // Edge of 1 pt on a 10-unit bankroll stakes well under one unit
        let games = vec![hist(0.51, 100.0, 100.0, true)];
        let run = simulate_kelly_betting(&games, 0.25, 10.0);
        assert!(run.bets.is_empty());
        assert_relative_eq!(run.final_bankroll, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compare_model_vs_market() {
        let games = vec![
            hist(0.70, -150.0, 130.0, true),
            hist(0.40, 100.0, 100.0, false),
        ];
        let cmp = compare_model_vs_market(&games).unwrap();
        let (m0, _) = games[0].market_probs();
        assert_eq!(cmp.games, 2);
        assert_relative_eq!(cmp.model_brier, (0.09 + 0.16) / 2.0, epsilon = 1e-9);
        assert_relative_eq!(
            cmp.market_brier,
            ((m0 - 1.0).powi(2) + 0.25) / 2.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            cmp.model_log_loss,
            -(0.7f64.ln() + 0.6f64.ln()) / 2.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(cmp.mean_prob_diff, ((0.70 - m0) + (0.40 - 0.5)) / 2.0, epsilon = 1e-9);
        assert_relative_eq!(cmp.abs_mean_prob_diff, ((0.70 - m0).abs() + 0.1) / 2.0, epsilon = 1e-9);
        assert_relative_eq!(cmp.correlation.unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_compare_model_vs_market_edge_cases() {
        assert!(compare_model_vs_market(&[]).is_none());
        let flat = vec![hist(0.5, 100.0, 100.0, true), hist(0.6, 100.0, 100.0, false)];
        // Market is 50/50 on both games: no variance, no correlation
        assert!(compare_model_vs_market(&flat).unwrap().correlation.is_none());
    }

    #[test]
    fn test_backtest_report_shape() {
        let games = vec![hist(0.60, 100.0, 100.0, true), hist(0.45, 100.0, 100.0, true)];
        let report = backtest_report(&games, &[0.0, 5.0], 100.0, 0.25, 1000.0);
        assert_eq!(report.strategies.len(), 2);
        assert_eq!(report.kelly.metrics.bets, 2);
        assert!(report.market.is_some());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["kelly"]["metrics"]["sharpeRatio"].is_number());
        assert!(json["market"]["modelBrier"].is_number());
    }
}
