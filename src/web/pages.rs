//! Server-rendered pages. Each handler takes one artifact snapshot and maps it
//! to HTML; no handler mutates or caches anything.

use axum::{
    extract::{Query, State},
    response::Html,
};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use tracing::debug;

use super::layout::{empty_row, escape, page, pct, signed, updated_label, Nav};
use super::AppState;
use crate::analytics::{
    betting::{american_to_probability, kelly_criterion, series_drawdown},
    build_leaderboard, build_team_snapshots,
    goalies::{gsax_leaders, likely_starters, ticker_order},
    grade::{confidence_band, display_summary, grade_for, BOUNDARY_EPS, GRADE_GATES},
    group_matchups_by_date,
    sandbox::{parse_threshold, SANDBOX_THRESHOLDS},
    select_current_slate, strategy_snapshot, PredictionGrade,
};
use crate::data::models::{GoalieCard, Prediction, StrategySummary, Trend};

/// Standard moneyline used for the sandbox's break-even and stake hints
const REFERENCE_ODDS: f64 = -110.0;
const SANDBOX_KELLY_FRACTION: f64 = 0.25;
const TICKER_GOALIES: usize = 6;
const GSAX_LEADERS: usize = 5;

fn grade_pill(grade: PredictionGrade) -> String {
    format!(
        r#"<span class="pill {}">{}</span>"#,
        grade.tier_class(),
        grade
    )
}

fn matchup_label(game: &Prediction) -> String {
    format!(
        "{} @ {}",
        escape(&game.away_team.abbrev),
        escape(&game.home_team.abbrev)
    )
}

fn ticker_line(game: &Prediction) -> String {
    format!(
        "<span>{} · {} {} · {}</span>",
        matchup_label(game),
        escape(&game.favorite().abbrev),
        pct(game.favorite_prob()),
        grade_for(game)
    )
}

fn goalie_ticker_line(card: &GoalieCard) -> String {
    format!(
        "<span>{} {} · {} to start · {}</span>",
        escape(&card.name),
        escape(&card.team),
        pct(card.start_likelihood),
        card.trend.label()
    )
}

fn strategy_rows(strategies: &[StrategySummary]) -> String {
    if strategies.is_empty() {
        return empty_row(6, "No strategy backtests published");
    }
    let mut rows = String::new();
    for s in strategies {
        let _ = write!(
            rows,
            r#"<tr><td>{}</td><td>{} pts</td><td>{}</td><td class="{}">{}%</td><td class="{}">{}u</td><td>{}</td></tr>"#,
            escape(&s.name),
            s.edge_threshold,
            pct(s.win_rate),
            if s.roi >= 0.0 { "pos" } else { "neg" },
            signed(s.roi),
            if s.units >= 0.0 { "pos" } else { "neg" },
            signed(s.units),
            s.bets
        );
    }
    rows
}

// ── Home ──────────────────────────────────────────────────────────────────────

pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    let snap = state.store.snapshot();
    let slate = select_current_slate(&snap.predictions.games);
    let insights = &snap.insights;
    debug!("Rendering home page ({} games on slate)", slate.len());

    let strongest = slate.iter().map(|g| grade_for(g)).max();
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<section>
  <h1>Data-driven NHL predictions</h1>
  <p class="lede">Win probabilities for every game on the slate, goalie form, and the betting strategies our backtests support.</p>
</section>
<div class="stats-grid">
  <div class="stat-card"><div class="label">Model Accuracy</div><div class="value">{}</div></div>
  <div class="stat-card"><div class="label">Log Loss</div><div class="value">{:.3}</div></div>
  <div class="stat-card"><div class="label">Games on Slate</div><div class="value">{}</div></div>
  <div class="stat-card"><div class="label">Strongest Edge</div><div class="value">{}</div></div>
</div>"#,
        pct(insights.overall.accuracy),
        insights.overall.log_loss,
        slate.len(),
        strongest.map(|g| g.to_string()).unwrap_or_else(|| "–".into()),
    );

    // Tickers: server-rendered first paint, refreshed client-side
    let prediction_ticker: String = if slate.is_empty() {
        "<span>No games listed</span>".into()
    } else {
        slate.iter().map(|g| ticker_line(g)).collect()
    };
    let goalie_ticker: String = {
        let cards = ticker_order(&snap.goalie_pulse.goalies);
        if cards.is_empty() {
            "<span>No goalie reports yet</span>".into()
        } else {
            cards
                .into_iter()
                .take(TICKER_GOALIES)
                .map(goalie_ticker_line)
                .collect()
        }
    };
    let _ = write!(
        body,
        r#"<div class="panel"><div class="panel-header">Prediction Ticker</div><div class="ticker" id="prediction-ticker">{}</div></div>
<div class="panel"><div class="panel-header">Goalie Ticker</div><div class="ticker" id="goalie-ticker">{}</div></div>"#,
        prediction_ticker, goalie_ticker
    );

    let _ = write!(body, r#"<section><h2>Tonight's slate</h2><div class="cards">"#);
    if slate.is_empty() {
        body.push_str(r#"<div class="card empty">No games listed</div>"#);
    }
    for game in &slate {
        let _ = write!(
            body,
            r#"<div class="card">
  <div class="meta">{} · {}</div>
  <strong>{} @ {}</strong>
  <div>{} {} · {} {}</div>
  <div>{}</div>
</div>"#,
            escape(&game.start_time_label()),
            escape(game.venue_label()),
            escape(&game.away_team.name),
            escape(&game.home_team.name),
            escape(&game.away_team.abbrev),
            pct(game.away_win_prob),
            escape(&game.home_team.abbrev),
            pct(game.home_win_prob),
            grade_pill(grade_for(game)),
        );
    }
    body.push_str("</div></section>");

    let top = insights.strategies.iter().max_by(|a, b| {
        a.roi
            .partial_cmp(&b.roi)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(s) = top {
        let _ = write!(
            body,
            r#"<div class="panel"><div class="panel-header">Best backtested strategy <a href="/betting?threshold={}">Open sandbox →</a></div>
<div class="panel-body"><strong>{}</strong><span>{} win rate · {}% ROI · {}u over {} bets</span></div></div>"#,
            s.edge_threshold,
            escape(&s.name),
            pct(s.win_rate),
            signed(s.roi),
            signed(s.units),
            s.bets
        );
    }

    body.push_str(&ticker_script());
    page(
        "Home",
        Nav::Home,
        &updated_label(snap.predictions.generated_at, Utc::now()),
        &body,
    )
}

/// Client-side refresh of the two tickers. Each poll is independent; a failed
/// fetch leaves the previous content in place.
const TICKER_SCRIPT: &str = r#"
<script>
const pct = v => (v * 100).toFixed(1) + '%';
const esc = s => String(s ?? '').replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
const GATES = [__GRADE_GATES__];
const TRENDS = {__TRENDS__};
const grade = home => {
  const pts = Math.abs(home - 0.5) * 100 + __EPS__;
  const hit = GATES.find(([gate]) => pts >= gate);
  return hit ? hit[1] : 'C';
};

async function refreshPredictions() {
  try {
    const r = await fetch('/api/predictions');
    if (!r.ok) return;
    const payload = await r.json();
    const games = Array.isArray(payload.games) ? payload.games : [];
    if (!games.length) return;
    const first = games.map(g => g.gameDate).sort()[0];
    const slate = games.filter(g => g.gameDate === first);
    document.getElementById('prediction-ticker').innerHTML = slate.map(g => {
      const homeFav = g.homeWinProb >= 0.5;
      const fav = homeFav ? g.homeTeam.abbrev : g.awayTeam.abbrev;
      const p = homeFav ? g.homeWinProb : 1 - g.homeWinProb;
      return `<span>${esc(g.awayTeam.abbrev)} @ ${esc(g.homeTeam.abbrev)} · ${esc(fav)} ${pct(p)} · ${grade(g.homeWinProb)}</span>`;
    }).join('');
  } catch (e) { /* keep last render */ }
}

async function refreshGoalies() {
  try {
    const r = await fetch('/api/goalie-pulse');
    if (!r.ok) return;
    const payload = await r.json();
    const cards = (Array.isArray(payload.goalies) ? payload.goalies : [])
      .slice().sort((a, b) => b.startLikelihood - a.startLikelihood).slice(0, 6);
    if (!cards.length) return;
    document.getElementById('goalie-ticker').innerHTML = cards.map(c =>
      `<span>${esc(c.name)} ${esc(c.team)} · ${pct(c.startLikelihood)} to start · ${TRENDS[c.trend] ?? TRENDS.unknown}</span>`
    ).join('');
  } catch (e) { /* keep last render */ }
}

setInterval(refreshPredictions, 60000);
setInterval(refreshGoalies, 120000);
</script>"#;

/// Ticker script with the grade gates and trend labels filled in from Rust,
/// so a browser refresh renders the same fields as the first paint.
fn ticker_script() -> String {
    let gates: Vec<String> = GRADE_GATES
        .iter()
        .map(|(pts, g)| format!("[{:?},'{}']", pts, g))
        .collect();
    let trends: Vec<String> = [Trend::Surging, Trend::Steady, Trend::Cooling, Trend::Unknown]
        .into_iter()
        .map(|t| format!("{}:'{}'", format!("{:?}", t).to_lowercase(), t.label()))
        .collect();
    TICKER_SCRIPT
        .replace("__GRADE_GATES__", &gates.join(","))
        .replace("__TRENDS__", &trends.join(","))
        .replace("__EPS__", &format!("{:e}", BOUNDARY_EPS))
}

// ── Predictions ───────────────────────────────────────────────────────────────

pub async fn predictions(State(state): State<Arc<AppState>>) -> Html<String> {
    let snap = state.store.snapshot();
    let grouped = group_matchups_by_date(&snap.predictions.games);

    let mut body = String::from(
        r#"<section><h1>Predictions</h1><p class="lede">Edge is the distance of the home win probability from a coin flip. Grades run from C to A+.</p></section>"#,
    );

    if grouped.is_empty() {
        body.push_str(r#"<div class="panel"><div class="empty">No games listed</div></div>"#);
    }

    for (date, games) in &grouped {
        let mut rows = String::new();
        for game in games {
            let grade = grade_for(game);
            let _ = write!(
                rows,
                r#"<tr><td><strong>{}</strong><div class="meta">{}</div></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td></tr>"#,
                matchup_label(game),
                escape(&display_summary(game)),
                escape(&game.start_time_label()),
                escape(game.venue_label()),
                pct(game.away_win_prob),
                pct(game.home_win_prob),
                escape(&game.favorite().abbrev),
                game.derived_edge() * 100.0,
                grade_pill(grade),
                confidence_band(game.favorite_prob()),
            );
        }
        let _ = write!(
            body,
            r#"<div class="panel"><div class="panel-header">{}<span class="meta">{} games</span></div>
<table><thead><tr><th>Matchup</th><th>Start</th><th>Venue</th><th>Away</th><th>Home</th><th>Favorite</th><th>Edge (pts)</th><th>Grade</th><th>Band</th></tr></thead>
<tbody>{}</tbody></table></div>"#,
            date.format("%A, %B %-d"),
            games.len(),
            rows
        );
    }

    page(
        "Predictions",
        Nav::Predictions,
        &updated_label(snap.predictions.generated_at, Utc::now()),
        &body,
    )
}

// ── Goalies ───────────────────────────────────────────────────────────────────

fn goalie_card(card: &GoalieCard) -> String {
    let list = |items: &[String]| -> String {
        if items.is_empty() {
            "<li>–</li>".to_string()
        } else {
            items
                .iter()
                .map(|i| format!("<li>{}</li>", escape(i)))
                .collect()
        }
    };
    let trend_class = format!("trend-{}", card.trend.label().to_lowercase());
    format!(
        r#"<div class="card">
  <div class="meta">{} · {} days rest</div>
  <strong>{}</strong>
  <div>Rolling GSAx <span class="{}">{}</span> · Season <span class="{}">{}</span></div>
  <div>{} to start · <span class="{}">{}</span></div>
  <p class="meta">{}</p>
  <div>Strengths<ul>{}</ul></div>
  <div>Watch-outs<ul>{}</ul></div>
</div>"#,
        escape(&card.team),
        card.rest_days,
        escape(&card.name),
        if card.rolling_gsa >= 0.0 { "pos" } else { "neg" },
        signed(card.rolling_gsa),
        if card.season_gsa >= 0.0 { "pos" } else { "neg" },
        signed(card.season_gsa),
        pct(card.start_likelihood),
        trend_class,
        card.trend.label(),
        escape(&card.note),
        list(&card.strengths),
        list(&card.watchouts),
    )
}

pub async fn goalies(State(state): State<Arc<AppState>>) -> Html<String> {
    let snap = state.store.snapshot();
    let pulse = &snap.goalie_pulse;

    let mut body = String::from("<section><h1>Goalie Pulse</h1>");
    if let Some(headline) = &pulse.headline {
        let _ = write!(body, r#"<p class="lede">{}</p>"#, escape(headline));
    }
    if let Some(date) = pulse.target_date {
        let _ = write!(body, r#"<p class="meta">Projected starts for {}</p>"#, date.format("%B %-d"));
    }
    body.push_str("</section>");

    let mut leaders = String::new();
    for (i, card) in gsax_leaders(&pulse.goalies, GSAX_LEADERS).iter().enumerate() {
        let _ = write!(
            leaders,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            i + 1,
            escape(&card.name),
            escape(&card.team),
            signed(card.rolling_gsa)
        );
    }
    if leaders.is_empty() {
        leaders = empty_row(4, "No goalie reports yet");
    }

    let mut starters = String::new();
    for card in likely_starters(&pulse.goalies) {
        let _ = write!(
            starters,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&card.team),
            escape(&card.name),
            pct(card.start_likelihood)
        );
    }
    if starters.is_empty() {
        starters = empty_row(3, "No confirmed or likely starters");
    }

    let _ = write!(
        body,
        r#"<div class="cards">
<div class="panel"><div class="panel-header">Rolling GSAx leaders</div>
<table><thead><tr><th>#</th><th>Goalie</th><th>Team</th><th>GSAx</th></tr></thead><tbody>{}</tbody></table></div>
<div class="panel"><div class="panel-header">Likely starters</div>
<table><thead><tr><th>Team</th><th>Goalie</th><th>Start</th></tr></thead><tbody>{}</tbody></table></div>
</div>"#,
        leaders, starters
    );

    body.push_str(r#"<section><h2>All goalies</h2><div class="cards">"#);
    let cards = ticker_order(&pulse.goalies);
    if cards.is_empty() {
        body.push_str(r#"<div class="card empty">No goalie reports yet</div>"#);
    }
    for card in cards {
        body.push_str(&goalie_card(card));
    }
    body.push_str("</div></section>");

    page(
        "Goalie Pulse",
        Nav::Goalies,
        &updated_label(pulse.updated_at, Utc::now()),
        &body,
    )
}

// ── Performance ───────────────────────────────────────────────────────────────

/// Inline SVG line for the bankroll series
fn bankroll_sparkline(values: &[f64]) -> String {
    if values.len() < 2 {
        return String::new();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = if max - min > 0.0 { max - min } else { 1.0 };
    let step = 100.0 / (values.len() - 1) as f64;
    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{:.2},{:.2}", i as f64 * step, 40.0 - (v - min) / range * 40.0))
        .collect();
    format!(
        r#"<svg class="spark" viewBox="0 0 100 40" preserveAspectRatio="none"><polyline fill="none" stroke="currentColor" stroke-width="0.6" points="{}"/></svg>"#,
        points.join(" ")
    )
}

pub async fn performance(State(state): State<Arc<AppState>>) -> Html<String> {
    let snap = state.store.snapshot();
    let insights = &snap.insights;
    let overall = &insights.overall;

    let mut body = String::from(
        r#"<section><h1>Model Performance</h1><p class="lede">Out-of-sample results from the last full backtest.</p></section>"#,
    );

    let _ = write!(
        body,
        r#"<div class="stats-grid">
  <div class="stat-card"><div class="label">Games</div><div class="value">{}</div></div>
  <div class="stat-card"><div class="label">Accuracy</div><div class="value">{}</div></div>
  <div class="stat-card"><div class="label">Home-team Baseline</div><div class="value">{}</div></div>
  <div class="stat-card"><div class="label">Log Loss</div><div class="value">{:.3}</div></div>
  <div class="stat-card"><div class="label">Brier</div><div class="value">{:.3}</div></div>
</div>"#,
        overall.games,
        pct(overall.accuracy),
        overall.baseline_accuracy.map(pct).unwrap_or_else(|| "–".into()),
        overall.log_loss,
        overall.brier,
    );

    // Feature importance, widest bar = most important
    let mut features: Vec<_> = insights.feature_importance.iter().collect();
    features.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let top = features.first().map(|f| f.importance).unwrap_or(0.0);
    let mut feature_rows = String::new();
    for f in &features {
        let width = if top > 0.0 { f.importance / top * 100.0 } else { 0.0 };
        let _ = write!(
            feature_rows,
            r#"<tr><td>{}</td><td>{:.3}</td><td style="width:50%"><div class="bar" style="width:{:.1}%"></div></td></tr>"#,
            escape(&f.feature),
            f.importance,
            width
        );
    }
    if feature_rows.is_empty() {
        feature_rows = empty_row(3, "No feature importance published");
    }
    let _ = write!(
        body,
        r#"<div class="panel"><div class="panel-header">Feature importance</div>
<table><thead><tr><th>Feature</th><th>Weight</th><th></th></tr></thead><tbody>{}</tbody></table></div>"#,
        feature_rows
    );

    if !insights.distribution_findings.is_empty() {
        body.push_str(r#"<section><h2>What the distribution shows</h2><div class="cards">"#);
        for finding in &insights.distribution_findings {
            let _ = write!(
                body,
                r#"<div class="card"><strong>{}</strong><p class="meta">{}</p></div>"#,
                escape(&finding.title),
                escape(&finding.detail)
            );
        }
        body.push_str("</div></section>");
    }

    let mut bucket_rows = String::new();
    for b in &insights.confidence_buckets {
        let _ = write!(
            bucket_rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&b.label),
            pct(b.accuracy),
            b.count
        );
    }
    if bucket_rows.is_empty() {
        bucket_rows = empty_row(3, "No confidence buckets published");
    }
    let _ = write!(
        body,
        r#"<div class="panel"><div class="panel-header">Accuracy by confidence</div>
<table><thead><tr><th>Bucket</th><th>Accuracy</th><th>Games</th></tr></thead><tbody>{}</tbody></table></div>"#,
        bucket_rows
    );

    let _ = write!(
        body,
        r#"<div class="panel"><div class="panel-header">Strategy backtests</div>
<table><thead><tr><th>Strategy</th><th>Edge gate</th><th>Win rate</th><th>ROI</th><th>Units</th><th>Bets</th></tr></thead><tbody>{}</tbody></table></div>"#,
        strategy_rows(&insights.strategies)
    );

    let series: Vec<f64> = insights.bankroll_series.iter().map(|p| p.bankroll).collect();
    body.push_str(r#"<div class="panel"><div class="panel-header">Bankroll</div><div class="panel-body">"#);
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => {
            let peak = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let change = last - first;
            let _ = write!(
                body,
                r#"<div class="stats-grid">
  <div class="stat-card"><div class="label">Latest</div><div class="value">{:.0}</div></div>
  <div class="stat-card"><div class="label">Peak</div><div class="value">{:.0}</div></div>
  <div class="stat-card"><div class="label">Since start</div><div class="value {}">{}</div></div>
  <div class="stat-card"><div class="label">Max drawdown</div><div class="value neg">{:.0}</div></div>
</div>{}<div class="meta">{} → {}</div>"#,
                last,
                peak,
                if change >= 0.0 { "pos" } else { "neg" },
                signed(change),
                series_drawdown(&series),
                bankroll_sparkline(&series),
                escape(insights.bankroll_series.first().map(|p| p.label.as_str()).unwrap_or("")),
                escape(insights.bankroll_series.last().map(|p| p.label.as_str()).unwrap_or("")),
            );
        }
        _ => body.push_str(r#"<div class="empty">No bankroll history</div>"#),
    }
    body.push_str("</div></div>");

    page(
        "Performance",
        Nav::Performance,
        &updated_label(insights.generated_at, Utc::now()),
        &body,
    )
}

// ── Leaderboards ──────────────────────────────────────────────────────────────

fn movement_cell(movement: i32) -> String {
    match movement {
        m if m > 0 => format!(r#"<span class="pos">▲{}</span>"#, m),
        m if m < 0 => format!(r#"<span class="neg">▼{}</span>"#, -m),
        _ => "–".to_string(),
    }
}

pub async fn leaderboards(State(state): State<Arc<AppState>>) -> Html<String> {
    let snap = state.store.snapshot();
    let standings = &snap.standings.teams;

    let mut body = String::from(
        r#"<section><h1>Power Rankings</h1><p class="lede">Power score blends point percentage with goal differential per game. Movement is measured against the published standings.</p></section>"#,
    );

    let mut rows = String::new();
    for row in build_leaderboard(standings) {
        let _ = write!(
            rows,
            r#"<tr><td>{}</td><td>{}</td><td><strong>{}</strong> {}</td><td>{}</td><td>{}</td><td class="{}">{:+}</td><td>{:.3}</td><td>{:.1}</td></tr>"#,
            row.rank,
            movement_cell(row.movement),
            escape(&row.abbrev),
            escape(&row.name),
            escape(&row.record),
            row.points,
            if row.goal_differential >= 0 { "pos" } else { "neg" },
            row.goal_differential,
            row.point_pct,
            row.power_score,
        );
    }
    if rows.is_empty() {
        rows = empty_row(8, "No standings available");
    }
    let _ = write!(
        body,
        r#"<div class="panel"><div class="panel-header">Leaderboard</div>
<table><thead><tr><th>Rank</th><th>Move</th><th>Team</th><th>Record</th><th>Pts</th><th>GD</th><th>P%</th><th>Power</th></tr></thead><tbody>{}</tbody></table></div>"#,
        rows
    );

    let slate = select_current_slate(&snap.predictions.games);
    let mut outlook = String::new();
    for t in build_team_snapshots(&slate, standings) {
        let _ = write!(
            outlook,
            r#"<tr><td><strong>{}</strong></td><td>{} {}</td><td class="{}">{}</td><td>{}</td><td>{}</td></tr>"#,
            escape(&t.abbrev),
            if t.is_home { "vs" } else { "@" },
            escape(&t.opponent),
            if t.favored { "pos" } else { "neg" },
            pct(t.win_prob),
            grade_pill(t.grade),
            t.record.as_deref().map(escape).unwrap_or_else(|| "–".into()),
        );
    }
    if outlook.is_empty() {
        outlook = empty_row(5, "No games listed");
    }
    let _ = write!(
        body,
        r#"<div class="panel"><div class="panel-header">Team outlook for the slate</div>
<table><thead><tr><th>Team</th><th>Opponent</th><th>Win %</th><th>Game grade</th><th>Record</th></tr></thead><tbody>{}</tbody></table></div>"#,
        outlook
    );

    page(
        "Leaderboards",
        Nav::Leaderboards,
        &updated_label(snap.standings.generated_at, Utc::now()),
        &body,
    )
}

// ── Betting sandbox ───────────────────────────────────────────────────────────

/// GET /betting?threshold=5
pub async fn betting(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let snap = state.store.snapshot();
    let strategies = &snap.insights.strategies;
    let requested = parse_threshold(params.get("threshold").map(String::as_str));
    let selected = strategy_snapshot(strategies, requested);

    let mut selector = String::new();
    for t in SANDBOX_THRESHOLDS {
        let active = selected.map(|s| s.edge_threshold == t).unwrap_or(false);
        let _ = write!(
            selector,
            r#"<a href="/betting?threshold={}"{}>{}+ pts</a>"#,
            t,
            if active { r#" class="active""# } else { "" },
            t
        );
    }

    let mut body = format!(
        r#"<section><h1>Betting Sandbox</h1><p class="lede">Pick an edge gate to see how flat one-unit bets on every qualifying game performed in the backtest.</p></section>
<div class="thresholds">{}</div>"#,
        selector
    );

    match selected {
        Some(s) => {
            if s.edge_threshold != requested {
                let _ = write!(
                    body,
                    r#"<p class="meta">No backtest at {} pts; showing the nearest gate ({} pts).</p>"#,
                    requested, s.edge_threshold
                );
            }
            let break_even = american_to_probability(REFERENCE_ODDS);
            let stake = kelly_criterion(s.win_rate, REFERENCE_ODDS, SANDBOX_KELLY_FRACTION);
            let _ = write!(
                body,
                r#"<div class="stats-grid">
  <div class="stat-card"><div class="label">Strategy</div><div class="value">{}</div></div>
  <div class="stat-card"><div class="label">Win Rate</div><div class="value">{}</div></div>
  <div class="stat-card"><div class="label">ROI</div><div class="value {}">{}%</div></div>
  <div class="stat-card"><div class="label">Units</div><div class="value {}">{}</div></div>
  <div class="stat-card"><div class="label">Bets</div><div class="value">{}</div></div>
</div>
<div class="panel"><div class="panel-body">
  <span>Break-even at {} is {}; this gate won {}.</span>
  <span>Quarter-Kelly stake at {}: {} of bankroll.</span>
  {}
</div></div>"#,
                escape(&s.name),
                pct(s.win_rate),
                if s.roi >= 0.0 { "pos" } else { "neg" },
                signed(s.roi),
                if s.units >= 0.0 { "pos" } else { "neg" },
                signed(s.units),
                s.bets,
                REFERENCE_ODDS,
                pct(break_even),
                pct(s.win_rate),
                REFERENCE_ODDS,
                pct(stake),
                s.note
                    .as_deref()
                    .map(|n| format!(r#"<span class="meta">{}</span>"#, escape(n)))
                    .unwrap_or_default(),
            );
        }
        None => body.push_str(
            r#"<div class="panel"><div class="empty">No strategy backtests published</div></div>"#,
        ),
    }

    let _ = write!(
        body,
        r#"<div class="panel"><div class="panel-header">All gates</div>
<table><thead><tr><th>Strategy</th><th>Edge gate</th><th>Win rate</th><th>ROI</th><th>Units</th><th>Bets</th></tr></thead><tbody>{}</tbody></table></div>"#,
        strategy_rows(strategies)
    );

    page(
        "Betting Sandbox",
        Nav::Betting,
        &updated_label(snap.insights.generated_at, Utc::now()),
        &body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_cell() {
        assert!(movement_cell(2).contains("▲2"));
        assert!(movement_cell(-3).contains("▼3"));
        assert_eq!(movement_cell(0), "–");
    }

    #[test]
    fn test_sparkline_needs_two_points() {
        assert!(bankroll_sparkline(&[1000.0]).is_empty());
        let svg = bankroll_sparkline(&[1000.0, 1100.0]);
        assert!(svg.contains("0.00,40.00 100.00,0.00"));
    }

    #[test]
    fn test_ticker_script_carries_grades_and_trends() {
        let js = ticker_script();
        assert!(js.contains("const GATES = [[20.0,'A+'],[17.0,'A'],"));
        assert!(js.contains("[2.0,'C+']];"));
        assert!(js.contains("surging:'Surging'"));
        assert!(js.contains("unknown:'–'"));
        assert!(js.contains("* 100 + 1e-9;"));
        assert!(!js.contains("__"));
    }

    #[test]
    fn test_ticker_line_matches_script_shape() {
        let artifacts = crate::data::fixtures::artifacts();
        let line = ticker_line(&artifacts.predictions.games[0]);
        assert_eq!(line, "<span>BOS @ TOR · TOR 62.0% · B+</span>");
        let card = &artifacts.goalie_pulse.goalies[0];
        assert_eq!(
            goalie_ticker_line(card),
            "<span>Joseph Woll TOR · 82.0% to start · Surging</span>"
        );
    }

    #[test]
    fn test_strategy_rows_empty_state() {
        assert!(strategy_rows(&[]).contains("No strategy backtests published"));
    }
}
