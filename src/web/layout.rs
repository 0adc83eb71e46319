//! Shared page shell, formatting helpers and the embedded stylesheet.

use axum::response::Html;
use chrono::{DateTime, Utc};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    Predictions,
    Goalies,
    Performance,
    Leaderboards,
    Betting,
}

const NAV_ITEMS: [(Nav, &str, &str); 6] = [
    (Nav::Home, "/", "Home"),
    (Nav::Predictions, "/predictions", "Predictions"),
    (Nav::Goalies, "/goalies", "Goalie Pulse"),
    (Nav::Performance, "/performance", "Performance"),
    (Nav::Leaderboards, "/leaderboards", "Leaderboards"),
    (Nav::Betting, "/betting", "Betting Sandbox"),
];

/// Escape text for HTML element and attribute content
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 0.623 → "62.3%"
pub fn pct(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Signed with explicit plus: 4.2 → "+4.2"
pub fn signed(v: f64) -> String {
    if v >= 0.0 {
        format!("+{:.1}", v)
    } else {
        format!("{:.1}", v)
    }
}

/// "Updated 3h ago" style freshness label
pub fn updated_label(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = ts else {
        return "Update time unknown".to_string();
    };
    let secs = (now - ts).num_seconds().max(0);
    if secs < 60 {
        "Updated just now".to_string()
    } else if secs < 3600 {
        format!("Updated {}m ago", secs / 60)
    } else if secs < 48 * 3600 {
        format!("Updated {}h ago", secs / 3600)
    } else {
        format!("Updated {}", ts.format("%b %-d, %Y"))
    }
}

/// Table row spanning the whole table with an empty-state message
pub fn empty_row(colspan: usize, message: &str) -> String {
    format!(
        r#"<tr><td colspan="{}" class="empty">{}</td></tr>"#,
        colspan,
        escape(message)
    )
}

/// Wrap page content in the site shell.
pub fn page(title: &str, active: Nav, freshness: &str, body: &str) -> Html<String> {
    let mut nav = String::new();
    for (item, href, label) in NAV_ITEMS {
        let class = if item == active { " class=\"active\"" } else { "" };
        let _ = write!(nav, r#"<a href="{}"{}>{}</a>"#, href, class, label);
    }
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} · Puckcast</title>
<style>{css}</style>
</head>
<body>
<header>
  <a class="brand" href="/">🏒 Puckcast</a>
  <nav>{nav}</nav>
  <span class="freshness">{freshness}</span>
</header>
<main>
{body}
</main>
<footer>Model outputs are probabilities, not guarantees. Data refreshes with each model run.</footer>
</body>
</html>"#,
        title = escape(title),
        css = SITE_CSS,
        nav = nav,
        freshness = escape(freshness),
        body = body,
    ))
}

const SITE_CSS: &str = r#"
  :root {
    --bg: #0b1020;
    --card: #141b2e;
    --border: #243049;
    --accent: #4fc3f7;
    --green: #00c896;
    --red: #ff4f6a;
    --amber: #ffb347;
    --text: #e6e9f2;
    --muted: #8a94ad;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  a { color: var(--accent); text-decoration: none; }
  header { display: flex; align-items: center; gap: 1.5rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); flex-wrap: wrap; }
  header .brand { font-size: 1.3rem; font-weight: 800; color: var(--text); }
  header nav { display: flex; gap: 1rem; }
  header nav a { color: var(--muted); font-size: .9rem; }
  header nav a.active { color: var(--text); border-bottom: 2px solid var(--accent); }
  .freshness { margin-left: auto; color: var(--muted); font-size: .8rem; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  footer { padding: 1rem 2rem; color: var(--muted); font-size: .75rem; border-top: 1px solid var(--border); }
  h1 { font-size: 1.8rem; }
  h2 { font-size: 1.1rem; margin-bottom: .6rem; }
  .lede { color: var(--muted); max-width: 60ch; }
  .stats-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 1rem; }
  .stat-card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.1rem; }
  .stat-card .label { color: var(--muted); font-size: .75rem; text-transform: uppercase; letter-spacing: .06em; margin-bottom: .4rem; }
  .stat-card .value { font-size: 1.6rem; font-weight: 700; }
  .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; }
  .card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem; display: grid; gap: .4rem; }
  .card .meta { color: var(--muted); font-size: .8rem; }
  .card ul { padding-left: 1.1rem; font-size: .85rem; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
  .panel-header { padding: .9rem 1.2rem; border-bottom: 1px solid var(--border); font-weight: 600; display: flex; justify-content: space-between; align-items: center; }
  .panel-body { padding: 1rem 1.2rem; display: grid; gap: .6rem; }
  table { width: 100%; border-collapse: collapse; }
  th { padding: .7rem 1rem; text-align: left; font-size: .75rem; text-transform: uppercase; color: var(--muted); border-bottom: 1px solid var(--border); }
  td { padding: .6rem 1rem; font-size: .88rem; border-bottom: 1px solid #1b2338; }
  tr:last-child td { border-bottom: none; }
  .pos { color: var(--green); }
  .neg { color: var(--red); }
  .pill { display: inline-block; padding: .15rem .55rem; border-radius: 20px; font-size: .75rem; font-weight: 700; }
  .pill.tier-a { background: rgba(0,200,150,.18); color: var(--green); }
  .pill.tier-b { background: rgba(79,195,247,.18); color: var(--accent); }
  .pill.tier-c { background: rgba(138,148,173,.18); color: var(--muted); }
  .trend-surging { color: var(--green); }
  .trend-cooling { color: var(--red); }
  .bar { height: 8px; border-radius: 4px; background: var(--accent); }
  .empty { color: var(--muted); text-align: center; padding: 2rem; font-size: .9rem; }
  .ticker { display: flex; gap: 1.5rem; overflow-x: auto; white-space: nowrap; font-size: .85rem; padding: .7rem 1.2rem; }
  .thresholds { display: flex; gap: .5rem; }
  .thresholds a { border: 1px solid var(--border); padding: .3rem .9rem; border-radius: 6px; color: var(--muted); }
  .thresholds a.active { border-color: var(--accent); color: var(--accent); }
  svg.spark { width: 100%; height: 160px; }
"#;
