use crate::data::models::StrategySummary;

/// Edge gates (percentage points) offered by the sandbox selector
pub const SANDBOX_THRESHOLDS: [f64; 4] = [0.0, 5.0, 10.0, 15.0];

pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// Pick the strategy whose edge gate is closest to `threshold`.
///
/// Exact matches win; otherwise the nearest gate, with ties going to the
/// lower gate. Returns `None` when there are no strategies.
pub fn strategy_snapshot(strategies: &[StrategySummary], threshold: f64) -> Option<&StrategySummary> {
    let mut best: Option<&StrategySummary> = None;
    for s in strategies {
        let dist = (s.edge_threshold - threshold).abs();
        best = match best {
            None => Some(s),
            Some(b) => {
                let best_dist = (b.edge_threshold - threshold).abs();
                if dist < best_dist || (dist == best_dist && s.edge_threshold < b.edge_threshold) {
                    Some(s)
                } else {
                    Some(b)
                }
            }
        };
    }
    best
}

/// Parse the `threshold` query value; anything non-numeric falls back to the default.
pub fn parse_threshold(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_THRESHOLD)
}
