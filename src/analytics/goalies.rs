use crate::data::models::GoalieCard;

/// Start likelihood at or above which a goalie is treated as the probable starter
pub const LIKELY_STARTER: f64 = 0.6;

fn desc(a: f64, b: f64) -> std::cmp::Ordering {
    b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
}

/// Cards ordered for the ticker: most likely starters first
pub fn ticker_order(cards: &[GoalieCard]) -> Vec<&GoalieCard> {
    let mut out: Vec<&GoalieCard> = cards.iter().collect();
    out.sort_by(|a, b| desc(a.start_likelihood, b.start_likelihood));
    out
}

/// Top `n` goalies by rolling GSAx
pub fn gsax_leaders(cards: &[GoalieCard], n: usize) -> Vec<&GoalieCard> {
    let mut out: Vec<&GoalieCard> = cards.iter().collect();
    out.sort_by(|a, b| desc(a.rolling_gsa, b.rolling_gsa));
    out.truncate(n);
    out
}

pub fn likely_starters(cards: &[GoalieCard]) -> Vec<&GoalieCard> {
    cards
        .iter()
        .filter(|c| c.start_likelihood >= LIKELY_STARTER)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn test_ticker_order() {
        let pulse = fixtures::artifacts().goalie_pulse;
        let names: Vec<&str> = ticker_order(&pulse.goalies).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Joey Daccord", "Joseph Woll", "Jeremy Swayman"]);
    }

    #[test]
    fn test_gsax_leaders_truncates() {
        let pulse = fixtures::artifacts().goalie_pulse;
        let top = gsax_leaders(&pulse.goalies, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Joseph Woll");
        assert_eq!(top[1].name, "Joey Daccord");
    }

    #[test]
    fn test_likely_starters() {
        let pulse = fixtures::artifacts().goalie_pulse;
        let starters = likely_starters(&pulse.goalies);
        assert_eq!(starters.len(), 2);
        assert!(starters.iter().all(|c| c.start_likelihood >= LIKELY_STARTER));
    }

    #[test]
    fn test_empty_cards() {
        assert!(ticker_order(&[]).is_empty());
        assert!(gsax_leaders(&[], 5).is_empty());
    }
}
