//! Letter grades and confidence labels derived from a prediction's edge.
//!
//! The edge is |P(home) − 0.5|. Grades are assigned on fixed
//! percentage-point gates:
//!
//! | edge pts | grade |
//! |----------|-------|
//! | ≥ 20     | A+    |
//! | ≥ 17     | A     |
//! | ≥ 14     | A-    |
//! | ≥ 10     | B+    |
//! | ≥ 7      | B     |
//! | ≥ 4      | B-    |
//! | ≥ 2      | C+    |
//! | otherwise| C     |

use serde::Serialize;
use std::fmt;

use crate::data::models::Prediction;

/// Absorbs binary rounding so that an edge of exactly 0.07 lands on the 7-pt gate.
pub(crate) const BOUNDARY_EPS: f64 = 1e-9;

/// Ordered from weakest to strongest, so `Ord` follows grade strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PredictionGrade {
    C,
    CPlus,
    BMinus,
    B,
    BPlus,
    AMinus,
    A,
    APlus,
}

/// (minimum edge in points, grade), strongest first
pub(crate) const GRADE_GATES: [(f64, PredictionGrade); 7] = [
    (20.0, PredictionGrade::APlus),
    (17.0, PredictionGrade::A),
    (14.0, PredictionGrade::AMinus),
    (10.0, PredictionGrade::BPlus),
    (7.0, PredictionGrade::B),
    (4.0, PredictionGrade::BMinus),
    (2.0, PredictionGrade::CPlus),
];

impl PredictionGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            PredictionGrade::APlus => "A+",
            PredictionGrade::A => "A",
            PredictionGrade::AMinus => "A-",
            PredictionGrade::BPlus => "B+",
            PredictionGrade::B => "B",
            PredictionGrade::BMinus => "B-",
            PredictionGrade::CPlus => "C+",
            PredictionGrade::C => "C",
        }
    }

    /// CSS class used by the pages to color the grade pill
    pub fn tier_class(self) -> &'static str {
        match self {
            PredictionGrade::APlus | PredictionGrade::A | PredictionGrade::AMinus => "tier-a",
            PredictionGrade::BPlus | PredictionGrade::B | PredictionGrade::BMinus => "tier-b",
            PredictionGrade::CPlus | PredictionGrade::C => "tier-c",
        }
    }

    /// Indefinite article for prose ("an A-tier", "a B-tier")
    pub fn article(self) -> &'static str {
        match self {
            PredictionGrade::APlus | PredictionGrade::A | PredictionGrade::AMinus => "an",
            _ => "a",
        }
    }
}

impl fmt::Display for PredictionGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an edge magnitude (0.0–1.0) to a grade. Negative edges use their magnitude.
pub fn prediction_grade(edge: f64) -> PredictionGrade {
    let pts = edge.abs() * 100.0 + BOUNDARY_EPS;
    GRADE_GATES
        .iter()
        .find(|(gate, _)| pts >= *gate)
        .map(|(_, grade)| *grade)
        .unwrap_or(PredictionGrade::C)
}

/// Grade for a prediction, always from the derived edge
pub fn grade_for(prediction: &Prediction) -> PredictionGrade {
    prediction_grade(prediction.derived_edge())
}

/// Confidence band for the favorite's win probability, using the
/// 50-55 / 55-60 / ... / 75+ bins from the season analysis. Bins include
/// their upper edge, so 0.60 falls in "55-60%".
pub fn confidence_band(favorite_prob: f64) -> &'static str {
    let p = favorite_prob.max(1.0 - favorite_prob);
    if p <= 0.55 {
        "50-55%"
    } else if p <= 0.60 {
        "55-60%"
    } else if p <= 0.65 {
        "60-65%"
    } else if p <= 0.70 {
        "65-70%"
    } else if p <= 0.75 {
        "70-75%"
    } else {
        "75%+"
    }
}

/// Summary sentence used when the exporter did not write one.
pub fn build_summary(prediction: &Prediction) -> String {
    let grade = grade_for(prediction);
    let direction = match prediction.favorite_side() {
        crate::data::models::Side::Home => "home",
        crate::data::models::Side::Away => "road",
    };
    format!(
        "{} project at {:.0}% as the {} lean, {} {}-tier edge worth {:.1} pts over a coin flip.",
        prediction.favorite().name,
        prediction.favorite_prob() * 100.0,
        direction,
        grade.article(),
        grade,
        prediction.derived_edge() * 100.0
    )
}

/// Summary to display: the exported one when present and non-blank
pub fn display_summary(prediction: &Prediction) -> String {
    match prediction.summary.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => build_summary(prediction),
    }
}
