use serde::Serialize;

use super::model::Category;
use super::ranking::PredictionResult;

/// Checkpoint label and the percentage of the final total reached by then.
const CHECKPOINTS: [(&str, u64); 6] = [
    ("08:00", 10),
    ("10:00", 30),
    ("12:00", 50),
    ("14:00", 70),
    ("16:00", 90),
    ("18:00", 100),
];

/// Which races a view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn total_votes(self, prediction: &PredictionResult) -> u64 {
        match self {
            CategoryFilter::All => prediction.grand_total_votes(),
            CategoryFilter::Only(category) => prediction.standing(category).total_votes,
        }
    }
}

/// Cumulative votes at one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub label: &'static str,
    pub votes: u64,
}

/// Illustrative cumulative turnout over the voting day.
///
/// The vote store keeps no timestamps, so the curve is a fixed profile
/// scaled to the current total, floored at each checkpoint. Only the last
/// point is a real figure.
pub fn turnout_timeline(prediction: &PredictionResult, filter: CategoryFilter) -> Vec<TimelinePoint> {
    let total = filter.total_votes(prediction);
    CHECKPOINTS
        .iter()
        .map(|&(label, pct)| TimelinePoint {
            label,
            votes: total * pct / 100,
        })
        .collect()
}
