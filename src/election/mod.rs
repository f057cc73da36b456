/// Vote-tally aggregation.
///
/// ```text
///   VoteSource (HTTP / JSON file / memory)
///        │  fetch_snapshot: PRESIDENT ∥ MAYOR
///        ▼
///   VoteSnapshot ── failures → empty category
///        │
///        ▼
///   ┌──────────┐
///   │  Ranker   │  stable sort, percentages, leader, top-N
///   └──────────┘
///        │
///        ▼
///   PredictionResult ──▶ timeline / export
/// ```

pub mod model;
pub mod ranking;
pub mod source;
pub mod timeline;

pub use model::{CandidateRecord, Category};
pub use ranking::{
    predict, CategoryStanding, NoTrend, PredictionResult, RandomTrend, Ranker, RankingEntry,
    TrendHint, TrendHinter,
};
pub use source::{
    fetch_snapshot, FileVoteSource, HttpVoteSource, StaticVoteSource, VoteSnapshot, VoteSource,
};
pub use timeline::{turnout_timeline, CategoryFilter, TimelinePoint};
