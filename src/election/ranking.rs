//! Per-category leaderboards and winner prediction.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::model::{CandidateRecord, Category};

/// Non-authoritative movement indicator shown next to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendHint {
    Up,
    Down,
}

/// Source of trend hints. Hints never influence ordering or percentages.
pub trait TrendHinter: Send + Sync {
    fn hint(&self, candidate: &CandidateRecord) -> Option<TrendHint>;
}

/// Emits no hints.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrend;

impl TrendHinter for NoTrend {
    fn hint(&self, _candidate: &CandidateRecord) -> Option<TrendHint> {
        None
    }
}

/// Coin-flip hints; with a seed, each candidate id always gets the same hint.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTrend {
    seed: Option<u64>,
}

impl RandomTrend {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }
}

impl TrendHinter for RandomTrend {
    fn hint(&self, candidate: &CandidateRecord) -> Option<TrendHint> {
        let up = match self.seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                candidate.id.hash(&mut hasher);
                StdRng::seed_from_u64(seed ^ hasher.finish()).gen_bool(0.5)
            }
            None => rand::thread_rng().gen_bool(0.5),
        };
        Some(if up { TrendHint::Up } else { TrendHint::Down })
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A candidate's place within its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub candidate: CandidateRecord,
    /// 1-based.
    pub position: usize,
    /// Share of the category total in `[0, 100]`; shares of one category sum
    /// to exactly 100.
    pub vote_percentage: f64,
    /// Leader votes minus this candidate's votes.
    pub gap_to_leader: u64,
    pub trend_hint: Option<TrendHint>,
}

/// Ranked outcome of one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStanding {
    pub category: Category,
    /// Every candidate, by descending votes; ties keep fetch order.
    pub entries: Vec<RankingEntry>,
    pub leader: Option<CandidateRecord>,
    pub total_votes: u64,
}

impl CategoryStanding {
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            entries: Vec::new(),
            leader: None,
            total_votes: 0,
        }
    }

    /// First `n` entries, for display.
    pub fn top(&self, n: usize) -> &[RankingEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Standings for both races.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub president: CategoryStanding,
    pub mayor: CategoryStanding,
    /// Candidates ranked across both races.
    pub total_candidates: usize,
}

impl PredictionResult {
    pub fn standing(&self, category: Category) -> &CategoryStanding {
        match category {
            Category::President => &self.president,
            Category::Mayor => &self.mayor,
        }
    }

    /// Standings in report order.
    pub fn standings(&self) -> [&CategoryStanding; 2] {
        [&self.president, &self.mayor]
    }

    pub fn grand_total_votes(&self) -> u64 {
        self.president
            .total_votes
            .saturating_add(self.mayor.total_votes)
    }
}

// ---------------------------------------------------------------------------
// Ranker
// ---------------------------------------------------------------------------

/// Decimal places beyond which an `f64` percentage carries no more digits.
const MAX_PRECISION: u32 = 15;

/// Shares of `votes` in percent with `precision` decimals, summing to exactly
/// 100 when any vote was cast and all zero otherwise.
///
/// Each share is floored to the precision and the leftover units go to the
/// largest remainders; equal remainders favour the earlier entry.
pub fn apportion_percentages(votes: &[u64], precision: u32) -> Vec<f64> {
    let precision = precision.min(MAX_PRECISION);
    let total: u128 = votes.iter().map(|&v| u128::from(v)).sum();
    if total == 0 {
        return vec![0.0; votes.len()];
    }

    let scale = 10u128.pow(precision);
    let units = 100 * scale;
    let mut shares: Vec<u128> = Vec::with_capacity(votes.len());
    let mut remainders: Vec<(usize, u128)> = Vec::with_capacity(votes.len());
    for (i, &v) in votes.iter().enumerate() {
        let exact = u128::from(v) * units;
        shares.push(exact / total);
        remainders.push((i, exact % total));
    }

    let assigned: u128 = shares.iter().sum();
    let leftover = usize::try_from(units - assigned).unwrap_or(usize::MAX);
    // Stable: ties keep input order.
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    for &(i, _) in remainders.iter().take(leftover) {
        shares[i] += 1;
    }

    shares
        .into_iter()
        .map(|units| units as f64 / scale as f64)
        .collect()
}

/// Aggregates candidate snapshots into standings.
#[derive(Clone)]
pub struct Ranker {
    precision: u32,
    top_n: usize,
    skip_disabled: bool,
    trend: Arc<dyn TrendHinter>,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ranker")
            .field("precision", &self.precision)
            .field("top_n", &self.top_n)
            .field("skip_disabled", &self.skip_disabled)
            .finish_non_exhaustive()
    }
}

impl Ranker {
    /// Two-decimal percentages, top five, all candidates, no trend hints.
    pub fn new() -> Self {
        Self {
            precision: 2,
            top_n: 5,
            skip_disabled: false,
            trend: Arc::new(NoTrend),
        }
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Leave out candidates the store reports as disabled.
    #[must_use]
    pub fn skip_disabled(mut self, skip: bool) -> Self {
        self.skip_disabled = skip;
        self
    }

    #[must_use]
    pub fn with_trend_hinter(mut self, trend: Arc<dyn TrendHinter>) -> Self {
        self.trend = trend;
        self
    }

    /// Display length of a leaderboard.
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Rank every category present in `candidates`; absent ones come back
    /// empty.
    pub fn predict(&self, candidates: &[CandidateRecord]) -> PredictionResult {
        let considered = candidates
            .iter()
            .filter(|c| !self.skip_disabled || c.enabled);
        let (president, mayor): (Vec<&CandidateRecord>, Vec<&CandidateRecord>) =
            considered.partition(|c| c.category == Category::President);

        let total_candidates = president.len() + mayor.len();
        PredictionResult {
            president: self.rank_category(Category::President, president),
            mayor: self.rank_category(Category::Mayor, mayor),
            total_candidates,
        }
    }

    /// Rank one race. `members` must already belong to `category`.
    pub fn rank_category(
        &self,
        category: Category,
        mut members: Vec<&CandidateRecord>,
    ) -> CategoryStanding {
        if members.is_empty() {
            return CategoryStanding::empty(category);
        }
        let total_votes = members
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.vote_count));

        // First candidate with the highest count wins a tie.
        let leader = members
            .iter()
            .copied()
            .fold(None::<&CandidateRecord>, |best, c| match best {
                Some(b) if b.vote_count >= c.vote_count => Some(b),
                _ => Some(c),
            });
        let leader_votes = leader.map_or(0, |l| l.vote_count);

        members.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));

        let counts: Vec<u64> = members.iter().map(|c| c.vote_count).collect();
        let percentages = apportion_percentages(&counts, self.precision);

        let entries = members
            .into_iter()
            .zip(percentages)
            .enumerate()
            .map(|(i, (c, vote_percentage))| RankingEntry {
                position: i + 1,
                vote_percentage,
                gap_to_leader: leader_votes.saturating_sub(c.vote_count),
                trend_hint: self.trend.hint(c),
                candidate: c.clone(),
            })
            .collect();

        CategoryStanding {
            category,
            entries,
            leader: leader.cloned(),
            total_votes,
        }
    }
}

/// Rank with default settings.
pub fn predict(candidates: &[CandidateRecord]) -> PredictionResult {
    Ranker::new().predict(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn president(id: &str, votes: u64) -> CandidateRecord {
        CandidateRecord::new(id, id, "P", Category::President, votes)
    }

    fn mayor(id: &str, votes: u64) -> CandidateRecord {
        CandidateRecord::new(id, id, "P", Category::Mayor, votes)
    }

    #[test]
    fn test_two_candidate_example() {
        let result = predict(&[president("A", 120), president("B", 80)]);
        let standing = &result.president;
        assert_eq!(standing.total_votes, 200);
        assert_eq!(standing.entries[0].vote_percentage, 60.0);
        assert_eq!(standing.entries[1].vote_percentage, 40.0);
        assert_eq!(standing.leader.as_ref().unwrap().id, "A");
        assert_eq!(standing.entries[1].gap_to_leader, 40);
    }

    #[test]
    fn test_empty_category() {
        let result = predict(&[president("A", 10)]);
        assert!(result.mayor.leader.is_none());
        assert_eq!(result.mayor.total_votes, 0);
        assert!(result.mayor.is_empty());
        assert_eq!(result.total_candidates, 1);
        assert_eq!(result.mayor, CategoryStanding::empty(Category::Mayor));

        let nothing = predict(&[]);
        assert!(nothing.president.leader.is_none());
        assert_eq!(nothing.grand_total_votes(), 0);
    }

    #[test]
    fn test_zero_votes_gives_zero_percentages() {
        let result = predict(&[mayor("A", 0), mayor("B", 0)]);
        assert!(result.mayor.entries.iter().all(|e| e.vote_percentage == 0.0));
        assert_eq!(result.mayor.leader.as_ref().unwrap().id, "A");
    }

    #[test]
    fn test_ties_keep_fetch_order() {
        let result = predict(&[mayor("A", 5), mayor("B", 9), mayor("C", 5), mayor("D", 9)]);
        let ids: Vec<&str> = result.mayor.entries.iter().map(|e| e.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "D", "A", "C"]);
        assert_eq!(result.mayor.leader.as_ref().unwrap().id, "B");
        let positions: Vec<usize> = result.mayor.entries.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_partition_by_category() {
        let result = predict(&[president("P1", 3), mayor("M1", 7), president("P2", 4)]);
        assert_eq!(result.president.entries.len(), 2);
        assert_eq!(result.mayor.entries.len(), 1);
        assert_eq!(result.grand_total_votes(), 14);
        assert_eq!(result.standing(Category::Mayor).total_votes, 7);
    }

    #[test]
    fn test_top_n_truncates() {
        let candidates: Vec<_> = (0..8).map(|i| president(&format!("C{i}"), i)).collect();
        let ranker = Ranker::new().with_top_n(5);
        let result = ranker.predict(&candidates);
        assert_eq!(result.president.top(ranker.top_n()).len(), 5);
        assert_eq!(result.president.entries.len(), 8);
        assert_eq!(result.president.top(20).len(), 8);
    }

    #[test]
    fn test_precision_is_configurable() {
        let candidates = [president("A", 1), president("B", 2)];
        let one = Ranker::new().with_precision(1).predict(&candidates);
        assert_eq!(one.president.entries[0].vote_percentage, 66.7);
        let two = Ranker::new().predict(&candidates);
        assert_eq!(two.president.entries[0].vote_percentage, 66.67);
    }

    #[test]
    fn test_skip_disabled() {
        let mut off = president("B", 50);
        off.enabled = false;
        let candidates = [president("A", 10), off];
        assert_eq!(predict(&candidates).president.entries.len(), 2);
        let result = Ranker::new().skip_disabled(true).predict(&candidates);
        assert_eq!(result.president.entries.len(), 1);
        assert_eq!(result.total_candidates, 1);
    }

    #[test]
    fn test_trend_hints() {
        let candidates = [president("A", 1)];
        assert!(predict(&candidates).president.entries[0].trend_hint.is_none());

        let seeded = Ranker::new().with_trend_hinter(Arc::new(RandomTrend::new(Some(3))));
        let first = seeded.predict(&candidates).president.entries[0].trend_hint;
        let second = seeded.predict(&candidates).president.entries[0].trend_hint;
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_apportion_thirds() {
        assert_eq!(apportion_percentages(&[1, 1, 1], 2), vec![33.34, 33.33, 33.33]);
        assert_eq!(apportion_percentages(&[1, 2], 0), vec![33.0, 67.0]);
        assert_eq!(apportion_percentages(&[0, 0], 2), vec![0.0, 0.0]);
        assert!(apportion_percentages(&[], 2).is_empty());
    }

    #[test]
    fn test_many_candidates_sum_to_100() {
        let counts: Vec<u64> = [4u64, 3, 2].iter().copied().cycle().take(30).collect();
        let candidates: Vec<_> = counts
            .iter()
            .enumerate()
            .map(|(i, &v)| mayor(&i.to_string(), v))
            .collect();
        let result = predict(&candidates);
        let sum: f64 = result.mayor.entries.iter().map(|e| e.vote_percentage).sum();
        assert!((sum - 100.0).abs() < 1e-6, "sum was {sum}");
        for entry in &result.mayor.entries {
            let hundredths = entry.vote_percentage * 100.0;
            assert!((hundredths - hundredths.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_huge_counts_saturate() {
        let result = predict(&[mayor("A", u64::MAX), mayor("B", 1), president("P", 5)]);
        assert_eq!(result.mayor.total_votes, u64::MAX);
        assert_eq!(result.grand_total_votes(), u64::MAX);
        assert_eq!(result.mayor.leader.as_ref().unwrap().id, "A");
        let sum: f64 = result.mayor.entries.iter().map(|e| e.vote_percentage).sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }
}
