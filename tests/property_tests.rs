//! Property-based tests for profiling and ranking invariants.

use std::collections::HashSet;

use proptest::prelude::*;

use election_insight::data::model::{signature, Dataset};
use election_insight::election::{predict, CandidateRecord, Category};
use election_insight::quality::{apply_to_dataset, profile, CleanseOp};

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    (1usize..5).prop_flat_map(|width| {
        prop::collection::vec(prop::collection::vec("[ab ]{0,2}", 0..=width), 0..30).prop_map(
            move |rows| {
                let headers = (0..width).map(|i| format!("c{i}")).collect();
                Dataset::new(headers, rows, ',')
            },
        )
    })
}

fn votes_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..10_000, 1..300)
}

fn mayors(votes: &[u64]) -> Vec<CandidateRecord> {
    votes
        .iter()
        .enumerate()
        .map(|(i, &v)| CandidateRecord::new(i.to_string(), format!("C{i}"), "P", Category::Mayor, v))
        .collect()
}

proptest! {
    /// Null count equals the number of blank cells and never exceeds the cell count
    #[test]
    fn prop_null_count_matches_blank_cells(dataset in dataset_strategy()) {
        let report = profile(&dataset);
        let blank = dataset
            .rows
            .iter()
            .flatten()
            .filter(|cell| cell.trim().is_empty())
            .count();
        prop_assert_eq!(report.null_count, blank);
        prop_assert!(report.null_count <= dataset.total_cells());
    }

    /// Duplicates are rows minus distinct signatures
    #[test]
    fn prop_duplicate_formula(dataset in dataset_strategy()) {
        let report = profile(&dataset);
        let distinct: HashSet<String> = dataset
            .rows
            .iter()
            .map(|row| signature(row, dataset.delimiter))
            .collect();
        prop_assert_eq!(report.duplicate_count, dataset.len() - distinct.len());
    }

    /// Deduplicated data re-profiles with no duplicates
    #[test]
    fn prop_dedupe_then_profile_is_clean(dataset in dataset_strategy()) {
        let deduped = apply_to_dataset(&dataset, CleanseOp::DropDuplicates);
        prop_assert_eq!(profile(&deduped).duplicate_count, 0);
        prop_assert_eq!(deduped.len(), dataset.len() - profile(&dataset).duplicate_count);
    }

    /// Percentages add up to 100 when there are votes, and are all zero otherwise
    #[test]
    fn prop_percentages_sum(votes in votes_strategy()) {
        let result = predict(&mayors(&votes));
        let sum: f64 = result.mayor.entries.iter().map(|e| e.vote_percentage).sum();
        if result.mayor.total_votes > 0 {
            prop_assert!((sum - 100.0).abs() <= 1e-6, "sum was {}", sum);
        } else {
            prop_assert!(result.mayor.entries.iter().all(|e| e.vote_percentage == 0.0));
        }
    }

    /// Equal counts keep input order and positions are dense
    #[test]
    fn prop_ranking_is_stable(votes in prop::collection::vec(0u64..4, 1..20)) {
        let result = predict(&mayors(&votes));
        let entries = &result.mayor.entries;
        for (i, pair) in entries.windows(2).enumerate() {
            let (a, b) = (&pair[0].candidate, &pair[1].candidate);
            prop_assert!(a.vote_count >= b.vote_count);
            if a.vote_count == b.vote_count {
                let ia: usize = a.id.parse().unwrap();
                let ib: usize = b.id.parse().unwrap();
                prop_assert!(ia < ib);
            }
            prop_assert_eq!(pair[0].position, i + 1);
        }
        let leader = result.mayor.leader.as_ref().unwrap();
        prop_assert_eq!(&leader.id, &entries[0].candidate.id);
    }
}
