use std::collections::HashSet;

use super::model::{signature, Dataset};

// ---------------------------------------------------------------------------
// Row predicates: which rows survive a data-level cleansing step
// ---------------------------------------------------------------------------

/// Whether a cell counts as null: empty once surrounding whitespace is removed.
pub fn is_null_cell(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Indices of rows that contain no null cell.
///
/// A row with zero cells has nothing to be null and is kept; ragged rows are
/// judged only on the cells they actually have.
pub fn complete_row_indices(dataset: &Dataset) -> Vec<usize> {
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.iter().any(|cell| is_null_cell(cell)))
        .map(|(i, _)| i)
        .collect()
}

/// Indices of the first occurrence of every distinct row signature, in
/// original order.
pub fn first_occurrence_indices(dataset: &Dataset) -> Vec<usize> {
    let mut seen: HashSet<String> = HashSet::with_capacity(dataset.len());
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| seen.insert(signature(row, dataset.delimiter)))
        .map(|(i, _)| i)
        .collect()
}

/// Copy of `dataset` holding only the rows at `indices`.
pub fn select_rows(dataset: &Dataset, indices: &[usize]) -> Dataset {
    let rows = indices
        .iter()
        .filter_map(|&i| dataset.rows.get(i).cloned())
        .collect();
    dataset.with_rows(rows)
}
