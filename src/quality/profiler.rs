//! Quality report and the profiler that computes it.

use std::collections::HashSet;

use serde::Serialize;

use crate::data::filter::is_null_cell;
use crate::data::model::{signature, Dataset};

const LOG_TARGET: &str = "election_insight::quality";

// ═══════════════════════════════════════════════════════════════════════════════
// Report types
// ═══════════════════════════════════════════════════════════════════════════════

/// Quality statistics for a single header column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnQuality {
    /// Column name
    pub name: String,
    /// Cells present in this column whose trimmed value is empty
    pub null_count: usize,
    /// Rows too short to reach this column
    pub missing_count: usize,
    /// Distinct non-null values
    pub unique_count: usize,
}

/// Summary of quality defects found in a dataset
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QualityReport {
    /// Cells whose trimmed value is empty, over every cell of every row
    pub null_count: usize,
    /// Rows whose signature repeats an earlier row
    pub duplicate_count: usize,
    /// Cells containing a character outside the allowed set
    pub inconsistency_count: usize,
    /// Data rows profiled
    pub row_count: usize,
    /// Header columns
    pub column_count: usize,
    /// Per-column breakdown, in header order
    pub columns: Vec<ColumnQuality>,
}

impl QualityReport {
    /// Whether any of the three defect counters is non-zero
    pub fn has_issues(&self) -> bool {
        self.null_count > 0 || self.duplicate_count > 0 || self.inconsistency_count > 0
    }

    /// Breakdown for one column, if it exists
    pub fn column(&self, name: &str) -> Option<&ColumnQuality> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Profiler
// ═══════════════════════════════════════════════════════════════════════════════

/// Whether `c` may appear in a consistent cell.
///
/// Allowed: ASCII letters and digits, Latin letters with diacritics
/// (Latin-1 Supplement through Latin Extended-B, minus `×` and `÷`),
/// whitespace, comma, period and hyphen.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(c, ',' | '.' | '-')
        || (matches!(c, '\u{00C0}'..='\u{024F}') && c != '\u{00D7}' && c != '\u{00F7}')
}

/// Whether a cell contains any disallowed character
pub fn is_inconsistent_cell(cell: &str) -> bool {
    !cell.chars().all(is_allowed_char)
}

/// Dataset profiler
#[derive(Debug, Clone)]
pub struct QualityProfiler {
    pub(crate) column_breakdown: bool,
}

impl Default for QualityProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityProfiler {
    /// Create a profiler that also computes the per-column breakdown
    pub fn new() -> Self {
        Self {
            column_breakdown: true,
        }
    }

    /// Enable/disable the per-column breakdown
    #[must_use]
    pub fn with_column_breakdown(mut self, enabled: bool) -> Self {
        self.column_breakdown = enabled;
        self
    }

    /// Profile a dataset
    pub fn profile(&self, dataset: &Dataset) -> QualityReport {
        let mut null_count = 0;
        let mut inconsistency_count = 0;

        for cell in dataset.rows.iter().flatten() {
            if is_null_cell(cell) {
                null_count += 1;
            }
            if is_inconsistent_cell(cell) {
                inconsistency_count += 1;
            }
        }

        let duplicate_count = self.count_duplicate_rows(dataset);

        let columns = if self.column_breakdown {
            dataset
                .headers
                .iter()
                .enumerate()
                .map(|(idx, name)| self.analyze_column(dataset, idx, name))
                .collect()
        } else {
            Vec::new()
        };

        let report = QualityReport {
            null_count,
            duplicate_count,
            inconsistency_count,
            row_count: dataset.len(),
            column_count: dataset.column_count(),
            columns,
        };

        log::debug!(
            target: LOG_TARGET,
            "profiled {} rows: nulls={} duplicates={} inconsistencies={}",
            report.row_count,
            report.null_count,
            report.duplicate_count,
            report.inconsistency_count
        );
        report
    }

    /// Rows minus distinct row signatures
    pub(crate) fn count_duplicate_rows(&self, dataset: &Dataset) -> usize {
        let signatures: HashSet<String> = dataset
            .rows
            .iter()
            .map(|row| signature(row, dataset.delimiter))
            .collect();
        dataset.len() - signatures.len()
    }

    pub(crate) fn analyze_column(&self, dataset: &Dataset, idx: usize, name: &str) -> ColumnQuality {
        let mut null_count = 0;
        let mut missing_count = 0;
        let mut unique: HashSet<&str> = HashSet::new();

        for cell in dataset.column_at(idx) {
            match cell {
                None => missing_count += 1,
                Some(cell) if is_null_cell(cell) => null_count += 1,
                Some(cell) => {
                    unique.insert(cell);
                }
            }
        }

        ColumnQuality {
            name: name.to_string(),
            null_count,
            missing_count,
            unique_count: unique.len(),
        }
    }
}

/// Profile a dataset with the default profiler.
pub fn profile(dataset: &Dataset) -> QualityReport {
    QualityProfiler::new().profile(dataset)
}
