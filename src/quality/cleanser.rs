//! Cleansing operations, at report level and at data level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::filter::{complete_row_indices, first_occurrence_indices, select_rows};
use crate::data::model::Dataset;
use crate::error::Error;

use super::profiler::QualityReport;

/// A quality-affecting operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanseOp {
    /// Remove rows holding null cells
    DropNulls,
    /// Remove repeated rows
    DropDuplicates,
    /// Impute missing numeric values with the column mean
    ImputeMean,
    /// Impute missing numeric values with the column median
    ImputeMedian,
}

impl CleanseOp {
    /// Every operation, in menu order
    pub const ALL: [CleanseOp; 4] = [
        CleanseOp::DropNulls,
        CleanseOp::DropDuplicates,
        CleanseOp::ImputeMean,
        CleanseOp::ImputeMedian,
    ];

    /// Message shown once the operation has been applied
    pub fn confirmation(self) -> &'static str {
        match self {
            CleanseOp::DropNulls => "Rows with null values dropped",
            CleanseOp::DropDuplicates => "Duplicate rows dropped",
            CleanseOp::ImputeMean => "Values imputed with the mean",
            CleanseOp::ImputeMedian => "Values imputed with the median",
        }
    }
}

impl fmt::Display for CleanseOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CleanseOp::DropNulls => "drop-nulls",
            CleanseOp::DropDuplicates => "drop-duplicates",
            CleanseOp::ImputeMean => "impute-mean",
            CleanseOp::ImputeMedian => "impute-median",
        };
        write!(f, "{name}")
    }
}

impl FromStr for CleanseOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "drop-nulls" => Ok(Self::DropNulls),
            "drop-duplicates" => Ok(Self::DropDuplicates),
            "impute-mean" => Ok(Self::ImputeMean),
            "impute-median" => Ok(Self::ImputeMedian),
            other => Err(Error::invalid_config(format!(
                "unknown cleanse operation `{other}`"
            ))),
        }
    }
}

/// Whether cleansing rewrites the report only or also removes dataset rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanseMode {
    /// Zero the affected counter; the dataset is left untouched
    #[default]
    ReportOnly,
    /// Remove rows from the dataset and re-profile it
    RemoveRows,
}

impl FromStr for CleanseMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "report-only" => Ok(Self::ReportOnly),
            "remove-rows" => Ok(Self::RemoveRows),
            other => Err(Error::invalid_config(format!(
                "unknown cleanse mode `{other}`"
            ))),
        }
    }
}

/// Result of applying one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanseOutcome {
    /// Report after the operation
    pub report: QualityReport,
    /// Whether the operation changed anything
    pub changed: bool,
    /// Confirmation for the caller to surface
    pub confirmation: &'static str,
}

/// Apply `op` to a report.
///
/// Imputation is acknowledged without touching any counter.
pub fn apply_operation(report: &QualityReport, op: CleanseOp) -> CleanseOutcome {
    let mut next = report.clone();
    let changed = match op {
        CleanseOp::DropNulls => std::mem::take(&mut next.null_count) > 0,
        CleanseOp::DropDuplicates => std::mem::take(&mut next.duplicate_count) > 0,
        CleanseOp::ImputeMean | CleanseOp::ImputeMedian => false,
    };
    if changed && op == CleanseOp::DropNulls {
        for column in &mut next.columns {
            column.null_count = 0;
        }
    }
    CleanseOutcome {
        report: next,
        changed,
        confirmation: op.confirmation(),
    }
}

/// Apply `op` to the rows of a dataset.
pub fn apply_to_dataset(dataset: &Dataset, op: CleanseOp) -> Dataset {
    match op {
        CleanseOp::DropNulls => select_rows(dataset, &complete_row_indices(dataset)),
        CleanseOp::DropDuplicates => select_rows(dataset, &first_occurrence_indices(dataset)),
        CleanseOp::ImputeMean | CleanseOp::ImputeMedian => dataset.clone(),
    }
}
