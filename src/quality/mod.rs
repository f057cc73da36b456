//! Data quality assessment
//!
//! Counts three kinds of defects in a loaded [`Dataset`](crate::data::model::Dataset):
//!
//! - **Nulls**: cells whose trimmed value is empty
//! - **Duplicates**: rows whose signature (cells joined by the delimiter)
//!   repeats an earlier row
//! - **Inconsistencies**: cells holding characters outside letters
//!   (accented Latin included), digits, whitespace, `,`, `.` and `-`
//!
//! Cleansing operations then correct the report, and optionally the rows.
//!
//! # Example
//!
//! ```
//! use election_insight::data::parser::parse_csv;
//! use election_insight::quality::{apply_operation, profile, CleanseOp};
//!
//! let dataset = parse_csv("nombre,edad\nAna,25\n,30\nAna,25\n").unwrap();
//! let report = profile(&dataset);
//! assert_eq!((report.null_count, report.duplicate_count), (1, 1));
//!
//! let cleaned = apply_operation(&report, CleanseOp::DropDuplicates);
//! assert_eq!(cleaned.report.duplicate_count, 0);
//! ```

mod cleanser;
mod profiler;


pub use cleanser::{apply_operation, apply_to_dataset, CleanseMode, CleanseOp, CleanseOutcome};
pub use profiler::{
    is_allowed_char, is_inconsistent_cell, profile, ColumnQuality, QualityProfiler, QualityReport,
};
