//! election-insight: dataset quality profiling, simulated model evaluation
//! and vote-tally rankings for a two-race election.
//!
//! The pipeline runs inside a [`state::Session`]: load a dataset, profile it,
//! cleanse it, train on it, and rank the latest candidate snapshot. Every
//! result can be exported as delimited text.

pub mod config;
pub mod data;
pub mod election;
pub mod error;
pub mod export;
pub mod quality;
pub mod state;
pub mod training;

pub use error::{Error, Result};
