//! Read-only access to the external vote store.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::model::{CandidateRecord, Category};

const LOG_TARGET: &str = "election_insight::source";

/// Where candidate snapshots come from.
#[async_trait]
pub trait VoteSource: Send + Sync {
    /// Every candidate currently registered for `category`.
    async fn candidates(&self, category: Category) -> Result<Vec<CandidateRecord>>;
}

// ---------------------------------------------------------------------------
// HTTP store
// ---------------------------------------------------------------------------

/// Vote store reached over HTTP at `{base_url}/api/candidates/role/{CATEGORY}`.
#[derive(Debug, Clone)]
pub struct HttpVoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVoteSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::invalid_config(format!("building HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn category_url(&self, category: Category) -> String {
        format!("{}/api/candidates/role/{}", self.base_url, category)
    }
}

#[async_trait]
impl VoteSource for HttpVoteSource {
    async fn candidates(&self, category: Category) -> Result<Vec<CandidateRecord>> {
        let url = self.category_url(category);
        log::debug!(target: LOG_TARGET, "GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::source(category, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::source(category, format!("HTTP {status} from {url}")));
        }

        let mut records: Vec<CandidateRecord> = response
            .json()
            .await
            .map_err(|e| Error::source(category, format!("decoding response: {e}")))?;
        records.retain(|c| c.category == category);
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// JSON snapshot file
// ---------------------------------------------------------------------------

/// Vote store exported to a JSON array of candidates. The file is re-read on
/// every request.
#[derive(Debug, Clone)]
pub struct FileVoteSource {
    path: PathBuf,
}

impl FileVoteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl VoteSource for FileVoteSource {
    async fn candidates(&self, category: Category) -> Result<Vec<CandidateRecord>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::source(category, format!("{}: {e}", self.path.display())))?;
        let records: Vec<CandidateRecord> = serde_json::from_str(&text)
            .map_err(|e| Error::source(category, format!("{}: {e}", self.path.display())))?;
        Ok(records
            .into_iter()
            .filter(|c| c.category == category)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Fixed list of candidates, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticVoteSource {
    candidates: Vec<CandidateRecord>,
}

impl StaticVoteSource {
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl VoteSource for StaticVoteSource {
    async fn candidates(&self, category: Category) -> Result<Vec<CandidateRecord>> {
        Ok(self
            .candidates
            .iter()
            .filter(|c| c.category == category)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Candidates fetched for one prediction request.
#[derive(Debug, Default)]
pub struct VoteSnapshot {
    /// Presidents first, then mayors, each in store order.
    pub candidates: Vec<CandidateRecord>,
    /// Categories that could not be fetched; they contribute no candidates.
    pub failures: Vec<Error>,
}

impl VoteSnapshot {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch both categories concurrently.
///
/// A failing category is logged, recorded in [`VoteSnapshot::failures`] and
/// treated as empty; it never prevents the other category from being ranked.
pub async fn fetch_snapshot<S>(source: &S) -> VoteSnapshot
where
    S: VoteSource + ?Sized,
{
    let [first, second] = Category::ALL;
    let results = tokio::join!(source.candidates(first), source.candidates(second));

    let mut snapshot = VoteSnapshot::default();
    for result in [results.0, results.1] {
        match result {
            Ok(mut records) => snapshot.candidates.append(&mut records),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "{e}");
                snapshot.failures.push(e);
            }
        }
    }
    snapshot
}
