use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::AnalysisConfig;
use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::data::parser::parse;
use crate::election::ranking::PredictionResult;
use crate::election::source::{fetch_snapshot, VoteSource};
use crate::error::{Error, Result};
use crate::export::{
    export_metrics, export_quality, export_ranking, ranking_filename, write_export,
    ExportOptions, METRICS_FILENAME, QUALITY_FILENAME,
};
use crate::quality::{apply_operation, apply_to_dataset, profile, CleanseMode, CleanseOp, QualityReport};
use crate::training::{
    start, MetricSynthesizer, ModelMetrics, TrainingOutcome, TrainingRequest, TrainingRun,
    TrainingSlot,
};

const LOG_TARGET: &str = "election_insight::session";

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// One analysis workspace, independent of how it is driven.
pub struct Session {
    pub config: AnalysisConfig,

    /// Loaded dataset (None until a file or text is loaded).
    pub dataset: Option<Arc<Dataset>>,

    /// Latest quality report of `dataset`.
    pub report: Option<QualityReport>,

    /// Metrics of the last completed training run.
    pub metrics: Option<ModelMetrics>,

    /// Full outcome of the last completed training run.
    pub last_training: Option<TrainingOutcome>,

    /// Latest ranking of both races.
    pub prediction: Option<PredictionResult>,

    /// Status / confirmation message for the caller to surface.
    pub status_message: Option<String>,

    training: TrainingSlot,
    synthesizer: Arc<dyn MetricSynthesizer>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("rows", &self.dataset.as_ref().map(|d| d.len()))
            .field("report", &self.report)
            .field("metrics", &self.metrics)
            .field("training", &self.training.is_busy())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(config: AnalysisConfig) -> Self {
        let synthesizer = Arc::new(config.synthesizer());
        Self {
            config,
            dataset: None,
            report: None,
            metrics: None,
            last_training: None,
            prediction: None,
            status_message: None,
            training: TrainingSlot::new(),
            synthesizer,
        }
    }

    /// Replace the metric source used by subsequent runs.
    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn MetricSynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    // ---- Dataset ----

    /// Ingest a dataset, discarding the report and metrics of the previous one.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        log::info!(
            target: LOG_TARGET,
            "dataset loaded: {} rows, {} columns",
            dataset.len(),
            dataset.column_count()
        );
        self.dataset = Some(Arc::new(dataset));
        self.report = None;
        self.metrics = None;
        self.last_training = None;
        self.status_message = None;
    }

    /// Parse delimited text with the configured delimiter.
    pub fn load_text(&mut self, raw: &str) -> Result<()> {
        let dataset = parse(raw, self.config.delimiter)?;
        self.set_dataset(dataset);
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let dataset = load_file(path, self.config.delimiter)?;
        self.set_dataset(dataset);
        Ok(())
    }

    // ---- Quality ----

    /// Profile the loaded dataset and keep the report.
    pub fn profile(&mut self) -> Result<&QualityReport> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| Error::precondition("load a dataset before profiling"))?;
        let report = profile(dataset);
        log::info!(
            target: LOG_TARGET,
            "profile: {} nulls, {} duplicates, {} inconsistencies",
            report.null_count,
            report.duplicate_count,
            report.inconsistency_count
        );
        Ok(self.report.insert(report))
    }

    /// Apply one cleansing operation, returning its confirmation.
    ///
    /// In [`CleanseMode::RemoveRows`] the dataset itself is rewritten and the
    /// report recomputed from it.
    pub fn clean(&mut self, op: CleanseOp) -> Result<&QualityReport> {
        if self.report.is_none() {
            self.profile()?;
        }
        let confirmation = match self.config.cleanse_mode {
            CleanseMode::ReportOnly => {
                let current = self
                    .report
                    .as_ref()
                    .ok_or_else(|| Error::precondition("profile the dataset before cleansing"))?;
                let outcome = apply_operation(current, op);
                self.report = Some(outcome.report);
                outcome.confirmation
            }
            CleanseMode::RemoveRows => {
                let dataset = self
                    .dataset
                    .as_ref()
                    .ok_or_else(|| Error::precondition("load a dataset before cleansing"))?;
                let cleaned = apply_to_dataset(dataset, op);
                let removed = dataset.len() - cleaned.len();
                log::info!(target: LOG_TARGET, "{op}: removed {removed} rows");
                self.report = Some(profile(&cleaned));
                self.dataset = Some(Arc::new(cleaned));
                op.confirmation()
            }
        };
        log::info!(target: LOG_TARGET, "{confirmation}");
        self.status_message = Some(confirmation.to_string());
        self.report
            .as_ref()
            .ok_or_else(|| Error::precondition("no quality report"))
    }

    // ---- Training ----

    pub fn is_training(&self) -> bool {
        self.training.is_busy()
    }

    /// Start a training run over the loaded dataset.
    ///
    /// The caller drives the returned run and hands its outcome back through
    /// [`Session::record_training`].
    pub fn start_training(&self, request: TrainingRequest) -> Result<TrainingRun> {
        start(
            &self.training,
            self.dataset.clone(),
            request,
            self.config.trainer_settings(),
            Arc::clone(&self.synthesizer),
        )
    }

    pub fn record_training(&mut self, outcome: TrainingOutcome) {
        self.metrics = Some(outcome.metrics);
        self.status_message = Some(format!("{} trained", outcome.model_type));
        self.last_training = Some(outcome);
    }

    /// Train to completion, reporting progress, and keep the metrics.
    pub async fn train<F>(&mut self, request: TrainingRequest, on_progress: F) -> Result<ModelMetrics>
    where
        F: FnMut(u8),
    {
        let run = self.start_training(request)?;
        let outcome = run.wait(on_progress).await?;
        let metrics = outcome.metrics;
        self.record_training(outcome);
        Ok(metrics)
    }

    // ---- Prediction ----

    /// Fetch a fresh snapshot and rank it. Categories that failed to load are
    /// ranked as empty and their errors returned.
    pub async fn predict<S>(&mut self, source: &S) -> Vec<Error>
    where
        S: VoteSource + ?Sized,
    {
        let snapshot = fetch_snapshot(source).await;
        let prediction = self.config.ranker().predict(&snapshot.candidates);
        log::info!(
            target: LOG_TARGET,
            "ranked {} candidates ({} votes)",
            prediction.total_candidates,
            prediction.grand_total_votes()
        );
        self.prediction = Some(prediction);
        snapshot.failures
    }

    // ---- Export ----

    pub fn export_quality_to(&self, dir: &Path, options: ExportOptions) -> Result<PathBuf> {
        let report = self
            .report
            .as_ref()
            .ok_or_else(|| Error::precondition("no quality report to export"))?;
        write_export(dir, QUALITY_FILENAME, &export_quality(report)?, options)
    }

    pub fn export_metrics_to(&self, dir: &Path, options: ExportOptions) -> Result<PathBuf> {
        let metrics = self
            .metrics
            .as_ref()
            .ok_or_else(|| Error::precondition("no metrics to export"))?;
        write_export(dir, METRICS_FILENAME, &export_metrics(metrics)?, options)
    }

    pub fn export_ranking_to(
        &self,
        dir: &Path,
        exported_at: DateTime<Utc>,
        options: ExportOptions,
    ) -> Result<PathBuf> {
        let prediction = self
            .prediction
            .as_ref()
            .ok_or_else(|| Error::precondition("no prediction to export"))?;
        let filename = ranking_filename(exported_at.date_naive());
        write_export(dir, &filename, &export_ranking(prediction, exported_at)?, options)
    }
}
