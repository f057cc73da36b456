//! Progress-reporting training task.
//!
//! A run is a tokio task that walks progress from 0 to 100 in fixed steps,
//! pausing one tick between steps, then publishes a single terminal
//! [`TrainingEvent::Completed`]. The [`TrainingRun`] handle owns both the
//! receiving end of the event channel and the session's training slot, so
//! dropping it abandons the run and frees the slot immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::data::model::Dataset;
use crate::error::{Error, Result};

use super::synth::{MetricSynthesizer, ModelMetrics, ModelType, TrainingRequest};

const LOG_TARGET: &str = "election_insight::training";

/// Pacing of progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerSettings {
    /// Percentage points added per event.
    pub step: u8,
    /// Pause between two events.
    pub tick: Duration,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            step: 10,
            tick: Duration::from_millis(300),
        }
    }
}

impl TrainerSettings {
    /// The step must divide 100 so every increment is the same size.
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 || 100 % self.step != 0 {
            return Err(Error::invalid_config(format!(
                "progress step must be a non-zero divisor of 100, got {}",
                self.step
            )));
        }
        Ok(())
    }

    fn event_count(&self) -> usize {
        usize::from(100 / self.step) + 2
    }
}

/// Row counts on each side of the held-out split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrainTestSplit {
    pub train_rows: usize,
    pub test_rows: usize,
}

impl TrainTestSplit {
    pub fn new(rows: usize, test_ratio: f64) -> Self {
        let test_rows = ((rows as f64) * test_ratio).round() as usize;
        let test_rows = test_rows.min(rows);
        Self {
            train_rows: rows - test_rows,
            test_rows,
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingOutcome {
    pub model_type: ModelType,
    pub split: TrainTestSplit,
    pub metrics: ModelMetrics,
}

/// Event published by a running task, in order: progress values, then one
/// completion.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingEvent {
    Progress(u8),
    Completed(TrainingOutcome),
}

// ---------------------------------------------------------------------------
// Session slot
// ---------------------------------------------------------------------------

/// Allows at most one active run per session.
#[derive(Debug, Clone, Default)]
pub struct TrainingSlot {
    busy: Arc<AtomicBool>,
}

impl TrainingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<SlotGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(SlotGuard {
            busy: Arc::clone(&self.busy),
        })
    }
}

#[derive(Debug)]
struct SlotGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Running task
// ---------------------------------------------------------------------------

/// Handle to an in-flight run.
#[derive(Debug)]
pub struct TrainingRun {
    events: mpsc::Receiver<TrainingEvent>,
    task: JoinHandle<()>,
    _slot: SlotGuard,
}

impl TrainingRun {
    /// Next event, or `None` once the task has finished.
    pub async fn next_event(&mut self) -> Option<TrainingEvent> {
        self.events.recv().await
    }

    /// Drive the run to completion, reporting each progress value.
    pub async fn wait<F>(mut self, mut on_progress: F) -> Result<TrainingOutcome>
    where
        F: FnMut(u8),
    {
        while let Some(event) = self.events.recv().await {
            match event {
                TrainingEvent::Progress(p) => on_progress(p),
                TrainingEvent::Completed(outcome) => return Ok(outcome),
            }
        }
        Err(Error::TrainingAborted)
    }
}

impl Drop for TrainingRun {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            log::info!(target: LOG_TARGET, "training run abandoned");
        }
        self.task.abort();
    }
}

/// Start a run over `dataset`.
///
/// Fails without spawning anything when no dataset is loaded, the request or
/// settings are invalid, no tokio runtime is available, or `slot` is already
/// taken.
pub fn start(
    slot: &TrainingSlot,
    dataset: Option<Arc<Dataset>>,
    request: TrainingRequest,
    settings: TrainerSettings,
    synthesizer: Arc<dyn MetricSynthesizer>,
) -> Result<TrainingRun> {
    let dataset =
        dataset.ok_or_else(|| Error::precondition("load a dataset before training"))?;
    request.validate()?;
    settings.validate()?;
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|_| Error::precondition("training requires a tokio runtime"))?;
    let guard = slot.acquire()?;

    log::info!(
        target: LOG_TARGET,
        "training {} on {} rows (test split {})",
        request.model_type,
        dataset.len(),
        request.test_split
    );

    let (tx, rx) = mpsc::channel(settings.event_count());
    let task = runtime.spawn(async move {
        let mut progress: u8 = 0;
        loop {
            if tx.send(TrainingEvent::Progress(progress)).await.is_err() {
                return;
            }
            if progress >= 100 {
                break;
            }
            tokio::time::sleep(settings.tick).await;
            progress = progress.saturating_add(settings.step).min(100);
        }

        let outcome = TrainingOutcome {
            model_type: request.model_type,
            split: TrainTestSplit::new(dataset.len(), request.test_split),
            metrics: synthesizer.synthesize(&dataset, &request),
        };
        log::info!(
            target: LOG_TARGET,
            "training finished: accuracy={:.4}",
            outcome.metrics.accuracy
        );
        let _ = tx.send(TrainingEvent::Completed(outcome)).await;
    });

    Ok(TrainingRun {
        events: rx,
        task,
        _slot: guard,
    })
}
