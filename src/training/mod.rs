/// Simulated model evaluation.
///
/// ```text
///   Session ──start()──▶ TrainingRun ◀── mpsc ── tokio task
///                            │                     │ Progress(0..=100)
///                            │                     │ Completed(outcome)
///                            ▼                     ▼
///                      wait(on_progress)     MetricSynthesizer
/// ```

pub mod synth;
pub mod trainer;

pub use synth::{BandedSynthesizer, MetricSynthesizer, ModelMetrics, ModelType, TrainingRequest};
pub use trainer::{
    start, TrainTestSplit, TrainerSettings, TrainingEvent, TrainingOutcome, TrainingRun,
    TrainingSlot,
};
