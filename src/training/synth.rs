use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::model::Dataset;
use crate::error::Error;

// ---------------------------------------------------------------------------
// Model selection
// ---------------------------------------------------------------------------

/// Model family requested for an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    #[default]
    RandomForest,
    Svm,
    NeuralNetwork,
    Logistic,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RandomForest => "random-forest",
            Self::Svm => "svm",
            Self::NeuralNetwork => "neural-network",
            Self::Logistic => "logistic",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ModelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "random-forest" => Ok(Self::RandomForest),
            "svm" => Ok(Self::Svm),
            "neural-network" => Ok(Self::NeuralNetwork),
            "logistic" => Ok(Self::Logistic),
            other => Err(Error::invalid_config(format!("unknown model type `{other}`"))),
        }
    }
}

/// What the caller asked to train.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingRequest {
    pub model_type: ModelType,
    /// Fraction of rows held out for evaluation, strictly between 0 and 1.
    pub test_split: f64,
}

impl TrainingRequest {
    pub fn new(model_type: ModelType, test_split: f64) -> Self {
        Self {
            model_type,
            test_split,
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if !(self.test_split > 0.0 && self.test_split < 1.0) {
            return Err(Error::invalid_config(format!(
                "test split must be between 0 and 1, got {}",
                self.test_split
            )));
        }
        Ok(())
    }
}

impl Default for TrainingRequest {
    fn default() -> Self {
        Self::new(ModelType::default(), 0.2)
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Evaluation metrics of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub mean_absolute_error: f64,
}

impl ModelMetrics {
    /// Ratios in `[0, 1]` and a non-negative error.
    pub fn is_valid(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.accuracy)
            && unit.contains(&self.precision)
            && unit.contains(&self.recall)
            && self.mean_absolute_error >= 0.0
    }
}

/// Produces metrics for a finished run.
///
/// The training loop only reports progress; whatever implements this trait
/// decides the numbers, so a real trainer can replace the synthetic one
/// without touching callers.
pub trait MetricSynthesizer: Send + Sync {
    fn synthesize(&self, dataset: &Dataset, request: &TrainingRequest) -> ModelMetrics;
}

/// Draws plausible metrics uniformly from fixed bands.
#[derive(Debug, Clone)]
pub struct BandedSynthesizer {
    seed: Option<u64>,
    accuracy: Range<f64>,
    precision: Range<f64>,
    recall: Range<f64>,
    mean_absolute_error: Range<f64>,
}

impl Default for BandedSynthesizer {
    fn default() -> Self {
        Self {
            seed: None,
            accuracy: 0.85..0.95,
            precision: 0.82..0.92,
            recall: 0.79..0.89,
            mean_absolute_error: 0.0..0.2,
        }
    }
}

impl BandedSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same seed, same metrics.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> ModelMetrics {
        ModelMetrics {
            accuracy: rng.gen_range(self.accuracy.clone()),
            precision: rng.gen_range(self.precision.clone()),
            recall: rng.gen_range(self.recall.clone()),
            mean_absolute_error: rng.gen_range(self.mean_absolute_error.clone()),
        }
    }
}

impl MetricSynthesizer for BandedSynthesizer {
    fn synthesize(&self, _dataset: &Dataset, _request: &TrainingRequest) -> ModelMetrics {
        match self.seed {
            Some(seed) => self.draw(&mut StdRng::seed_from_u64(seed)),
            None => self.draw(&mut rand::thread_rng()),
        }
    }
}
