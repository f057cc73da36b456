//! Analysis settings loaded from JSON and overridden from the command line.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::election::ranking::{NoTrend, RandomTrend, Ranker, TrendHinter};
use crate::error::{Error, Result};
use crate::quality::CleanseMode;
use crate::training::{BandedSynthesizer, TrainerSettings};

/// Settings shared by every stage of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Cell separator of delimited text input.
    pub delimiter: char,
    /// Decimal places kept in vote percentages.
    pub percentage_precision: u32,
    /// Leaderboard length shown per category.
    pub top_n: usize,
    /// Percentage points per training progress event; must divide 100.
    pub progress_step: u8,
    /// Milliseconds between training progress events.
    pub progress_tick_ms: u64,
    pub cleanse_mode: CleanseMode,
    /// Fixes synthesized metrics and enables reproducible trend hints.
    pub seed: Option<u64>,
    /// Leave candidates the store reports as disabled out of rankings.
    pub skip_disabled: bool,
    /// Show random up/down hints next to candidates.
    pub trend_hints: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            percentage_precision: 2,
            top_n: 5,
            progress_step: 10,
            progress_tick_ms: 300,
            cleanse_mode: CleanseMode::ReportOnly,
            seed: None,
            skip_disabled: false,
            trend_hints: false,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file; absent fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::invalid_config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(Error::invalid_config("delimiter cannot be a line break"));
        }
        self.trainer_settings().validate()?;
        if self.top_n == 0 {
            return Err(Error::invalid_config("top_n must be at least 1"));
        }
        if self.percentage_precision > 10 {
            return Err(Error::invalid_config(format!(
                "percentage_precision must be at most 10, got {}",
                self.percentage_precision
            )));
        }
        Ok(())
    }

    pub fn trainer_settings(&self) -> TrainerSettings {
        TrainerSettings {
            step: self.progress_step,
            tick: Duration::from_millis(self.progress_tick_ms),
        }
    }

    pub fn synthesizer(&self) -> BandedSynthesizer {
        BandedSynthesizer::new().with_seed(self.seed)
    }

    pub fn ranker(&self) -> Ranker {
        let trend: Arc<dyn TrendHinter> = if self.trend_hints {
            Arc::new(RandomTrend::new(self.seed))
        } else {
            Arc::new(NoTrend)
        };
        Ranker::new()
            .with_precision(self.percentage_precision)
            .with_top_n(self.top_n)
            .skip_disabled(self.skip_disabled)
            .with_trend_hinter(trend)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.top_n, 5);
        assert_eq!(config.cleanse_mode, CleanseMode::ReportOnly);
        assert!(config.validate().is_ok());
        assert_eq!(config.trainer_settings(), TrainerSettings::default());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"top_n": 3, "cleanse_mode": "remove-rows", "seed": 7}"#)
                .unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.cleanse_mode, CleanseMode::RemoveRows);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.percentage_precision, 2);
        assert_eq!(config.progress_step, 10);
    }

    #[test]
    fn test_rejects_step_not_dividing_100() {
        let config = AnalysisConfig {
            progress_step: 30,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

        let zero = AnalysisConfig {
            progress_step: 0,
            ..AnalysisConfig::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_top_n() {
        let config = AnalysisConfig {
            top_n: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"delimiter": ";", "skip_disabled": true}}"#).unwrap();
        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.delimiter, ';');
        assert!(config.skip_disabled);
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{not json").unwrap();
        let err = AnalysisConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_from_file_missing() {
        let err = AnalysisConfig::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_ranker_uses_precision() {
        use crate::election::model::{CandidateRecord, Category};

        let config = AnalysisConfig {
            percentage_precision: 1,
            ..AnalysisConfig::default()
        };
        let result = config.ranker().predict(&[
            CandidateRecord::new("A", "A", "P", Category::Mayor, 1),
            CandidateRecord::new("B", "B", "P", Category::Mayor, 2),
        ]);
        assert_eq!(result.mayor.entries[0].vote_percentage, 66.7);
    }
}
