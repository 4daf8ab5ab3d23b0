//! # Reactor configuration and task files
//!
//! - **`ReactorConfiguration`**: immutable operating point and geometry of one simulation request
//! - **`SolverSettings`**: numerical knobs (radial resolution, trace size guard, parallel threshold)
//! - **`ReactorTask`**: everything needed for a run, (de)serialised from a JSON task file
//!
//! Units: feed rate kmol/min, lengths m, temperatures K, times min.
use super::RealPFR::ReactorError;
use super::reactor_grid::DEFAULT_RADIAL_NODES;
use crate::Constants::PhysicalConstants;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorConfiguration {
    /// palmitic acid feed, kmol/min
    pub feed_rate: f64,
    /// isopropyl alcohol / palmitic acid
    pub molar_ratio: f64,
    /// reactor length, m
    pub L: f64,
    /// reactor radius, m
    pub R: f64,
    /// K
    pub feed_temp: f64,
    /// heater (jacket) temperature, K
    pub heater_temp: f64,
    pub axial_nodes: usize,
}

impl ReactorConfiguration {
    #[allow(non_snake_case)]
    pub fn new(
        feed_rate: f64,
        molar_ratio: f64,
        L: f64,
        R: f64,
        feed_temp: f64,
        heater_temp: f64,
        axial_nodes: usize,
    ) -> Self {
        Self {
            feed_rate,
            molar_ratio,
            L,
            R,
            feed_temp,
            heater_temp,
            axial_nodes,
        }
    }

    /// Checks:
    /// - feed rate, geometry and temperatures positive and finite
    /// - molar ratio >= 1 (palmitic acid stays the limiting reactant)
    /// - at least 2 axial nodes
    pub fn validate(&self) -> Result<(), ReactorError> {
        let positive = [
            ("feed_rate", self.feed_rate),
            ("L", self.L),
            ("R", self.R),
            ("feed_temp", self.feed_temp),
            ("heater_temp", self.heater_temp),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if !self.molar_ratio.is_finite() || self.molar_ratio < 1.0 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "molar_ratio must be >= 1, got {}",
                self.molar_ratio
            )));
        }
        if self.axial_nodes < 2 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "axial_nodes must be >= 2, got {}",
                self.axial_nodes
            )));
        }
        Ok(())
    }
}

impl Default for ReactorConfiguration {
    /// the dashboard's starting point: 80.31 kmol/hr acid, M = 5, 4 m × 1.25 m tube
    fn default() -> Self {
        Self::new(80.31 / 60.0, 5.0, 4.0, 1.25, 393.0, 420.0, 51)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub radial_nodes: usize,
    /// upper bound on samples × cells × state variables held by one trace
    pub max_trace_values: usize,
    /// cell count above which the step update runs on the rayon pool (`parallel` feature)
    pub parallel_threshold: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            radial_nodes: DEFAULT_RADIAL_NODES,
            max_trace_values: 100_000_000,
            parallel_threshold: 2_000,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), ReactorError> {
        if self.radial_nodes < 3 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "radial_nodes must be >= 3, got {}",
                self.radial_nodes
            )));
        }
        if self.max_trace_values == 0 {
            return Err(ReactorError::InvalidConfiguration(
                "max_trace_values must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A complete simulation request as stored in a task file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorTask {
    pub problem_name: Option<String>,
    pub configuration: ReactorConfiguration,
    #[serde(default)]
    pub settings: SolverSettings,
    /// min
    pub time_step: f64,
    /// min
    pub time_end: f64,
    /// alternate constants table; the reference table is used when absent
    #[serde(default)]
    pub constants: Option<PhysicalConstants>,
}

impl Default for ReactorTask {
    fn default() -> Self {
        Self {
            problem_name: Some("real PFR, PTSA esterification".to_string()),
            configuration: ReactorConfiguration::default(),
            settings: SolverSettings::default(),
            time_step: 0.1,
            time_end: 100.0,
            constants: None,
        }
    }
}

impl ReactorTask {
    pub fn check_task(&self) -> Result<(), ReactorError> {
        self.configuration.validate()?;
        self.settings.validate()?;
        if let Some(constants) = &self.constants {
            constants.validate()?;
        }
        if !(self.time_step > 0.0) || !self.time_step.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if !(self.time_end > 0.0) || !self.time_end.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "time_end must be positive, got {}",
                self.time_end
            )));
        }
        Ok(())
    }

    pub fn constants(&self) -> PhysicalConstants {
        self.constants.clone().unwrap_or_default()
    }

    pub fn from_json_str(content: &str) -> Result<Self, ReactorError> {
        let task: ReactorTask = serde_json::from_str(content)?;
        task.check_task()?;
        Ok(task)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReactorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let task = Self::from_json_str(&content)?;
        info!("reactor task loaded from {}", path.display());
        Ok(task)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ReactorError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_configuration_is_valid() {
        let config = ReactorConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.axial_nodes, 51);
        assert!((config.feed_rate - 1.3385).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_configurations_rejected() {
        let base = ReactorConfiguration::default();
        let cases = vec![
            ReactorConfiguration { feed_rate: 0.0, ..base.clone() },
            ReactorConfiguration { molar_ratio: 0.5, ..base.clone() },
            ReactorConfiguration { L: -4.0, ..base.clone() },
            ReactorConfiguration { R: 0.0, ..base.clone() },
            ReactorConfiguration { feed_temp: f64::NAN, ..base.clone() },
            ReactorConfiguration { heater_temp: 0.0, ..base.clone() },
            ReactorConfiguration { axial_nodes: 1, ..base.clone() },
        ];
        for config in cases {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ReactorError::InvalidConfiguration(_)), "{:?}", config);
        }
    }

    #[test]
    fn test_task_file_round_trip() {
        let task = ReactorTask::default();
        let file = NamedTempFile::new().unwrap();
        task.save_to_file(file.path()).unwrap();
        let loaded = ReactorTask::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.configuration.axial_nodes, task.configuration.axial_nodes);
        assert_eq!(loaded.settings, task.settings);
        assert!((loaded.time_end - 100.0).abs() < 1e-12);
        assert!(loaded.constants.is_none());
    }

    #[test]
    fn test_task_settings_default_when_missing() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "problem_name": null,
                "configuration": {{
                    "feed_rate": 1.0, "molar_ratio": 3.0, "L": 2.0, "R": 0.5,
                    "feed_temp": 393.0, "heater_temp": 420.0, "axial_nodes": 21
                }},
                "time_step": 0.05,
                "time_end": 10.0
            }}"#
        )
        .unwrap();
        let task = ReactorTask::load_from_file(file.path()).unwrap();
        assert_eq!(task.settings, SolverSettings::default());
        assert_eq!(task.configuration.axial_nodes, 21);
    }

    #[test]
    fn test_bad_task_rejected() {
        let mut task = ReactorTask::default();
        task.time_step = 0.0;
        assert!(task.check_task().is_err());
        assert!(matches!(
            ReactorTask::from_json_str("{ not json"),
            Err(ReactorError::Json(_))
        ));
        assert!(matches!(
            ReactorTask::load_from_file("/definitely/not/here.json"),
            Err(ReactorError::Io(_))
        ));
    }
}
