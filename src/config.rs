use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::{math, perf::performance::EvaluationGrid};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read run configuration")]
    Io(#[from] std::io::Error),

    #[error("Error deserializing run configuration")]
    Deserialize(#[from] toml::de::Error),

    #[error("Velocity sweep needs at least 2 samples (got {samples})")]
    TooFewSamples { samples: usize },

    #[error("Velocity sweep [{start_m_s}, {end_m_s}] m/s must be positive and ascending")]
    BadSweepRange { start_m_s: f64, end_m_s: f64 },

    #[error("Altitude list is empty")]
    NoAltitudes,
}

/// Run configuration. Every field has a default; a missing file means
/// "all defaults".
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub sweep: SweepConfig,
    pub charts: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub start_m_s: f64,
    pub end_m_s: f64,
    pub samples: usize,
    pub altitudes_m: Vec<u32>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            start_m_s: 50.0,
            end_m_s: 800.0,
            samples: 750,
            altitudes_m: vec![5000, 8000, 11000, 15000, 18000],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Thrust axis ceiling of the thrust-velocity charts, kN.
    pub thrust_axis_max_kn: f64,
    /// Mach axis range of the thrust-Mach charts.
    pub mach_axis_min: f64,
    pub mach_axis_max: f64,
    /// Thrust axis ceiling of the thrust-Mach charts, kN.
    pub mach_thrust_axis_max_kn: f64,
    /// Fitted-curve sampling for the minimum-drag chart.
    pub fit_axis_max_km: f64,
    pub fit_curve_samples: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            thrust_axis_max_kn: 400.0,
            mach_axis_min: 0.6,
            mach_axis_max: 1.0,
            mach_thrust_axis_max_kn: 150.0,
            fit_axis_max_km: 18.0,
            fit_curve_samples: 200,
        }
    }
}

impl RunConfig {
    /// Reads the configuration file, or returns the defaults when no path
    /// is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => toml::from_str::<RunConfig>(&fs::read_to_string(path)?)?,
            None => RunConfig::default(),
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sweep = &self.sweep;

        if sweep.samples < 2 {
            return Err(ConfigError::TooFewSamples {
                samples: sweep.samples,
            });
        }

        if !(sweep.start_m_s > 0.0) || !(sweep.end_m_s > sweep.start_m_s) {
            return Err(ConfigError::BadSweepRange {
                start_m_s: sweep.start_m_s,
                end_m_s: sweep.end_m_s,
            });
        }

        if sweep.altitudes_m.is_empty() {
            return Err(ConfigError::NoAltitudes);
        }

        Ok(())
    }

    pub fn grid(&self) -> EvaluationGrid {
        EvaluationGrid {
            velocities_m_s: math::linspace(
                self.sweep.start_m_s,
                self.sweep.end_m_s,
                self.sweep.samples,
            ),
            altitudes_m: self.sweep.altitudes_m.clone(),
        }
    }
}
