//! Engine configuration.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OscillationError, OscillationResult};
use crate::parameters::DEFAULT_BASELINE;
use crate::propagator::{DEFAULT_ELECTRON_FRACTION, DEFAULT_NEWTON_ITERATIONS};

/// Constant matter density along the beam path, in g/cm³ (Earth crust).
pub const MATTER_DENSITY: f64 = 2.6;

/// Energy samples used by band-averaged probabilities.
pub const DEFAULT_AVERAGE_SAMPLES: usize = 10;

/// Runtime configuration for a [ProbabilityEngine](crate::ProbabilityEngine).
///
/// Oscillation parameters are not part of the configuration; they start at
/// their defaults and are changed through the engine's setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Baseline in km.
    /// Default: 295.0
    pub baseline: f64,

    /// Matter density in g/cm³.
    /// Default: 2.6
    pub matter_density: f64,

    /// Electron fraction Y_e.
    /// Default: 0.5
    pub electron_fraction: f64,

    /// Newton iterations refining the matter eigenvalues.
    /// Default: 1
    pub newton_iterations: u8,

    /// Energy samples per band average.
    /// Default: 10
    pub average_samples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE,
            matter_density: MATTER_DENSITY,
            electron_fraction: DEFAULT_ELECTRON_FRACTION,
            newton_iterations: DEFAULT_NEWTON_ITERATIONS,
            average_samples: DEFAULT_AVERAGE_SAMPLES,
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> OscillationResult<()> {
        if !self.baseline.is_finite() || self.baseline < 0.0 {
            return Err(OscillationError::Config(format!(
                "baseline must be finite and >= 0, got {}",
                self.baseline
            )));
        }
        if !self.matter_density.is_finite() || self.matter_density < 0.0 {
            return Err(OscillationError::Config(format!(
                "matter_density must be finite and >= 0, got {}",
                self.matter_density
            )));
        }
        if !(self.electron_fraction > 0.0 && self.electron_fraction <= 1.0) {
            return Err(OscillationError::Config(format!(
                "electron_fraction must be in (0, 1], got {}",
                self.electron_fraction
            )));
        }
        if self.average_samples == 0 {
            return Err(OscillationError::Config(
                "average_samples must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string and validate.
    pub fn from_json(json: &str) -> OscillationResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| OscillationError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        debug!(?config, "loaded engine configuration");
        Ok(config)
    }
}
