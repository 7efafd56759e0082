//! Reference oscillation parameters with 1σ uncertainties.
//!
//! Angles are tabulated as sin²(2θ) and can be read back in any of the three
//! common parameterisations (θ, sin²θ, sin²2θ). Uncertainties on a derived
//! form are the larger one-sided shift of that form when sin²(2θ) moves by
//! ±1σ, clamped to [0, 1]; this keeps maximal mixing (sin²2θ₂₃ = 1) finite.

use serde::{Deserialize, Serialize};

use crate::error::{OscillationError, OscillationResult};
use crate::parameters::theta_from_sin_sq_2theta;

/// Parameterisation of the three mixing angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterMode {
    /// θ in radians
    Theta,
    /// sin²θ
    #[default]
    SinSqTheta,
    /// sin²(2θ)
    SinSqTwoTheta,
}

impl ParameterMode {
    fn transform(self, sin_sq_2theta: f64) -> f64 {
        match self {
            ParameterMode::Theta => theta_from_sin_sq_2theta(sin_sq_2theta),
            ParameterMode::SinSqTheta => 0.5 * (1.0 - (1.0 - sin_sq_2theta).sqrt()),
            ParameterMode::SinSqTwoTheta => sin_sq_2theta,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            ParameterMode::Theta => "theta",
            ParameterMode::SinSqTheta => "sinsqtheta",
            ParameterMode::SinSqTwoTheta => "sinsq2theta",
        }
    }
}

/// A tabulated value with its 1σ uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub error: f64,
}

impl Measurement {
    pub const fn new(value: f64, error: f64) -> Self {
        Self { value, error }
    }
}

/// Reference parameter table.
///
/// Defaults are PDG central values and uncertainties. They differ from the
/// [OscillationParameters](crate::OscillationParameters) defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceParameters {
    pub sin_sq_2theta12: Measurement,
    pub sin_sq_2theta23: Measurement,
    pub sin_sq_2theta13: Measurement,
    /// δCP in radians
    pub deltacp: Measurement,
    /// Δm²₁₂ in eV²
    pub sdm: Measurement,
    /// Δm²₃₂ in eV²
    pub ldm: Measurement,
}

impl Default for ReferenceParameters {
    fn default() -> Self {
        Self {
            sin_sq_2theta12: Measurement::new(0.857, 0.024),
            // Half-Gaussian below maximal mixing: sin²2θ₂₃ > 0.95 at 90% CL
            sin_sq_2theta23: Measurement::new(1.0, 0.03),
            sin_sq_2theta13: Measurement::new(0.095, 0.010),
            deltacp: Measurement::new(0.0, 0.0),
            sdm: Measurement::new(7.5e-5, 0.2e-5),
            ldm: Measurement::new(2.32e-3, 0.10e-3),
        }
    }
}

impl ReferenceParameters {
    /// Parameter names in `set_all` order for the given parameterisation.
    pub fn names(mode: ParameterMode) -> [String; 6] {
        let prefix = mode.prefix();
        [
            format!("{prefix}12"),
            format!("{prefix}23"),
            format!("{prefix}13"),
            "deltacp".to_string(),
            "sdm".to_string(),
            "ldm".to_string(),
        ]
    }

    /// Central value of a named parameter in any parameterisation.
    pub fn value(&self, name: &str) -> OscillationResult<f64> {
        self.lookup(name).map(|(measurement, _)| measurement)
    }

    /// 1σ uncertainty of a named parameter in any parameterisation.
    pub fn error(&self, name: &str) -> OscillationResult<f64> {
        self.lookup(name).map(|(_, error)| error)
    }

    /// Values in the given parameterisation, `set_all` order.
    pub fn values(&self, mode: ParameterMode) -> [f64; 6] {
        [
            mode.transform(self.sin_sq_2theta12.value),
            mode.transform(self.sin_sq_2theta23.value),
            mode.transform(self.sin_sq_2theta13.value),
            self.deltacp.value,
            self.sdm.value,
            self.ldm.value,
        ]
    }

    /// θ12, θ23, θ13 (radians), δCP, Δm²₁₂, Δm²₃₂: ready for `set_all`.
    pub fn central_values(&self) -> [f64; 6] {
        self.values(ParameterMode::Theta)
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> OscillationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| OscillationError::Config(format!("JSON parse error: {e}")))
    }

    fn lookup(&self, name: &str) -> OscillationResult<(f64, f64)> {
        match name {
            "deltacp" => return Ok((self.deltacp.value, self.deltacp.error)),
            "sdm" => return Ok((self.sdm.value, self.sdm.error)),
            "ldm" => return Ok((self.ldm.value, self.ldm.error)),
            _ => {}
        }

        for mode in [
            ParameterMode::SinSqTwoTheta,
            ParameterMode::SinSqTheta,
            ParameterMode::Theta,
        ] {
            let Some(suffix) = name.strip_prefix(mode.prefix()) else {
                continue;
            };
            let measurement = match suffix {
                "12" => self.sin_sq_2theta12,
                "23" => self.sin_sq_2theta23,
                "13" => self.sin_sq_2theta13,
                _ => continue,
            };
            return Ok((
                mode.transform(measurement.value),
                propagated_error(mode, measurement),
            ));
        }

        Err(OscillationError::InvalidArgument(format!(
            "unknown oscillation parameter '{name}'"
        )))
    }
}

fn propagated_error(mode: ParameterMode, measurement: Measurement) -> f64 {
    let Measurement { value, error } = measurement;
    if mode == ParameterMode::SinSqTwoTheta {
        return error;
    }
    let centre = mode.transform(value);
    let up = mode.transform((value + error).clamp(0.0, 1.0));
    let down = mode.transform((value - error).clamp(0.0, 1.0));
    (up - centre).abs().max((centre - down).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_names() {
        assert_eq!(
            ReferenceParameters::names(ParameterMode::SinSqTwoTheta),
            ["sinsq2theta12", "sinsq2theta23", "sinsq2theta13", "deltacp", "sdm", "ldm"]
        );
        assert_eq!(ReferenceParameters::names(ParameterMode::Theta)[2], "theta13");
    }

    #[test]
    fn test_every_name_resolves() {
        let reference = ReferenceParameters::default();
        for mode in [
            ParameterMode::Theta,
            ParameterMode::SinSqTheta,
            ParameterMode::SinSqTwoTheta,
        ] {
            let values = reference.values(mode);
            for (name, expected) in ReferenceParameters::names(mode).iter().zip(values) {
                assert_eq!(reference.value(name).unwrap(), expected, "{}", name);
                assert!(reference.error(name).unwrap() >= 0.0);
            }
        }
    }

    #[test]
    fn test_sin_sq_2theta_values_are_tabulated() {
        let reference = ReferenceParameters::default();
        assert_eq!(reference.value("sinsq2theta13").unwrap(), 0.095);
        assert_eq!(reference.error("sinsq2theta13").unwrap(), 0.010);
        assert_eq!(reference.value("ldm").unwrap(), 2.32e-3);
        assert_eq!(reference.error("sdm").unwrap(), 0.2e-5);
    }

    #[test]
    fn test_theta_forms() {
        let reference = ReferenceParameters::default();
        assert!((reference.value("theta23").unwrap() - PI / 4.0).abs() < EPSILON);
        assert!((reference.value("sinsqtheta23").unwrap() - 0.5).abs() < EPSILON);

        let s13 = reference.value("sinsqtheta13").unwrap();
        assert!((4.0 * s13 * (1.0 - s13) - 0.095).abs() < EPSILON);
    }

    #[test]
    fn test_error_at_maximal_mixing_is_finite() {
        let reference = ReferenceParameters::default();
        let error = reference.error("theta23").unwrap();
        assert!(error.is_finite());
        let expected = PI / 4.0 - theta_from_sin_sq_2theta(0.97);
        assert!((error - expected).abs() < EPSILON);
    }

    #[test]
    fn test_unknown_name() {
        let reference = ReferenceParameters::default();
        for name in ["theta14", "sinsq2theta", "dm31", ""] {
            assert!(matches!(
                reference.value(name),
                Err(OscillationError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_json_round_trip() {
        let reference = ReferenceParameters::default();
        let json = serde_json::to_string(&reference).unwrap();
        assert_eq!(ReferenceParameters::from_json(&json).unwrap(), reference);
    }
}
