//! Oscillation parameter set with cached derived mixing.
//!
//! The six oscillation parameters (three angles, δCP, two splittings) are the
//! inputs to the propagator's mixing configuration. Any change to them marks
//! the set [ParameterState::Dirty]; [OscillationParameters::recompute] rebuilds
//! the [DerivedMixing] and is the only way back to [ParameterState::Clean].
//! The baseline is read fresh on every propagation and never dirties the set.

use core::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OscillationError, OscillationResult};

/// sin²(2θ₂₃) used for the default parameter set.
pub const DEFAULT_SIN_SQ_2THETA23: f64 = 1.0;
/// sin²(2θ₁₃) used for the default parameter set.
pub const DEFAULT_SIN_SQ_2THETA13: f64 = 0.1;
/// sin²(2θ₁₂) used for the default parameter set.
pub const DEFAULT_SIN_SQ_2THETA12: f64 = 0.8495;
/// Default δCP in radians.
pub const DEFAULT_DELTA_CP: f64 = PI / 2.0;
/// Default Δm²₃₂ in eV².
pub const DEFAULT_LARGE_DELTA_MASS_SQUARED: f64 = 2.4e-3;
/// Default Δm²₁₂ in eV².
pub const DEFAULT_SMALL_DELTA_MASS_SQUARED: f64 = 7.6e-5;
/// Default baseline in km (Tokai to Kamioka).
pub const DEFAULT_BASELINE: f64 = 295.0;

/// θ = arcsin(√(sin²2θ)) / 2, in radians.
pub fn theta_from_sin_sq_2theta(sin_sq_2theta: f64) -> f64 {
    sin_sq_2theta.sqrt().asin() / 2.0
}

/// sin²(2θ) for an angle in radians.
pub fn sin_sq_2theta(theta: f64) -> f64 {
    let s = (2.0 * theta).sin();
    s * s
}

/// sin²(θ) for an angle in radians.
pub fn sin_sq(theta: f64) -> f64 {
    let s = theta.sin();
    s * s
}

/// Cache state of the derived mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterState {
    /// Derived mixing matches the current parameters.
    Clean,
    /// At least one oscillation parameter changed since the last recompute.
    Dirty,
}

/// The representation handed to the propagator's mixing configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMixing {
    pub s12sq: f64,
    pub s13sq: f64,
    pub s23sq: f64,
    /// Δm²₁₂ in eV², passed through unchanged.
    pub dmsq21: f64,
    /// `ldm - sdm` in eV².
    pub dmsq32: f64,
    /// δCP in radians.
    pub delta: f64,
}

/// Name of one of the six oscillation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Theta12,
    Theta23,
    Theta13,
    DeltaCp,
    Sdm,
    Ldm,
}

impl Parameter {
    /// All parameters in `set_all` argument order.
    pub const ALL: [Parameter; 6] = [
        Parameter::Theta12,
        Parameter::Theta23,
        Parameter::Theta13,
        Parameter::DeltaCp,
        Parameter::Sdm,
        Parameter::Ldm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::Theta12 => "theta12",
            Parameter::Theta23 => "theta23",
            Parameter::Theta13 => "theta13",
            Parameter::DeltaCp => "deltacp",
            Parameter::Sdm => "sdm",
            Parameter::Ldm => "ldm",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Parameter::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Mixing angles, CP phase, mass splittings and baseline.
///
/// Angles and δCP are in radians, splittings in eV², baseline in km. No range
/// checks are applied to any value.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillationParameters {
    theta12: f64,
    theta13: f64,
    theta23: f64,
    deltacp: f64,
    sdm: f64,
    ldm: f64,
    baseline: f64,
    state: ParameterState,
    derived: DerivedMixing,
    generation: u64,
}

impl Default for OscillationParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl OscillationParameters {
    /// Default parameter set, starting in the [ParameterState::Dirty] state.
    pub fn new() -> Self {
        let mut params = Self {
            theta12: theta_from_sin_sq_2theta(DEFAULT_SIN_SQ_2THETA12),
            theta13: theta_from_sin_sq_2theta(DEFAULT_SIN_SQ_2THETA13),
            theta23: theta_from_sin_sq_2theta(DEFAULT_SIN_SQ_2THETA23),
            deltacp: DEFAULT_DELTA_CP,
            sdm: DEFAULT_SMALL_DELTA_MASS_SQUARED,
            ldm: DEFAULT_LARGE_DELTA_MASS_SQUARED,
            baseline: DEFAULT_BASELINE,
            state: ParameterState::Dirty,
            derived: DerivedMixing {
                s12sq: 0.0,
                s13sq: 0.0,
                s23sq: 0.0,
                dmsq21: 0.0,
                dmsq32: 0.0,
                delta: 0.0,
            },
            generation: 0,
        };
        params.derived = params.derive();
        params
    }

    /// Set all six oscillation parameters at once.
    pub fn set_all(
        &mut self,
        theta12: f64,
        theta23: f64,
        theta13: f64,
        deltacp: f64,
        sdm: f64,
        ldm: f64,
    ) {
        self.theta12 = theta12;
        self.theta23 = theta23;
        self.theta13 = theta13;
        self.deltacp = deltacp;
        self.sdm = sdm;
        self.ldm = ldm;
        self.touch();
    }

    pub fn set_theta12(&mut self, value: f64) {
        self.theta12 = value;
        self.touch();
    }

    pub fn set_theta13(&mut self, value: f64) {
        self.theta13 = value;
        self.touch();
    }

    pub fn set_theta23(&mut self, value: f64) {
        self.theta23 = value;
        self.touch();
    }

    pub fn set_delta_cp(&mut self, value: f64) {
        self.deltacp = value;
        self.touch();
    }

    pub fn set_small_delta_mass_squared(&mut self, value: f64) {
        self.sdm = value;
        self.touch();
    }

    pub fn set_large_delta_mass_squared(&mut self, value: f64) {
        self.ldm = value;
        self.touch();
    }

    /// Baseline is consumed at propagation time; the state is left untouched.
    pub fn set_baseline(&mut self, value: f64) {
        self.baseline = value;
    }

    /// Set a parameter by name.
    pub fn set(&mut self, parameter: Parameter, value: f64) {
        match parameter {
            Parameter::Theta12 => self.set_theta12(value),
            Parameter::Theta23 => self.set_theta23(value),
            Parameter::Theta13 => self.set_theta13(value),
            Parameter::DeltaCp => self.set_delta_cp(value),
            Parameter::Sdm => self.set_small_delta_mass_squared(value),
            Parameter::Ldm => self.set_large_delta_mass_squared(value),
        }
    }

    /// Read a parameter by name.
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Theta12 => self.theta12,
            Parameter::Theta23 => self.theta23,
            Parameter::Theta13 => self.theta13,
            Parameter::DeltaCp => self.deltacp,
            Parameter::Sdm => self.sdm,
            Parameter::Ldm => self.ldm,
        }
    }

    /// The six parameters in `set_all` order.
    pub fn values(&self) -> [f64; 6] {
        [
            self.theta12,
            self.theta23,
            self.theta13,
            self.deltacp,
            self.sdm,
            self.ldm,
        ]
    }

    /// Rebuild the derived mixing and mark the set clean.
    pub fn recompute(&mut self) {
        self.derived = self.derive();
        self.state = ParameterState::Clean;
        self.generation += 1;
        debug!(
            generation = self.generation,
            s12sq = self.derived.s12sq,
            s13sq = self.derived.s13sq,
            s23sq = self.derived.s23sq,
            dmsq32 = self.derived.dmsq32,
            "recomputed oscillation mixing"
        );
    }

    /// Recompute only if dirty. Returns whether a recompute happened.
    pub fn refresh(&mut self) -> bool {
        if self.is_dirty() {
            self.recompute();
            true
        } else {
            false
        }
    }

    /// Derived mixing, refusing to hand out a stale cache.
    pub fn mixing(&self) -> OscillationResult<&DerivedMixing> {
        match self.state {
            ParameterState::Clean => Ok(&self.derived),
            ParameterState::Dirty => Err(OscillationError::StaleParameters),
        }
    }

    pub fn state(&self) -> ParameterState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == ParameterState::Dirty
    }

    /// Number of recomputes performed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn theta12(&self) -> f64 {
        self.theta12
    }

    pub fn theta13(&self) -> f64 {
        self.theta13
    }

    pub fn theta23(&self) -> f64 {
        self.theta23
    }

    pub fn delta_cp(&self) -> f64 {
        self.deltacp
    }

    pub fn small_delta_mass_squared(&self) -> f64 {
        self.sdm
    }

    pub fn large_delta_mass_squared(&self) -> f64 {
        self.ldm
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    fn touch(&mut self) {
        self.state = ParameterState::Dirty;
    }

    fn derive(&self) -> DerivedMixing {
        DerivedMixing {
            s12sq: sin_sq(self.theta12),
            s13sq: sin_sq(self.theta13),
            s23sq: sin_sq(self.theta23),
            dmsq21: self.sdm,
            dmsq32: self.ldm - self.sdm,
            delta: self.deltacp,
        }
    }
}
