//! # nuprob
//!
//! Three-flavour neutrino oscillation probabilities with a cached parameter
//! state and energy-band averaging.
//!
//! ## Features
//!
//! - **Parameter management**: mixing angles, δCP, mass splittings and
//!   baseline, with lazy recomputation of the derived mixing
//! - **Stale-state guard**: propagation never runs on outdated parameters
//! - **Matter effects (MSW)**: constant-density matter via the NuFast DMP
//!   algorithm with Newton refinement
//! - **Band averages**: mean probability over an energy bin, or over a whole
//!   binning
//! - **PDG identifiers**: flavour and CP sign straight from particle codes
//!
//! ## Quick Start
//!
//! ```rust
//! use nuprob::{CpSign, Flavour, ProbabilityEngine};
//!
//! let mut engine = ProbabilityEngine::new();
//! engine.set_baseline(295.0);
//!
//! // P(νμ → νe) at the T2K peak
//! let appearance = engine
//!     .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::Matter)
//!     .unwrap();
//! assert!(appearance > 0.0 && appearance < 1.0);
//!
//! // Averaged over 0.5-0.7 GeV with 10 samples
//! let band = engine
//!     .average_probability(Flavour::Muon, Flavour::Muon, 0.5, 0.7, CpSign::Matter, 10)
//!     .unwrap();
//! assert!(band < 0.5);
//! ```
//!
//! ## Threading
//!
//! A [ProbabilityEngine] mutates its propagator on every query. Use one engine
//! per thread, or wrap it in a `Mutex` and hold the lock across the whole
//! set-parameters-then-query sequence.

pub mod config;
pub mod engine;
pub mod error;
pub mod flavour;
pub mod parameters;
pub mod pdg;
pub mod propagator;

pub use config::{EngineConfig, DEFAULT_AVERAGE_SAMPLES, MATTER_DENSITY};
pub use engine::ProbabilityEngine;
pub use error::{OscillationError, OscillationResult, PropagationError};
pub use flavour::{CpSign, Flavour};
pub use parameters::{DerivedMixing, OscillationParameters, Parameter, ParameterState};
pub use pdg::{Measurement, ParameterMode, ReferenceParameters};
pub use propagator::{DmpPropagator, MixingForm, MnsParameters, ProbabilityMatrix, Propagator};
