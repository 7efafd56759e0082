//! Error types for parameter management and probability queries.

use thiserror::Error;

use crate::flavour::CpSign;

/// Failures raised by the oscillation propagator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropagationError {
    /// Propagation was requested before the mixing was configured.
    #[error("propagator mixing has not been configured")]
    NotConfigured,

    /// A probability was requested before any propagation step ran.
    #[error("no propagation has been performed yet")]
    NotPropagated,

    /// Channel index magnitude is not one of 1, 2, 3.
    #[error("invalid channel index {index}, expected ±1, ±2 or ±3")]
    InvalidChannel { index: i32 },

    /// The channel sign disagrees with the CP sign of the last propagation.
    #[error("channel {channel} does not match the propagated {cp} state")]
    CpMismatch { channel: i32, cp: CpSign },
}

/// Root error type for all oscillation queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OscillationError {
    /// PDG code magnitude is not 12, 14 or 16.
    #[error("unknown particle: PDG code {pdg} is not a neutrino")]
    UnknownParticle { pdg: i32 },

    /// Propagation was attempted while parameters were still marked dirty.
    #[error("stale oscillation parameters: recompute was not performed before propagation")]
    StaleParameters,

    /// The propagator rejected the request.
    #[error("propagation error: {0}")]
    Propagation(#[from] PropagationError),

    /// Invalid argument to a query (sample count, bin edges).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

pub type OscillationResult<T> = Result<T, OscillationError>;
