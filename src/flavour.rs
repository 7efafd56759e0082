//! Neutrino flavour and CP sign identifiers.
//!
//! Both are derived from PDG Monte Carlo particle codes: the magnitude selects
//! the flavour (12 = νe, 14 = νμ, 16 = ντ) and the sign selects particle or
//! antiparticle.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OscillationError, OscillationResult};

/// Neutrino flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flavour {
    Electron,
    Muon,
    Tau,
}

impl Flavour {
    /// All flavours in channel-index order.
    pub const ALL: [Flavour; 3] = [Flavour::Electron, Flavour::Muon, Flavour::Tau];

    /// Map a PDG code to a flavour, ignoring its sign.
    ///
    /// ```rust
    /// use nuprob::Flavour;
    ///
    /// assert_eq!(Flavour::from_pdg(-14).unwrap(), Flavour::Muon);
    /// assert!(Flavour::from_pdg(13).is_err());
    /// ```
    pub fn from_pdg(pdg: i32) -> OscillationResult<Self> {
        match pdg.unsigned_abs() {
            12 => Ok(Flavour::Electron),
            14 => Ok(Flavour::Muon),
            16 => Ok(Flavour::Tau),
            _ => Err(OscillationError::UnknownParticle { pdg }),
        }
    }

    /// Absolute PDG code of the neutrino (never negative).
    pub fn pdg(self) -> i32 {
        match self {
            Flavour::Electron => 12,
            Flavour::Muon => 14,
            Flavour::Tau => 16,
        }
    }

    /// Propagator channel index: 1 = e, 2 = μ, 3 = τ.
    pub fn index(self) -> i32 {
        match self {
            Flavour::Electron => 1,
            Flavour::Muon => 2,
            Flavour::Tau => 3,
        }
    }

    /// Signed channel index, negative for the antineutrino channel.
    pub fn channel(self, cp: CpSign) -> i32 {
        cp.value() * self.index()
    }

    /// Inverse of [Flavour::channel], ignoring the sign.
    pub fn from_channel(index: i32) -> Option<Self> {
        match index.unsigned_abs() {
            1 => Some(Flavour::Electron),
            2 => Some(Flavour::Muon),
            3 => Some(Flavour::Tau),
            _ => None,
        }
    }

    /// Row/column position in a [crate::ProbabilityMatrix].
    pub fn position(self) -> usize {
        (self.index() - 1) as usize
    }
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Flavour::Electron => "e",
            Flavour::Muon => "mu",
            Flavour::Tau => "tau",
        };
        f.write_str(label)
    }
}

/// Matter (neutrino) or antimatter (antineutrino).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CpSign {
    #[default]
    Matter,
    AntiMatter,
}

impl CpSign {
    /// Negative codes are antiparticles; zero counts as matter.
    pub fn from_pdg(pdg: i32) -> Self {
        if pdg < 0 {
            CpSign::AntiMatter
        } else {
            CpSign::Matter
        }
    }

    /// +1 for matter, -1 for antimatter.
    pub fn value(self) -> i32 {
        match self {
            CpSign::Matter => 1,
            CpSign::AntiMatter => -1,
        }
    }

    /// Parse a ±1 sign.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(CpSign::Matter),
            -1 => Some(CpSign::AntiMatter),
            _ => None,
        }
    }

    /// Sign of a channel index (only meaningful for non-zero indices).
    pub fn of_channel(index: i32) -> Self {
        if index < 0 {
            CpSign::AntiMatter
        } else {
            CpSign::Matter
        }
    }
}

impl fmt::Display for CpSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpSign::Matter => f.write_str("matter"),
            CpSign::AntiMatter => f.write_str("anti-matter"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pdg_ignores_sign() {
        for (pdg, expected) in [
            (12, Flavour::Electron),
            (-12, Flavour::Electron),
            (14, Flavour::Muon),
            (-14, Flavour::Muon),
            (16, Flavour::Tau),
            (-16, Flavour::Tau),
        ] {
            assert_eq!(Flavour::from_pdg(pdg).unwrap(), expected, "pdg {}", pdg);
        }
    }

    #[test]
    fn test_from_pdg_rejects_non_neutrinos() {
        for pdg in [0, 11, -11, 13, 15, 22, 2212, i32::MIN] {
            assert_eq!(
                Flavour::from_pdg(pdg),
                Err(OscillationError::UnknownParticle { pdg })
            );
        }
    }

    #[test]
    fn test_cp_from_pdg() {
        assert_eq!(CpSign::from_pdg(-14), CpSign::AntiMatter);
        assert_eq!(CpSign::from_pdg(14), CpSign::Matter);
        assert_eq!(CpSign::from_pdg(0), CpSign::Matter);
        assert_eq!(CpSign::from_pdg(-1), CpSign::AntiMatter);
    }

    #[test]
    fn test_channel_index() {
        assert_eq!(Flavour::Muon.channel(CpSign::Matter), 2);
        assert_eq!(Flavour::Tau.channel(CpSign::AntiMatter), -3);
        for flavour in Flavour::ALL {
            assert_eq!(Flavour::from_channel(flavour.channel(CpSign::AntiMatter)), Some(flavour));
            assert_eq!(Flavour::from_pdg(flavour.pdg()).unwrap(), flavour);
        }
        assert_eq!(Flavour::from_channel(0), None);
        assert_eq!(Flavour::from_channel(4), None);
    }

    #[test]
    fn test_cp_value() {
        assert_eq!(CpSign::from_value(1), Some(CpSign::Matter));
        assert_eq!(CpSign::from_value(-1), Some(CpSign::AntiMatter));
        assert_eq!(CpSign::from_value(0), None);
        assert_eq!(CpSign::default(), CpSign::Matter);
    }
}
