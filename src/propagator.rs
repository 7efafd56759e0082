//! Oscillation propagators.
//!
//! A [Propagator] is the stateful engine behind a
//! [ProbabilityEngine](crate::ProbabilityEngine): it is configured with a
//! mixing matrix and energy, propagated through matter along a baseline, then
//! queried for individual channel probabilities.
//!
//! [DmpPropagator] implements this with the NuFast algorithm of Peter Denton:
//! DMP approximation of the matter eigenvalues, optional Newton refinement of
//! λ₃, and the Rosetta/NHS identities for the matter-modified mixing.

#![allow(non_snake_case)]

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::PropagationError;
use crate::flavour::{CpSign, Flavour};

/// Conversion factor: eV² × km → GeV (divided by 4)
///
/// This combines ħc and unit conversions for the oscillation phase:
/// Δ = Δm² × L / (4E) in natural units
const EV_SQ_KM_TO_GEV_OVER4: f64 = 1e-9 / 1.97327e-7 * 1e3 / 4.0;

/// Matter potential conversion factor: Y_e × ρ × E → A
///
/// A = √2 G_F N_e E where N_e = Y_e × ρ × N_A / m_nucleon
/// This constant is approximately 1.52 × 10⁻⁴ eV² / (g/cm³ × GeV)
const YE_RHO_E_TO_A: f64 = 1.52e-4;

/// Electron fraction of Earth-crust matter.
pub const DEFAULT_ELECTRON_FRACTION: f64 = 0.5;

/// Newton iterations applied to the DMP λ₃ estimate.
pub const DEFAULT_NEWTON_ITERATIONS: u8 = 1;

/// 3×3 probability matrix type.
///
/// Indexed as `probs[α][β]` = P(ν_α → ν_β) where:
/// - 0 = electron (e)
/// - 1 = muon (μ)
/// - 2 = tau (τ)
pub type ProbabilityMatrix = [[f64; 3]; 3];

/// How the three mixing inputs of [MnsParameters] are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MixingForm {
    /// sin²θ
    #[default]
    SinSquaredTheta,
    /// sin²(2θ), resolved to the first octant.
    SinSquaredTwoTheta,
}

impl MixingForm {
    fn to_sin_squared(self, x: f64) -> f64 {
        match self {
            MixingForm::SinSquaredTheta => x,
            MixingForm::SinSquaredTwoTheta => 0.5 * (1.0 - (1.0 - x).sqrt()),
        }
    }
}

/// Mixing configuration for one propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MnsParameters {
    pub x12: f64,
    pub x13: f64,
    pub x23: f64,
    /// Δm²₂₁ in eV²
    pub dmsq21: f64,
    /// Δm²₃₂ in eV²
    pub dmsq32: f64,
    /// δCP in radians
    pub delta: f64,
    /// Neutrino energy in GeV
    pub energy: f64,
    pub form: MixingForm,
    /// Antimatter conjugates the mixing matrix (δ → -δ).
    pub cp: CpSign,
}

/// Stateful oscillation engine: configure, propagate, query.
pub trait Propagator {
    /// Store the mixing, splittings and energy for the next propagation.
    fn set_mns(&mut self, mns: &MnsParameters);

    /// Propagate through `baseline` km of matter with constant `density` g/cm³.
    fn propagate_linear(
        &mut self,
        cp: CpSign,
        baseline: f64,
        density: f64,
    ) -> Result<(), PropagationError>;

    /// Transition probability between signed channel indices (±1 = e, ±2 = μ,
    /// ±3 = τ; negative for antineutrinos) from the last propagation.
    fn probability(&self, initial: i32, final_: i32) -> Result<f64, PropagationError>;
}

/// Matter propagator using the NuFast DMP algorithm.
#[derive(Debug, Clone)]
pub struct DmpPropagator {
    electron_fraction: f64,
    newton_iterations: u8,
    mns: Option<MnsParameters>,
    propagated: Option<(CpSign, ProbabilityMatrix)>,
}

impl Default for DmpPropagator {
    fn default() -> Self {
        Self::new(DEFAULT_ELECTRON_FRACTION, DEFAULT_NEWTON_ITERATIONS)
    }
}

impl DmpPropagator {
    pub fn new(electron_fraction: f64, newton_iterations: u8) -> Self {
        Self {
            electron_fraction,
            newton_iterations,
            mns: None,
            propagated: None,
        }
    }

    pub fn electron_fraction(&self) -> f64 {
        self.electron_fraction
    }

    pub fn newton_iterations(&self) -> u8 {
        self.newton_iterations
    }

    /// Full matrix from the last propagation.
    pub fn matrix(&self) -> Result<&ProbabilityMatrix, PropagationError> {
        self.propagated
            .as_ref()
            .map(|(_, probs)| probs)
            .ok_or(PropagationError::NotPropagated)
    }
}

impl Propagator for DmpPropagator {
    fn set_mns(&mut self, mns: &MnsParameters) {
        self.mns = Some(*mns);
        self.propagated = None;
    }

    fn propagate_linear(
        &mut self,
        cp: CpSign,
        baseline: f64,
        density: f64,
    ) -> Result<(), PropagationError> {
        let mns = self.mns.ok_or(PropagationError::NotConfigured)?;

        let delta = f64::from(mns.cp.value()) * mns.delta;
        let Amatter =
            f64::from(cp.value()) * self.electron_fraction * density * mns.energy * YE_RHO_E_TO_A;

        let input = MatterInput {
            s12sq: mns.form.to_sin_squared(mns.x12),
            s13sq: mns.form.to_sin_squared(mns.x13),
            s23sq: mns.form.to_sin_squared(mns.x23),
            delta,
            Dmsq21: mns.dmsq21,
            Dmsq31: mns.dmsq32 + mns.dmsq21,
            Lover4E: EV_SQ_KM_TO_GEV_OVER4 * baseline / mns.energy,
            Amatter,
            N_Newton: self.newton_iterations,
        };
        trace!(
            %cp,
            baseline,
            density,
            energy = mns.energy,
            "propagating through constant-density matter"
        );

        self.propagated = Some((cp, matter_probabilities(&input)));
        Ok(())
    }

    fn probability(&self, initial: i32, final_: i32) -> Result<f64, PropagationError> {
        let (cp, probs) = self
            .propagated
            .as_ref()
            .ok_or(PropagationError::NotPropagated)?;

        let mut position = [0usize; 2];
        for (slot, channel) in position.iter_mut().zip([initial, final_]) {
            let flavour = Flavour::from_channel(channel)
                .ok_or(PropagationError::InvalidChannel { index: channel })?;
            if CpSign::of_channel(channel) != *cp {
                return Err(PropagationError::CpMismatch { channel, cp: *cp });
            }
            *slot = flavour.position();
        }
        Ok(probs[position[0]][position[1]])
    }
}

/// Inputs to the DMP matter calculation, with the CP sign already folded into
/// `delta` and `Amatter`.
#[derive(Clone, Copy)]
struct MatterInput {
    s12sq: f64,
    s13sq: f64,
    s23sq: f64,
    delta: f64,
    Dmsq21: f64,
    Dmsq31: f64,
    Lover4E: f64,
    Amatter: f64,
    N_Newton: u8,
}

fn matter_probabilities(input: &MatterInput) -> ProbabilityMatrix {
    let MatterInput {
        s12sq,
        s13sq,
        s23sq,
        delta,
        Dmsq21,
        Dmsq31,
        Lover4E,
        Amatter,
        N_Newton,
    } = *input;

    let c13sq = 1.0 - s13sq;

    // Vacuum |U_ei|², |U_mi|² and the Jarlskog prefactor
    let Ue2sq = c13sq * s12sq;
    let Ue3sq = s13sq;
    let Um3sq = c13sq * s23sq;
    let Ut2sq = s13sq * s12sq * s23sq;
    let Um2sq = (1.0 - s12sq) * (1.0 - s23sq);

    let Jrr = (Um2sq * Ut2sq).sqrt();
    let Um2sq = Um2sq + Ut2sq - 2.0 * Jrr * delta.cos();
    let Jvac = 8.0 * Jrr * c13sq * delta.sin();
    let Dmsqee = Dmsq31 - s12sq * Dmsq21;

    // Characteristic polynomial coefficients of the matter Hamiltonian
    let A_sum = Dmsq21 + Dmsq31;
    let See = A_sum - Dmsq21 * Ue2sq - Dmsq31 * Ue3sq;
    let Tmm_base = Dmsq21 * Dmsq31;
    let Tee = Tmm_base * (1.0 - Ue3sq - Ue2sq);
    let C = Amatter * Tee;
    let A = A_sum + Amatter;
    let B = Tmm_base + Amatter * See;

    // λ₃ from DMP, refined by Newton
    let xmat = Amatter / Dmsqee;
    let tmp = 1.0 - xmat;
    let mut lambda3 =
        Dmsq31 + 0.5 * Dmsqee * (xmat - 1.0 + (tmp * tmp + 4.0 * s13sq * xmat).sqrt());
    // f(λ) = λ³ - Aλ² + Bλ - C
    for _ in 0..N_Newton {
        lambda3 = (lambda3 * lambda3 * (2.0 * lambda3 - A) + C)
            / (lambda3 * (3.0 * lambda3 - 2.0 * A) + B);
    }

    let tmp = A - lambda3;
    let Dlambda21 = (tmp * tmp - 4.0 * C / lambda3).sqrt();
    let lambda2 = 0.5 * (A - lambda3 + Dlambda21);
    let Dlambda32 = lambda3 - lambda2;
    let Dlambda31 = Dlambda32 + Dlambda21;

    // Rosetta
    let PiDlambdaInv = 1.0 / (Dlambda31 * Dlambda32 * Dlambda21);
    let Xp3 = PiDlambdaInv * Dlambda21;
    let Xp2 = -PiDlambdaInv * Dlambda31;

    let Ue3sq = (lambda3 * (lambda3 - See) + Tee) * Xp3;
    let Ue2sq = (lambda2 * (lambda2 - See) + Tee) * Xp2;

    let Smm = A - Dmsq21 * Um2sq - Dmsq31 * Um3sq;
    let Tmm = Tmm_base * (1.0 - Um3sq - Um2sq) + Amatter * (See + Smm - A);

    let Um3sq = (lambda3 * (lambda3 - Smm) + Tmm) * Xp3;
    let Um2sq = (lambda2 * (lambda2 - Smm) + Tmm) * Xp2;

    // NHS
    let Jmatter = Jvac * Dmsq21 * Dmsq31 * (Dmsq31 - Dmsq21) * PiDlambdaInv;

    let Ue1sq = 1.0 - Ue3sq - Ue2sq;
    let Um1sq = 1.0 - Um3sq - Um2sq;
    let Ut3sq = 1.0 - Um3sq - Ue3sq;
    let Ut2sq = 1.0 - Um2sq - Ue2sq;
    let Ut1sq = 1.0 - Um1sq - Ue1sq;

    let D21 = Dlambda21 * Lover4E;
    let D32 = Dlambda32 * Lover4E;

    let sinD21 = D21.sin();
    let sinD31 = (D32 + D21).sin();
    let sinD32 = D32.sin();

    let triple_sin = sinD21 * sinD31 * sinD32;

    let sinsqD21_2 = 2.0 * sinD21 * sinD21;
    let sinsqD31_2 = 2.0 * sinD31 * sinD31;
    let sinsqD32_2 = 2.0 * sinD32 * sinD32;

    let Pme_CPC = (Ut3sq - Um2sq * Ue1sq - Um1sq * Ue2sq) * sinsqD21_2
        + (Ut2sq - Um3sq * Ue1sq - Um1sq * Ue3sq) * sinsqD31_2
        + (Ut1sq - Um3sq * Ue2sq - Um2sq * Ue3sq) * sinsqD32_2;
    let Pme_CPV = -Jmatter * triple_sin;

    let Pmm = 1.0
        - 2.0
            * (Um2sq * Um1sq * sinsqD21_2
                + Um3sq * Um1sq * sinsqD31_2
                + Um3sq * Um2sq * sinsqD32_2);

    let Pee = 1.0
        - 2.0
            * (Ue2sq * Ue1sq * sinsqD21_2
                + Ue3sq * Ue1sq * sinsqD31_2
                + Ue3sq * Ue2sq * sinsqD32_2);

    // Remaining entries follow from unitarity
    let mut probs = [[0.0; 3]; 3];

    probs[0][0] = Pee;
    probs[0][1] = Pme_CPC - Pme_CPV;
    probs[0][2] = 1.0 - Pee - probs[0][1];

    probs[1][0] = Pme_CPC + Pme_CPV;
    probs[1][1] = Pmm;
    probs[1][2] = 1.0 - probs[1][0] - Pmm;

    probs[2][0] = 1.0 - Pee - probs[1][0];
    probs[2][1] = 1.0 - probs[0][1] - Pmm;
    probs[2][2] = 1.0 - probs[0][2] - probs[1][2];

    probs
}
