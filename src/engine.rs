//! Probability queries over a cached oscillation parameter set.
//!
//! Every query runs the same sequence: refresh the derived mixing if any
//! oscillation parameter changed, configure the propagator, propagate through
//! constant-density matter along the current baseline, then read the channel
//! probability. The engine takes `&mut self` for queries because the
//! propagator is overwritten on each one; share it across threads behind a
//! lock that covers the whole mutate-then-query sequence.

use tracing::warn;

use crate::config::{EngineConfig, DEFAULT_AVERAGE_SAMPLES, MATTER_DENSITY};
use crate::error::{OscillationError, OscillationResult};
use crate::flavour::{CpSign, Flavour};
use crate::parameters::OscillationParameters;
use crate::pdg::ReferenceParameters;
use crate::propagator::{DmpPropagator, MixingForm, MnsParameters, ProbabilityMatrix, Propagator};

/// Slack allowed outside [0, 1] before a probability is reported as suspicious.
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Oscillation parameters plus the propagator that evaluates them.
#[derive(Debug, Clone)]
pub struct ProbabilityEngine<P: Propagator = DmpPropagator> {
    parameters: OscillationParameters,
    propagator: P,
    matter_density: f64,
    average_samples: usize,
}

impl Default for ProbabilityEngine<DmpPropagator> {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbabilityEngine<DmpPropagator> {
    /// Default parameters, 295 km baseline, 2.6 g/cm³ matter.
    pub fn new() -> Self {
        Self::with_propagator(DmpPropagator::default())
    }

    /// Build an engine from a validated configuration.
    pub fn with_config(config: &EngineConfig) -> OscillationResult<Self> {
        config.validate()?;
        let propagator = DmpPropagator::new(config.electron_fraction, config.newton_iterations);
        let mut engine = Self::with_propagator(propagator);
        engine.parameters.set_baseline(config.baseline);
        engine.matter_density = config.matter_density;
        engine.average_samples = config.average_samples;
        Ok(engine)
    }
}

impl<P: Propagator> ProbabilityEngine<P> {
    /// Default parameters evaluated by the given propagator.
    pub fn with_propagator(propagator: P) -> Self {
        Self {
            parameters: OscillationParameters::new(),
            propagator,
            matter_density: MATTER_DENSITY,
            average_samples: DEFAULT_AVERAGE_SAMPLES,
        }
    }

    /// P(initial → final) at `energy` GeV.
    ///
    /// ```rust
    /// use nuprob::{CpSign, Flavour, ProbabilityEngine};
    ///
    /// let mut engine = ProbabilityEngine::new();
    /// let p = engine
    ///     .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::Matter)
    ///     .unwrap();
    /// assert!(p > 0.0 && p < 1.0);
    /// ```
    pub fn probability(
        &mut self,
        initial: Flavour,
        final_: Flavour,
        energy: f64,
        cp: CpSign,
    ) -> OscillationResult<f64> {
        self.parameters.refresh();
        self.propagate(energy, cp)?;
        self.channel_probability(initial, final_, cp)
    }

    /// Mean of `sample_count` probabilities at
    /// `energy_low + (i / sample_count) * (energy_high - energy_low)`.
    ///
    /// `energy_high` itself is never sampled. The first failing sample aborts
    /// the whole average.
    pub fn average_probability(
        &mut self,
        initial: Flavour,
        final_: Flavour,
        energy_low: f64,
        energy_high: f64,
        cp: CpSign,
        sample_count: usize,
    ) -> OscillationResult<f64> {
        if sample_count == 0 {
            return Err(OscillationError::InvalidArgument(
                "sample_count must be > 0".to_string(),
            ));
        }

        let n = sample_count as f64;
        let width = energy_high - energy_low;
        let mut sum = 0.0;
        for i in 0..sample_count {
            let energy = energy_low + (i as f64 / n) * width;
            sum += self.probability(initial, final_, energy, cp)?;
        }
        Ok(sum / n)
    }

    /// [Self::average_probability] with the configured sample count.
    pub fn band_probability(
        &mut self,
        initial: Flavour,
        final_: Flavour,
        energy_low: f64,
        energy_high: f64,
        cp: CpSign,
    ) -> OscillationResult<f64> {
        let samples = self.average_samples;
        self.average_probability(initial, final_, energy_low, energy_high, cp, samples)
    }

    /// Band-averaged probability for each bin of an ascending edge list.
    pub fn binned_probabilities(
        &mut self,
        initial: Flavour,
        final_: Flavour,
        edges: &[f64],
        cp: CpSign,
        sample_count: usize,
    ) -> OscillationResult<Vec<f64>> {
        if edges.len() < 2 {
            return Err(OscillationError::InvalidArgument(format!(
                "need at least 2 bin edges, got {}",
                edges.len()
            )));
        }
        if let Some(pair) = edges.windows(2).find(|pair| !(pair[1] > pair[0])) {
            return Err(OscillationError::InvalidArgument(format!(
                "bin edges must be strictly ascending, got {} then {}",
                pair[0], pair[1]
            )));
        }

        edges
            .windows(2)
            .map(|bin| {
                self.average_probability(initial, final_, bin[0], bin[1], cp, sample_count)
            })
            .collect()
    }

    /// All nine channels at one energy, `probs[initial][final]`.
    pub fn probability_matrix(
        &mut self,
        energy: f64,
        cp: CpSign,
    ) -> OscillationResult<ProbabilityMatrix> {
        self.parameters.refresh();
        self.propagate(energy, cp)?;

        let mut probs = [[0.0; 3]; 3];
        for initial in Flavour::ALL {
            for final_ in Flavour::ALL {
                probs[initial.position()][final_.position()] =
                    self.channel_probability(initial, final_, cp)?;
            }
        }
        Ok(probs)
    }

    /// Probability between two PDG codes; the CP sign follows the initial code.
    pub fn probability_pdg(
        &mut self,
        initial_pdg: i32,
        final_pdg: i32,
        energy: f64,
    ) -> OscillationResult<f64> {
        let initial = Flavour::from_pdg(initial_pdg)?;
        let final_ = Flavour::from_pdg(final_pdg)?;
        self.probability(initial, final_, energy, CpSign::from_pdg(initial_pdg))
    }

    /// Load the central values of a reference parameter table.
    pub fn apply_reference(&mut self, reference: &ReferenceParameters) {
        let [theta12, theta23, theta13, deltacp, sdm, ldm] = reference.central_values();
        self.set_all(theta12, theta23, theta13, deltacp, sdm, ldm);
    }

    pub fn set_all(
        &mut self,
        theta12: f64,
        theta23: f64,
        theta13: f64,
        deltacp: f64,
        sdm: f64,
        ldm: f64,
    ) {
        self.parameters
            .set_all(theta12, theta23, theta13, deltacp, sdm, ldm);
    }

    pub fn set_theta12(&mut self, value: f64) {
        self.parameters.set_theta12(value);
    }

    pub fn set_theta13(&mut self, value: f64) {
        self.parameters.set_theta13(value);
    }

    pub fn set_theta23(&mut self, value: f64) {
        self.parameters.set_theta23(value);
    }

    pub fn set_delta_cp(&mut self, value: f64) {
        self.parameters.set_delta_cp(value);
    }

    pub fn set_small_delta_mass_squared(&mut self, value: f64) {
        self.parameters.set_small_delta_mass_squared(value);
    }

    pub fn set_large_delta_mass_squared(&mut self, value: f64) {
        self.parameters.set_large_delta_mass_squared(value);
    }

    pub fn set_baseline(&mut self, value: f64) {
        self.parameters.set_baseline(value);
    }

    pub fn parameters(&self) -> &OscillationParameters {
        &self.parameters
    }

    pub fn propagator(&self) -> &P {
        &self.propagator
    }

    pub fn matter_density(&self) -> f64 {
        self.matter_density
    }

    pub fn average_samples(&self) -> usize {
        self.average_samples
    }

    /// Configure and run the propagator. Refuses to run on stale parameters.
    fn propagate(&mut self, energy: f64, cp: CpSign) -> OscillationResult<()> {
        let mixing = *self.parameters.mixing()?;
        self.propagator.set_mns(&MnsParameters {
            x12: mixing.s12sq,
            x13: mixing.s13sq,
            x23: mixing.s23sq,
            dmsq21: mixing.dmsq21,
            dmsq32: mixing.dmsq32,
            delta: mixing.delta,
            energy,
            form: MixingForm::SinSquaredTheta,
            cp,
        });
        self.propagator
            .propagate_linear(cp, self.parameters.baseline(), self.matter_density)?;
        Ok(())
    }

    fn channel_probability(
        &self,
        initial: Flavour,
        final_: Flavour,
        cp: CpSign,
    ) -> OscillationResult<f64> {
        let p = self
            .propagator
            .probability(initial.channel(cp), final_.channel(cp))?;
        if !(-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&p) {
            warn!(%initial, %final_, %cp, probability = p, "probability outside [0, 1]");
        }
        Ok(p)
    }
}
