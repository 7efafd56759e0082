//! End-to-end checks of the probability engine with the DMP propagator.

use std::f64::consts::PI;
use std::sync::{Arc, Mutex};
use std::thread;

use nuprob::{
    CpSign, EngineConfig, Flavour, OscillationError, ParameterState, ProbabilityEngine,
    ReferenceParameters,
};

#[test]
fn test_fresh_engine_answers_first_query() {
    let mut engine = ProbabilityEngine::new();
    assert_eq!(engine.parameters().state(), ParameterState::Dirty);

    let p = engine
        .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::Matter)
        .unwrap();
    assert!(p > 0.0 && p < 1.0);
    assert_eq!(engine.parameters().state(), ParameterState::Clean);
    assert_eq!(engine.parameters().generation(), 1);
}

#[test]
fn test_high_energy_survival_approaches_one() {
    let mut engine = ProbabilityEngine::new();
    for cp in [CpSign::Matter, CpSign::AntiMatter] {
        let p = engine
            .probability(Flavour::Muon, Flavour::Muon, 100.0, cp)
            .unwrap();
        assert!((p - 1.0).abs() < 1e-3, "P(μ→μ, 100 GeV, {}) = {}", cp, p);
    }
}

#[test]
fn test_t2k_disappearance_near_maximum() {
    let mut engine = ProbabilityEngine::new();
    let p = engine
        .probability(Flavour::Muon, Flavour::Muon, 0.6, CpSign::Matter)
        .unwrap();
    assert!(p < 0.05, "P(μ→μ) at the T2K peak = {}", p);
}

#[test]
fn test_setters_change_the_answer() {
    let mut engine = ProbabilityEngine::new();
    let before = engine
        .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::Matter)
        .unwrap();

    engine.set_theta13(0.0);
    let after = engine
        .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::Matter)
        .unwrap();
    assert!(after < before);
    assert!(after < 0.01, "no θ13 leaves only the solar term: {}", after);

    engine.set_delta_cp(-PI / 2.0);
    engine.set_theta13(0.16);
    let flipped = engine
        .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::Matter)
        .unwrap();
    assert!((flipped - before).abs() > 1e-3);
    assert_eq!(engine.parameters().generation(), 3);
}

#[test]
fn test_baseline_changes_result_without_recompute() {
    let mut engine = ProbabilityEngine::new();
    let near = engine
        .probability(Flavour::Muon, Flavour::Muon, 0.6, CpSign::Matter)
        .unwrap();
    engine.set_baseline(1.0);
    let nearer = engine
        .probability(Flavour::Muon, Flavour::Muon, 0.6, CpSign::Matter)
        .unwrap();

    assert_eq!(engine.parameters().generation(), 1);
    assert!(nearer > 0.999);
    assert!(nearer > near);
}

#[test]
fn test_average_matches_manual_mean() {
    let mut engine = ProbabilityEngine::new();
    let average = engine
        .average_probability(Flavour::Muon, Flavour::Electron, 0.5, 1.5, CpSign::Matter, 10)
        .unwrap();

    let mut sum = 0.0;
    for i in 0..10 {
        let energy = 0.5 + (i as f64 / 10.0) * 1.0;
        sum += engine
            .probability(Flavour::Muon, Flavour::Electron, energy, CpSign::Matter)
            .unwrap();
    }
    assert_eq!(average, sum / 10.0);

    let single = engine
        .average_probability(Flavour::Muon, Flavour::Electron, 0.5, 1.5, CpSign::Matter, 1)
        .unwrap();
    let point = engine
        .probability(Flavour::Muon, Flavour::Electron, 0.5, CpSign::Matter)
        .unwrap();
    assert_eq!(single, point);
}

#[test]
fn test_binned_spectrum_is_unitary() {
    let mut engine = ProbabilityEngine::new();
    let edges = [0.2, 0.4, 0.6, 0.8, 1.0, 1.5, 3.0];
    let mut total = vec![0.0; edges.len() - 1];
    for final_ in Flavour::ALL {
        let bins = engine
            .binned_probabilities(Flavour::Muon, final_, &edges, CpSign::AntiMatter, 5)
            .unwrap();
        for (sum, p) in total.iter_mut().zip(bins) {
            *sum += p;
        }
    }
    for sum in total {
        assert!((sum - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_pdg_queries() {
    let mut engine = ProbabilityEngine::new();
    let by_pdg = engine.probability_pdg(-14, -12, 0.6).unwrap();
    let by_flavour = engine
        .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::AntiMatter)
        .unwrap();
    assert_eq!(by_pdg, by_flavour);

    assert_eq!(
        engine.probability_pdg(14, 2212, 0.6),
        Err(OscillationError::UnknownParticle { pdg: 2212 })
    );
}

#[test]
fn test_reference_parameters_applied() {
    let mut engine = ProbabilityEngine::new();
    let reference = ReferenceParameters::default();
    engine.apply_reference(&reference);

    assert!(engine.parameters().is_dirty());
    assert_eq!(engine.parameters().values(), reference.central_values());
    assert_eq!(engine.parameters().delta_cp(), 0.0);

    // δCP = 0 in vacuum: no CP asymmetry
    let mut vacuum = ProbabilityEngine::with_config(&EngineConfig {
        matter_density: 0.0,
        ..Default::default()
    })
    .unwrap();
    vacuum.apply_reference(&reference);
    let nu = vacuum
        .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::Matter)
        .unwrap();
    let nubar = vacuum
        .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::AntiMatter)
        .unwrap();
    assert!((nu - nubar).abs() < 1e-9);
}

#[test]
fn test_config_from_json() {
    let config = EngineConfig::from_json(
        r#"{"baseline": 1300.0, "matter_density": 2.848, "newton_iterations": 2}"#,
    )
    .unwrap();
    let mut engine = ProbabilityEngine::with_config(&config).unwrap();
    let p = engine
        .probability(Flavour::Muon, Flavour::Electron, 2.5, CpSign::Matter)
        .unwrap();
    assert!(p > 0.03 && p < 0.15, "DUNE appearance = {}", p);
}

#[test]
fn test_shared_engine_behind_mutex() {
    let engine = Arc::new(Mutex::new(ProbabilityEngine::new()));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let delta = i as f64 * PI / 2.0;
                let mut engine = engine.lock().unwrap();
                engine.set_delta_cp(delta);
                let p = engine
                    .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::Matter)
                    .unwrap();
                (delta, p)
            })
        })
        .collect();

    let results: Vec<(f64, f64)> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let mut check = ProbabilityEngine::new();
    for (delta, p) in results {
        check.set_delta_cp(delta);
        let expected = check
            .probability(Flavour::Muon, Flavour::Electron, 0.6, CpSign::Matter)
            .unwrap();
        assert_eq!(p, expected);
    }
}
