//! nuprob CLI - quick probability tables
//!
//! Run with: `cargo run --release -- --energy 0.6`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nuprob::{
    CpSign, EngineConfig, Flavour, OscillationError, OscillationResult, ProbabilityEngine,
    ProbabilityMatrix, ReferenceParameters,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "nuprob")]
#[command(about = "Three-flavour neutrino oscillation probabilities")]
struct Cli {
    /// Neutrino energy in GeV for the probability matrix
    #[arg(long, default_value_t = 0.6)]
    energy: f64,

    /// Baseline in km (overrides the config file)
    #[arg(long)]
    baseline: Option<f64>,

    /// Use antineutrinos
    #[arg(long)]
    anti: bool,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load the PDG reference parameters instead of the engine defaults
    #[arg(long)]
    pdg: bool,

    /// Print a spectrum for this channel instead of the matrix, as PDG codes
    /// (e.g. `14,12`)
    #[arg(long, value_delimiter = ',', num_args = 2, allow_negative_numbers = true)]
    channel: Option<Vec<i32>>,

    /// Spectrum range in GeV
    #[arg(long, value_delimiter = ',', num_args = 2, default_values_t = [0.2, 2.0])]
    range: Vec<f64>,

    /// Number of spectrum bins
    #[arg(long, default_value_t = 18)]
    bins: usize,
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> OscillationResult<()> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| {
                OscillationError::Config(format!("cannot read {}: {e}", path.display()))
            })?;
            EngineConfig::from_json(&json)?
        }
        None => EngineConfig::default(),
    };
    if let Some(baseline) = cli.baseline {
        config.baseline = baseline;
    }

    let mut engine = ProbabilityEngine::with_config(&config)?;
    if cli.pdg {
        engine.apply_reference(&ReferenceParameters::default());
    }
    let cp = if cli.anti {
        CpSign::AntiMatter
    } else {
        CpSign::Matter
    };
    info!(?config, %cp, "engine ready");

    println!("Baseline: {} km", engine.parameters().baseline());
    println!("Density: {} g/cm³", engine.matter_density());

    match &cli.channel {
        Some(codes) => {
            let initial = Flavour::from_pdg(codes[0])?;
            let final_ = Flavour::from_pdg(codes[1])?;
            print_spectrum(&mut engine, cli, initial, final_, cp)
        }
        None => {
            println!("Energy: {} GeV ({})", cli.energy, cp);
            println!();
            let probs = engine.probability_matrix(cli.energy, cp)?;
            print_matrix(&probs);
            Ok(())
        }
    }
}

fn print_spectrum(
    engine: &mut ProbabilityEngine,
    cli: &Cli,
    initial: Flavour,
    final_: Flavour,
    cp: CpSign,
) -> OscillationResult<()> {
    if cli.bins == 0 {
        return Err(OscillationError::InvalidArgument(
            "bins must be > 0".to_string(),
        ));
    }
    let (low, high) = (cli.range[0], cli.range[1]);
    let width = (high - low) / cli.bins as f64;
    let edges: Vec<f64> = (0..=cli.bins).map(|i| low + width * i as f64).collect();
    let samples = engine.average_samples();
    let probs = engine.binned_probabilities(initial, final_, &edges, cp, samples)?;

    println!("P({} → {}), {} samples per bin:", initial, final_, samples);
    for (bin, p) in edges.windows(2).zip(probs) {
        println!("  {:>7.3} - {:>7.3} GeV  {:>9.6}", bin[0], bin[1], p);
    }
    Ok(())
}

fn print_matrix(probs: &ProbabilityMatrix) {
    println!("         e          μ          τ");
    let labels = ['e', 'μ', 'τ'];
    for (i, row) in probs.iter().enumerate() {
        println!(
            "  {} → {:>9.6}  {:>9.6}  {:>9.6}",
            labels[i], row[0], row[1], row[2]
        );
    }
}
