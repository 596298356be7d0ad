//! qsim - state-vector quantum simulator
//! Command-line interface for the demonstration circuit, sampling and speed tests

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use colored::*;
use qsim_core::circuits::{self, DEMO_QUBITS};
use qsim_core::{Backend, QuantumRegister, Sampler, SamplingMode, SimConfig, io, random_state};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qsim")]
#[command(author = "QSim Contributors")]
#[command(version = "2026.10.16")]
#[command(about = "qsim - state-vector quantum simulator", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demonstration circuit and print the state
    Run {
        /// scalar, vectorized or device
        #[arg(short, long)]
        backend: Option<Backend>,

        /// Register width (at least 4)
        #[arg(short, long, default_value_t = DEMO_QUBITS)]
        qubits: usize,

        /// Save the final state vector to this file
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Run the demonstration circuit and sample measurement outcomes
    Sample {
        #[arg(short, long)]
        backend: Option<Backend>,

        /// Number of measurement shots
        #[arg(short, long, default_value_t = 1000)]
        shots: u64,

        /// Seed for the sampler RNG
        #[arg(long)]
        seed: Option<u64>,

        /// Draw full basis states instead of per-qubit marginals
        #[arg(short, long)]
        joint: bool,
    },

    /// Time the 1-, 2- and k-qubit gate paths on a random state
    Speed {
        #[arg(short, long)]
        backend: Option<Backend>,

        #[arg(short, long, default_value_t = 20)]
        qubits: usize,
    },

    /// Decode a state file and print its contents
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show build features and configuration
    Info,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qsim=info,qsim_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { backend, qubits, output } => run_command(&config, backend, qubits, output.as_deref()),
        Commands::Sample { backend, shots, seed, joint } => sample_command(&config, backend, shots, seed, joint),
        Commands::Speed { backend, qubits } => speed_command(&config, backend, qubits),
        Commands::Inspect { file } => inspect_command(&file),
        Commands::Info => {
            print_info(&config);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SimConfig> {
    match path {
        Some(path) => {
            SimConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))
        }
        None => Ok(SimConfig::from_env()),
    }
}

fn make_register(
    config: &SimConfig,
    backend: Option<Backend>,
    qubits: usize,
) -> anyhow::Result<Box<dyn QuantumRegister>> {
    let backend = backend.unwrap_or(config.default_backend);
    tracing::debug!(%backend, qubits, "creating register");

    match backend {
        Backend::Device => device_register(config, qubits),
        host => Ok(qsim_core::create_register(host, qubits)?),
    }
}

#[cfg(feature = "gpu")]
fn device_register(config: &SimConfig, qubits: usize) -> anyhow::Result<Box<dyn QuantumRegister>> {
    use qsim_core::{DeviceRegister, GpuContext};
    use std::sync::Arc;

    let context = Arc::new(GpuContext::new_sync().context("no usable GPU adapter")?);
    let register = match config.kernel_source()? {
        Some(source) => DeviceRegister::with_kernel_source(qubits, context, &source),
        None => DeviceRegister::new(qubits, context),
    }
    .context("failed to set up the device register")?;

    Ok(Box::new(register))
}

#[cfg(not(feature = "gpu"))]
fn device_register(_config: &SimConfig, _qubits: usize) -> anyhow::Result<Box<dyn QuantumRegister>> {
    bail!("this build has no device backend (rebuild with --features gpu)")
}

fn run_command(
    config: &SimConfig,
    backend: Option<Backend>,
    qubits: usize,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut register = make_register(config, backend, qubits)?;

    println!(
        "{} demonstration circuit on {} qubits ({})",
        "     Running".green().bold(),
        qubits,
        register.backend().to_string().cyan()
    );
    circuits::demo_circuit(register.as_mut())?;

    if let Err(e) = register.is_normalized(config.norm_tolerance) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }

    println!();
    print!("{}", register.dump()?);

    if let Some(path) = output {
        register
            .to_file(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!();
        println!("{} {}", "       Saved".green().bold(), path.display().to_string().cyan());
    }

    Ok(())
}

fn sample_command(
    config: &SimConfig,
    backend: Option<Backend>,
    shots: u64,
    seed: Option<u64>,
    joint: bool,
) -> anyhow::Result<()> {
    let mut register = make_register(config, backend, DEMO_QUBITS)?;
    circuits::demo_circuit(register.as_mut())?;

    let mode = if joint { SamplingMode::Joint } else { SamplingMode::Marginal };
    let mut sampler = match seed.or(config.sampler_seed) {
        Some(seed) => Sampler::with_seed(register, seed),
        None => Sampler::new(register),
    }
    .with_mode(mode);

    sampler.run(shots)?;

    println!(
        "{} {} shots ({:?} mode)",
        "     Sampled".green().bold(),
        sampler.total_shots(),
        sampler.mode()
    );
    println!();
    print!("{sampler}");
    Ok(())
}

fn speed_command(config: &SimConfig, backend: Option<Backend>, qubits: usize) -> anyhow::Result<()> {
    if qubits < 3 {
        bail!("the speed test needs at least 3 qubits, got {qubits}");
    }

    let mut register = make_register(config, backend, qubits)?;
    let mut rng = match config.sampler_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    register.set_state_vector(&random_state(qubits, &mut rng)?)?;

    println!(
        "{} {} qubits ({})",
        "   Measuring".green().bold(),
        qubits,
        register.backend().to_string().cyan()
    );
    let report = circuits::speed_test(register.as_mut())?;

    println!();
    print_timing("1-qubit (H on every qubit)", report.one_qubit);
    print_timing("2-qubit (CX from qubit 0)", report.two_qubit);
    let k_label = if report.k_qubit_decomposed {
        "3-qubit (Toffoli from 0, 1, decomposed)"
    } else {
        "3-qubit (Toffoli from 0, 1)"
    };
    print_timing(k_label, report.k_qubit);

    if let Err(e) = register.is_normalized(config.norm_tolerance) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }
    Ok(())
}

fn print_timing(label: &str, elapsed: Duration) {
    println!("  {:<30} {:>12.3} ms", label, elapsed.as_secs_f64() * 1e3);
}

fn inspect_command(file: &Path) -> anyhow::Result<()> {
    let state = io::load(file).with_context(|| format!("failed to read {}", file.display()))?;

    println!("{}", file.display().to_string().bold());
    println!("  qubits:     {}", state.qubits);
    println!("  precision:  {} bytes", state.precision);
    println!("  amplitudes: {}", state.amplitudes.len());
    println!();
    print!("{}", io::dump(&state.amplitudes, state.qubits));
    Ok(())
}

fn print_info(config: &SimConfig) {
    println!("{}", "qsim - state-vector quantum simulator".bold());
    println!();
    println!("{}", "Backends:".bold());
    println!("  • {} scalar      portable reference", "✓".green());
    println!("  • {} vectorized  {}", "✓".green(), qsim_core::simd::lane_support());
    print_device_status();
    println!();
    println!("{}", "Configuration:".bold());
    println!("  norm_tolerance   {:e}", config.norm_tolerance);
    println!("  default_backend  {}", config.default_backend);
    println!("  workgroup_size   {}", config.workgroup_size);
    match &config.sampler_seed {
        Some(seed) => println!("  sampler_seed     {seed}"),
        None => println!("  sampler_seed     (entropy)"),
    }
    match &config.kernel_path {
        Some(path) => println!("  kernel_path      {}", path.display()),
        None => println!("  kernel_path      (embedded)"),
    }
    println!();
    println!("{}", "Commands:".bold());
    println!("  qsim run                          # Demonstration circuit, 4 qubits");
    println!("  qsim run -q 8 -o state.bin        # Wider register, save the state");
    println!("  qsim sample --shots 4096 --joint  # Sample full basis states");
    println!("  qsim speed -b vectorized -q 24    # Gate timings");
    println!("  qsim inspect state.bin            # Decode a state file");
}

#[cfg(feature = "gpu")]
fn print_device_status() {
    if qsim_core::GpuContext::is_available() {
        println!("  • {} device      wgpu, 1- and 2-qubit gates", "✓".green());
    } else {
        println!("  • {} device      no adapter found", "✗".red());
    }
}

#[cfg(not(feature = "gpu"))]
fn print_device_status() {
    println!("  • {} device      not built (feature gpu)", "✗".yellow());
}
