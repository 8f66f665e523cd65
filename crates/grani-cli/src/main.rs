//! Grani Command-Line Interface
//!
//! ```text
//!            G R A N I
//!   OpenQASM → device-native QASM
//! ```
//!
//! Reads an OpenQASM 2 circuit, lowers it onto a backend described by a
//! JSON coupling map, and writes device-native QASM back out.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use grani_compile::{Target, Transpiler};
use grani_ir::Chip;

/// Grani - quantum circuit transpiler for fixed-coupling hardware
#[derive(Parser)]
#[command(name = "grani")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input QASM circuit file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Backend configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target device family (ibmq, ionq, quantinuum, rigetti, quafu)
    #[arg(short, long, default_value = "ibmq")]
    machine: String,

    /// Verbosity level (0, 1 or 2)
    #[arg(short, long, default_value_t = 0)]
    verbose: u8,

    /// Output file path (default: transpiled_<machine>_<input>.qasm)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Drop couplings outside the circuit's own qubit range
    #[arg(long)]
    limited: bool,

    /// Print the bundled device backends and exit
    #[arg(long)]
    backend_list: bool,

    /// Pack the least-used qubits at low indices before routing
    #[arg(long)]
    remap: bool,

    /// Fix the routing seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

/// Backends shipped under `data/devices/`.
const KNOWN_BACKENDS: &[(&str, usize)] = &[
    ("ibmq_jakarta", 7),
    ("ibmq_guadalupe", 16),
    ("dummy_linear12", 12),
];

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{} {e}", style("Error:").red().bold());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.backend_list {
        println!("Available backends:");
        for (name, qubits) in KNOWN_BACKENDS {
            println!("  {name} ({qubits} qubits)");
        }
        println!("New devices can be added as JSON files under data/devices");
        return Ok(());
    }

    let Some(input) = &cli.input else {
        bail!("no input circuit given (-i <file>)");
    };
    let Some(config) = &cli.config else {
        bail!("no backend config given (-c <file>)");
    };
    let Some(target) = Target::from_name(&cli.machine) else {
        bail!(
            "invalid machine '{}' (expected ibmq, ionq, quantinuum, rigetti or quafu)",
            cli.machine
        );
    };

    println!(
        "{} Transpiling {} for {}",
        style("→").cyan().bold(),
        style(input.display()).green(),
        style(target.name()).yellow()
    );

    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read circuit file {}", input.display()))?;
    let mut circuit = grani_qasm::parse(&source)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    println!(
        "  Loaded: {} qubits, {} gates",
        circuit.num_qubits(),
        circuit.num_gates()
    );

    let device = fs::read_to_string(config)
        .with_context(|| format!("failed to read backend config {}", config.display()))?;
    let limit = cli.limited.then(|| circuit.num_qubits());
    let chip = Chip::from_device_json(&device, limit)
        .with_context(|| format!("failed to load backend config {}", config.display()))?;
    println!("  Backend: {} physical qubits", chip.num_qubits());

    let mut transpiler = Transpiler::new(target).with_remap(cli.remap);
    if let Some(seed) = cli.seed {
        transpiler = transpiler.with_seed(seed);
    }
    transpiler.transpile(&mut circuit, &chip)?;

    println!("{} Transpilation complete", style("✓").green().bold());
    let counts = circuit.gate_counts();
    let breakdown: Vec<String> = counts
        .iter()
        .map(|(name, count)| format!("{name}:{count}"))
        .collect();
    println!(
        "  Result: {} gates ({})",
        circuit.num_gates(),
        breakdown.join(", ")
    );

    let output_path = match &cli.output {
        Some(path) => path.clone(),
        None => default_output_path(input, target.name()),
    };
    fs::write(&output_path, grani_qasm::emit(&circuit))
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    println!("  Output: {}", style(output_path.display()).green());

    Ok(())
}

/// `transpiled_<machine>_<input-stem>.qasm` next to the working directory.
fn default_output_path(input: &Path, machine: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "circuit".into());
    PathBuf::from(format!("transpiled_{machine}_{stem}.qasm"))
}
