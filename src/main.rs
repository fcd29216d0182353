use std::{any::Any, path::PathBuf};

use anyhow::{bail, Context, Result};
use ark_bn254::Bn254;
use clap::{Args, Parser, Subcommand, ValueEnum};
use common::{config::Config, proof::ProofMaterial, r1cs::InternedR1cs, serializable::JsonFile};
use tracing_chrome::ChromeLayerBuilder;
use tracing_subscriber::{self, fmt::format::FmtSpan, prelude::*, EnvFilter};
use whir_core::groth16::orchestrator::{setup_keys, verify_circuit, KeyPair, VerifyOptions};

/// Verify WHIR/R1CS proofs inside a Groth16 circuit.
#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a WHIR proof natively and through the Groth16 verifier circuit
    Verify(VerifyArgs),
    /// Generate Groth16 keys for the circuit shape of a config (insecure)
    Setup(SetupArgs),
}

#[derive(Args, Debug)]
struct InstanceArgs {
    /// Protocol config with transcript and statement (JSON)
    #[clap(long)]
    config: PathBuf,

    /// Interned R1CS the WHIR proof is about (JSON)
    #[clap(long)]
    r1cs: PathBuf,

    /// Output formats
    #[clap(short, long, value_enum)]
    format: Option<Vec<Format>>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    #[clap(flatten)]
    instance: InstanceArgs,

    /// Merkle multi-paths and leaf openings (JSON)
    #[clap(long)]
    proof: PathBuf,

    /// Write the compiled constraint matrices here
    #[clap(long)]
    ccs: Option<PathBuf>,

    /// Proving key from a previous setup
    #[clap(long, requires = "vk")]
    pk: Option<PathBuf>,

    /// Verifying key from a previous setup
    #[clap(long, requires = "pk")]
    vk: Option<PathBuf>,

    /// Only run the native verifier
    #[clap(long)]
    native_only: bool,
}

#[derive(Args, Debug)]
struct SetupArgs {
    #[clap(flatten)]
    instance: InstanceArgs,

    #[clap(long)]
    pk: PathBuf,

    #[clap(long)]
    vk: PathBuf,
}

#[derive(Debug, Clone, ValueEnum, PartialEq)]
enum Format {
    Default,
    Chrome,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Verify(args) => {
            let _guards = init_tracing(&args.instance.format);
            verify(args)
        }
        Commands::Setup(args) => {
            let _guards = init_tracing(&args.instance.format);
            setup(args)
        }
    }
}

fn init_tracing(format: &Option<Vec<Format>>) -> Vec<Box<dyn Any>> {
    let mut layers = Vec::new();

    let log_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(log_filter)
        .boxed();
    layers.push(log_layer);

    let mut guards: Vec<Box<dyn Any>> = vec![];
    if let Some(format) = format {
        if format.contains(&Format::Default) {
            let collector_layer = tracing_subscriber::fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .compact()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .boxed();
            layers.push(collector_layer);
        }
        if format.contains(&Format::Chrome) {
            let (chrome_layer, guard) = ChromeLayerBuilder::new().include_args(true).build();
            layers.push(chrome_layer.boxed());
            guards.push(Box::new(guard));
            tracing::info!("Running tracing-chrome. Files will be saved as trace-<some timestamp>.json and can be viewed in https://ui.perfetto.dev/");
        }
    }

    tracing_subscriber::registry().with(layers).init();
    guards
}

fn load(instance: &InstanceArgs) -> Result<(Config, InternedR1cs)> {
    let config = Config::read_json(&instance.config)
        .with_context(|| format!("reading config {}", instance.config.display()))?;
    let r1cs = InternedR1cs::read_json(&instance.r1cs)
        .with_context(|| format!("reading R1CS {}", instance.r1cs.display()))?;
    Ok((config, r1cs))
}

fn verify(args: VerifyArgs) -> Result<()> {
    let (config, r1cs) = load(&args.instance)?;
    let material = ProofMaterial::read_json(&args.proof)
        .with_context(|| format!("reading proof {}", args.proof.display()))?;

    let keys = match (&args.pk, &args.vk) {
        (Some(pk), Some(vk)) => Some(KeyPair::<Bn254>::read(pk, vk).context("reading Groth16 keys")?),
        _ => None,
    };
    let options = VerifyOptions {
        keys: keys.as_ref(),
        ccs_path: args.ccs.as_deref(),
        native_only: args.native_only,
    };
    let report = verify_circuit(&config, &material, &r1cs, options, &mut ark_std::rand::thread_rng())?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.accepted() {
        bail!("proof rejected");
    }
    Ok(())
}

fn setup(args: SetupArgs) -> Result<()> {
    let (config, r1cs) = load(&args.instance)?;
    let keys = setup_keys::<Bn254, _>(&config, &r1cs, &mut ark_std::rand::thread_rng())?;
    keys.write(&args.pk, &args.vk)
        .with_context(|| format!("writing keys to {} and {}", args.pk.display(), args.vk.display()))?;
    tracing::info!(pk = %args.pk.display(), vk = %args.vk.display(), "wrote Groth16 keys");
    Ok(())
}
