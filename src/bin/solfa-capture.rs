use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use solfa_capture::capture::CaptureSession;
use solfa_capture::config::PipelineConfig;
use solfa_capture::estimator::McLeodEstimator;
use solfa_capture::reference::load_reference;
use solfa_capture::transmit::{BroadcastTransmitter, Transmitter};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("solfa-capture error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "solfa-capture", about = "Offline solfège capture + relay harness CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<()> {
        match self.command {
            Command::Run(args) => run_command(args),
            Command::Reference(args) => reference_command(args),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a capture session over a WAV file and print the session report.
    Run(RunArgs),
    /// Inspect a converted reference symbol list.
    Reference(ReferenceArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Path to the WAV file to stream through the pipeline.
    #[arg(long)]
    input: PathBuf,
    /// Path to the converted reference symbol list (JSON array).
    #[arg(long)]
    reference: PathBuf,
    /// Optional pipeline config file (JSON); defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print every outbound record after the session completes.
    #[arg(long, default_value_t = false)]
    show_records: bool,
}

#[derive(Args, Debug, Clone)]
struct ReferenceArgs {
    /// Path to the reference symbol list (JSON array).
    path: PathBuf,
}

fn run_command(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path),
        None => PipelineConfig::default(),
    };

    let reference = load_reference(&args.reference)?;
    let samples = read_wav_mono(&args.input, config.audio.sample_rate)?;

    let transmitter = Arc::new(BroadcastTransmitter::new(1024));
    // Keep a receiver alive so sends succeed; the real connector would
    // subscribe here instead.
    let mut records_rx = transmitter.subscribe();

    let estimator = Box::new(McLeodEstimator::new(&config.estimator));
    let mut session = CaptureSession::new(
        &config,
        estimator,
        transmitter.clone() as Arc<dyn Transmitter>,
        reference.len(),
    )?;

    let frame_len = config.audio.frame_len();
    for frame in samples.chunks(frame_len) {
        session.process_frame(frame)?;
    }
    let report = session.finish()?;

    println!("captured symbols : {}", report.performance.len());
    println!("measures sealed  : {}", report.measures_sealed);
    println!("reconciliation   : {:?}", report.outcome);
    println!("transmit failures: {}", report.transmit_failures);

    if args.show_records {
        while let Ok(record) = records_rx.try_recv() {
            println!("[{}] {}", record.channel, record.payload);
        }
    }

    Ok(())
}

fn reference_command(args: ReferenceArgs) -> Result<()> {
    let reference = load_reference(&args.path)?;
    println!("reference length: {}", reference.len());
    if let Some(first) = reference.first() {
        println!("first symbol    : {}", first);
    }
    if let Some(last) = reference.last() {
        println!("last symbol     : {}", last);
    }
    Ok(())
}

/// Decode a WAV file to mono f32 samples at the expected sample rate.
///
/// Multi-channel files use channel 0 only; integer formats are normalized
/// to [-1, 1]. A sample-rate mismatch is an error rather than a resample.
fn read_wav_mono(path: &PathBuf, expected_rate: u32) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open WAV file {:?}", path))?;
    let spec = reader.spec();

    anyhow::ensure!(
        spec.sample_rate == expected_rate,
        "WAV sample rate {} does not match configured rate {}",
        spec.sample_rate,
        expected_rate
    );

    let channels = spec.channels as usize;
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to decode float samples")?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()
                .context("failed to decode integer samples")?
        }
    };

    Ok(samples
        .chunks(channels)
        .map(|chunk| chunk[0])
        .collect())
}
