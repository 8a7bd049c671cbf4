//! SD Log Reader CLI Application
//!
//! Command-line interface for the SD-card capture decoder. It uses the
//! sdlog-decoder library and adds:
//! - Argument and TOML job-file handling
//! - Module table loading
//! - CSV output (file or stdout)
//! - Console progress logging and a run summary

use anyhow::{Context, Result};
use clap::Parser;
use sdlog_decoder::{Decoder, DecoderConfig, RawCapture};
use std::path::{Path, PathBuf};

mod config;
mod sink;

use sink::{CsvSink, RecordSink};

/// Frames between progress log lines
const PROGRESS_EVERY: usize = 10_000;

/// SD Log Reader - Decode raw data-logger captures into telemetry CSV
#[derive(Parser, Debug)]
#[command(name = "sdlog-cli")]
#[command(about = "Decode raw SD-card CAN captures into telemetry channels", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the raw capture file to decode
    #[arg(value_name = "FILE")]
    capture: Option<PathBuf>,

    /// Path to the JSON module name table
    #[arg(short, long, value_name = "FILE")]
    modules: Option<PathBuf>,

    /// Output CSV file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to a TOML job file - an alternative to the flags above
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of frames to decode (for quick inspection)
    #[arg(long, value_name = "COUNT")]
    max_frames: Option<usize>,

    /// Time-gate tolerance in milliseconds
    #[arg(long, value_name = "MS")]
    gate_tolerance: Option<i64>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("SD Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", sdlog_decoder::VERSION);

    if let Some(capture) = &args.capture {
        // Flag mode: everything on the command line
        let mut decoder_config = DecoderConfig::new();
        if let Some(tolerance) = args.gate_tolerance {
            decoder_config = decoder_config.with_gate_tolerance(tolerance);
        }
        if let Some(max) = args.max_frames {
            decoder_config = decoder_config.with_max_frames(max);
        }
        run_decode(
            capture,
            args.modules.as_deref(),
            args.output.as_deref(),
            &decoder_config,
        )
    } else if let Some(config_path) = &args.config {
        // Job-file mode, with flags overriding file values
        let job = config::load_config(config_path)?;
        let mut decode = job.decode.clone();
        if let Some(tolerance) = args.gate_tolerance {
            decode.gate_tolerance_ms = tolerance;
        }
        if let Some(max) = args.max_frames {
            decode.max_frames = Some(max);
        }
        let modules = args.modules.or(job.input.module_table);
        let output = args.output.or(job.output.path);
        run_decode(
            &job.input.capture,
            modules.as_deref(),
            output.as_deref(),
            &decode.to_decoder_config(),
        )
    } else {
        println!("SD Log Reader - No input specified");
        println!("\nQuick Start:");
        println!("  sdlog-cli LOG0001.BIN --modules modules.json -o decoded.csv");
        println!("\nFor repeatable runs:");
        println!("  sdlog-cli --config job.toml");
        println!("\nUse --help for more options");
        Ok(())
    }
}

/// Decode one capture into the chosen sink
fn run_decode(
    capture_path: &Path,
    modules_path: Option<&Path>,
    output_path: Option<&Path>,
    decoder_config: &DecoderConfig,
) -> Result<()> {
    let started = chrono::Local::now();

    let mut decoder = Decoder::new();
    if let Some(path) = modules_path {
        decoder
            .load_module_table(path)
            .with_context(|| format!("failed to load module table {:?}", path))?;
    } else {
        log::warn!("No module table given; error sources will stay unresolved");
    }

    let capture = RawCapture::from_path(capture_path)
        .with_context(|| format!("failed to read capture {:?}", capture_path))?;

    let mut sink: Box<dyn RecordSink> = match output_path {
        Some(path) => Box::new(CsvSink::to_path(path)?),
        None => Box::new(CsvSink::to_stdout()?),
    };

    let mut iter = decoder.decode_capture(&capture, decoder_config);
    let mut written = 0usize;
    while let Some(item) = iter.next() {
        let record = item.context("capture is corrupt; aborting")?;
        sink.write_record(&record)?;
        written += 1;
        if written % PROGRESS_EVERY == 0 {
            log::info!("Decoded {} frames...", written);
        }
    }
    sink.finish()?;

    let stats = iter.stats();
    let elapsed = chrono::Local::now().signed_duration_since(started);

    if let Some(path) = output_path {
        println!("═══════════════════════════════════════════════");
        println!("  Decode complete");
        println!("═══════════════════════════════════════════════");
        println!("Frames decoded:        {}", stats.frames);
        println!("Channels gated off:    {}", stats.gated_off);
        println!("Payload errors:        {}", stats.payload_errors);
        println!("Output:                {:?}", path);
        println!("Elapsed:               {} ms", elapsed.num_milliseconds());
    } else {
        // CSV went to stdout; keep the summary off it
        log::info!(
            "Decode complete: {} frames, {} gated off, {} payload errors, {} ms",
            stats.frames,
            stats.gated_off,
            stats.payload_errors,
            elapsed.num_milliseconds()
        );
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
