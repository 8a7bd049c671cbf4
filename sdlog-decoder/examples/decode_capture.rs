//! Standalone capture decoding walkthrough
//!
//! Decodes a raw SD-card capture and prints per-identifier statistics plus
//! the first few records.
//!
//! Usage:
//!   decode_capture <capture.bin> [--modules <modules.json>] [--limit <count>]

use sdlog_decoder::{Decoder, DecoderConfig};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let capture_path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("Usage: decode_capture <capture.bin> [--modules <modules.json>] [--limit <count>]");
            process::exit(1);
        }
    };

    let mut modules_path: Option<PathBuf> = None;
    let mut limit: Option<usize> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--modules" => modules_path = args.next().map(PathBuf::from),
            "--limit" => limit = args.next().and_then(|v| v.parse().ok()),
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
    }

    let mut decoder = Decoder::new();
    if let Some(path) = &modules_path {
        if let Err(e) = decoder.load_module_table(path) {
            eprintln!("Failed to load module table: {}", e);
            process::exit(1);
        }
    }

    let mut config = DecoderConfig::new();
    if let Some(max) = limit {
        config = config.with_max_frames(max);
    }

    let records = match decoder.decode_file(&capture_path, &config) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Decoding failed: {}", e);
            process::exit(1);
        }
    };

    let mut per_identifier: HashMap<u16, usize> = HashMap::new();
    let mut with_channels = 0usize;
    for record in &records {
        *per_identifier.entry(record.identifier).or_default() += 1;
        if record.has_channel_data() {
            with_channels += 1;
        }
    }

    println!("=== First records ===");
    for record in records.iter().take(10) {
        let channels: Vec<String> = record
            .channels()
            .filter_map(|(c, v)| v.map(|v| format!("{}={}", c.name(), v)))
            .collect();
        println!(
            "{:>8} ms  id {:>4}  {}  [{}]",
            record.timestamp_ms,
            record.identifier,
            record.kind,
            channels.join(", ")
        );
    }

    println!("\n=== Summary ===");
    println!("Frames decoded: {}", records.len());
    println!("Frames with channel data: {}", with_channels);
    let mut ids: Vec<_> = per_identifier.into_iter().collect();
    ids.sort();
    for (id, count) in ids {
        println!("  identifier {:>4}: {} frames", id, count);
    }
}
