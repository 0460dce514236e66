//! Example: Follow a live recording against a reference recording
//!
//! Usage:
//!   cargo run --release --example follow_file -- [--n-fft N] [--hop N] [--json] <reference> <live>
//!
//! Notes:
//! - Both files are decoded with symphonia and mixed down to mono.
//! - The live file is streamed through the follower one hop at a time, like a capture callback.

use std::env;

use stratum_follow::io::decoder::decode_audio;
use stratum_follow::preprocessing::channel_mixer::downmix_to_mono;
use stratum_follow::preprocessing::resample::resample_mono;
use stratum_follow::{align_audio, FollowerConfig};

fn load_mono(path: &str, target_rate: u32) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let audio = decode_audio(path)?;
    eprintln!(
        "{}: {:.2}s, {} channel(s) at {} Hz",
        path,
        audio.duration_seconds(),
        audio.channels,
        audio.sample_rate
    );
    let mono = downmix_to_mono(&audio.samples, audio.channels)?;
    Ok(resample_mono(&mono, audio.sample_rate, target_rate)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut json = false;
    let mut config = FollowerConfig::default();
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--n-fft" => {
                config.n_fft = args.first().ok_or("--n-fft requires a value")?.parse()?;
                args.remove(0);
            }
            "--hop" => {
                config.hop_length = args.first().ok_or("--hop requires a value")?.parse()?;
                args.remove(0);
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: follow_file [--n-fft N] [--hop N] [--json] <reference> <live>\n\
                     \n\
                     --n-fft N  Analysis window length (default: 8192)\n\
                     --hop N    Hop between frames (default: 4096)\n\
                     --json     Emit the full alignment result as JSON\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.len() != 2 {
        eprintln!("ERROR: Provide a reference and a live audio file. Use --help for usage.");
        std::process::exit(2);
    }

    let reference = load_mono(&paths[0], config.sample_rate)?;
    let live = load_mono(&paths[1], config.sample_rate)?;

    let result = align_audio(&reference, &live, config.sample_rate, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let hop_seconds = result.metadata.hop_length as f64 / result.metadata.sample_rate as f64;
    println!("Alignment Results:");
    println!(
        "  Reference: {} frames ({:.2}s)",
        result.metadata.reference_frames, result.metadata.reference_duration_seconds
    );
    println!(
        "  Live: {} frames ({:.2}s)",
        result.metadata.live_frames, result.metadata.live_duration_seconds
    );
    for (t, position) in result.positions_seconds.iter().enumerate() {
        println!("  live {:>8.2}s -> reference {:>8.2}s", t as f64 * hop_seconds, position);
    }
    if !result.metadata.flags.is_empty() {
        println!("  Flags: {:?}", result.metadata.flags);
    }
    println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);

    Ok(())
}
