//! ppm-info - inspect a Flipnote PPM file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use flipnote_ppm::{DecodeOptions, PpmContainer, TrackKind};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <file.ppm> [options.json]", args[0]);
        eprintln!();
        eprintln!("Decode a Flipnote PPM file and print what it contains.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  file.ppm      Flipnote animation to inspect");
        eprintln!("  options.json  Decode options (default: built-in defaults)");
        eprintln!();
        eprintln!("Example options are printed with the --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_options();
        return;
    }

    let ppm_path = PathBuf::from(&args[1]);

    let options = match args.get(2) {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading options file: {}", e);
                std::process::exit(1);
            });
            serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("Error parsing options: {}", e);
                std::process::exit(1);
            })
        }
        None => DecodeOptions::default(),
    };

    let ppm = PpmContainer::open_with_options(&ppm_path, options).unwrap_or_else(|e| {
        eprintln!("Error opening {}: {}", ppm_path.display(), e);
        std::process::exit(1);
    });

    let header = ppm.header();
    println!("Flipnote PPM");
    println!("============");
    println!("File: {}", ppm_path.display());
    println!(
        "Frames: {} at {} fps ({:.2}s)",
        ppm.frame_count(),
        ppm.fps(),
        ppm.duration()
    );
    println!(
        "Speed: frame {}, BGM recorded at {}",
        ppm.frame_speed().value(),
        ppm.bgm_speed().value()
    );
    println!("Locked: {}, looped: {}", header.locked, header.looped);
    println!();

    println!("Metadata:");
    match serde_json::to_string_pretty(ppm.metadata()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing metadata: {}", e),
    }
    println!();

    let schedule = ppm.sfx_schedule();
    println!("SFX events: {}", schedule.len());
    for event in schedule.events() {
        println!(
            "  frame {:>4} ({:.2}s): {:?}",
            event.frame_index,
            event.start_seconds(ppm.fps()),
            event.channel
        );
    }
    println!();

    println!("Decoding frames...");
    let start = Instant::now();
    let frames = ppm.decode_frames();
    let elapsed = start.elapsed();
    let failed = frames.failures().count();
    println!(
        "  {} of {} frames decoded in {:.1}ms",
        frames.len() - failed,
        frames.len(),
        elapsed.as_secs_f64() * 1000.0
    );
    for (index, err) in frames.failures() {
        println!("  frame {}: {}", index, err);
    }
    println!();

    println!("Audio:");
    let audio = ppm.decode_audio();
    for kind in TrackKind::ALL {
        match audio.result(kind) {
            Ok(track) if track.is_empty() => println!("  {}: none", kind),
            Ok(track) => println!(
                "  {}: {} samples at {} Hz ({:.2}s)",
                kind,
                track.samples.len(),
                track.sample_rate,
                track.duration_seconds()
            ),
            Err(e) => println!("  {}: {}", kind, e),
        }
    }

    if failed > 0 || audio.failures().count() > 0 {
        std::process::exit(2);
    }
}

fn print_example_options() {
    println!("Example options (options.json):");
    match serde_json::to_string_pretty(&DecodeOptions::default()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing options: {}", e),
    }
}
