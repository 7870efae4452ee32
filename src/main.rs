use std::env;
use std::fs;
use std::process;

use log::info;
use pitchline::{PipelineConfig, Transcriber};

const USAGE: &str = "Usage: pitchline [--config <config.yaml>] [--chords] [--sample <fps>] <frames.json> [notes.json]";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();

    let mut config_path: Option<String> = None;
    let mut chords = false;
    let mut sample_fps: Option<f64> = None;
    let mut positional: Vec<&String> = Vec::new();

    // Parse flags
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => match iter.next() {
                Some(path) => config_path = Some(path.clone()),
                None => fail_usage(),
            },
            "--chords" => chords = true,
            "--sample" => match iter.next().and_then(|v| v.parse::<f64>().ok()) {
                Some(fps) if fps > 0.0 && fps.is_finite() => sample_fps = Some(fps),
                _ => {
                    eprintln!("--sample needs a positive number of frames per second");
                    process::exit(1);
                }
            },
            "-h" | "--help" => {
                println!("{}", USAGE);
                return;
            }
            _ => positional.push(arg),
        }
    }

    let (input_path, output_path) = match positional.as_slice() {
        [input] => (*input, None),
        [input, output] => (*input, Some(*output)),
        _ => fail_usage(),
    };

    // Configuration
    let config = match &config_path {
        Some(path) => {
            let content = read_file(path);
            match PipelineConfig::from_yaml(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error in config '{}': {}", path, e);
                    process::exit(1);
                }
            }
        }
        None if chords => PipelineConfig::chords(),
        None => PipelineConfig::melody(),
    };

    let transcriber = match Transcriber::new(config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    // Transcribe
    let frames = match pitchline::frames_from_json(&read_file(input_path)) {
        Ok(frames) => frames,
        Err(e) => {
            eprintln!("Error reading frames from '{}': {}", input_path, e);
            process::exit(1);
        }
    };
    info!("Loaded {} frames from {}", frames.len(), input_path);

    let timeline = match transcriber.transcribe(frames) {
        Ok(timeline) => timeline,
        Err(e) => {
            eprintln!("Transcription error: {}", e);
            process::exit(1);
        }
    };
    info!(
        "Transcribed {} events over {:.2}s",
        timeline.len(),
        timeline.total_duration()
    );

    // Output
    if let Some(fps) = sample_fps {
        for (t, active) in timeline.query().sample(fps) {
            let names: Vec<String> = active.pitches().iter().map(|&p| pitchline::pitch::note_name(p)).collect();
            if names.is_empty() {
                println!("{:.3}\trest", t);
            } else {
                println!("{:.3}\t{}", t, names.join(" "));
            }
        }
        return;
    }

    let json = match pitchline::timeline_to_json(&timeline) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing notes: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote {} notes to {}", timeline.len(), path);
        }
        None => {
            println!("{}", json);
        }
    }
}

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path, e);
            process::exit(1);
        }
    }
}

fn fail_usage() -> ! {
    eprintln!("{}", USAGE);
    process::exit(1);
}
