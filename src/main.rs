//! Murmur demo - records a voice note from the simulated device with a
//! live terminal waveform, then replays it with a moving playhead.

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;

use murmur::audio::{AudioDevice, Player, Recorder, SimulatedDevice};
use murmur::cli;
use murmur::library::NoteLibrary;
use murmur::models::format_millis;
use murmur::waveform::{self, MAX_BAR_HEIGHT, MIN_BAR_HEIGHT};

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render bar heights as a single line of unicode blocks
fn render_bars(heights: &[f32]) -> String {
    heights
        .iter()
        .map(|&h| {
            let t = (h - MIN_BAR_HEIGHT) / (MAX_BAR_HEIGHT - MIN_BAR_HEIGHT);
            let idx = (t * (BLOCKS.len() - 1) as f32).round() as usize;
            BLOCKS[idx.min(BLOCKS.len() - 1)]
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    cli::init_logging(&args);

    info!("Starting murmur demo");

    let mut sim = SimulatedDevice::new();
    if args.deny_permission {
        sim = sim.with_permission_denied();
    }
    let device: Arc<dyn AudioDevice> = Arc::new(sim);

    let library = NoteLibrary::new();
    let recorder = Recorder::new(device.clone(), library.clone());

    println!("Recording for {}s...", args.seconds);
    recorder
        .start()
        .context("failed to start recording")?;

    for _ in 0..args.seconds * 10 {
        thread::sleep(Duration::from_millis(100));
        let bars = waveform::bar_heights(&recorder.metering_snapshot(), args.buckets);
        print!("\r{}", render_bars(&bars));
        let _ = std::io::stdout().flush();
    }
    println!();

    let note = recorder
        .stop()
        .context("failed to stop recording")?
        .context("no note was produced")?;

    println!("\nNotes:");
    for entry in library.all() {
        println!(
            "  {}  {}  {}",
            entry.created_at.format("%H:%M:%S"),
            format_millis(entry.duration_millis),
            entry.audio_uri
        );
    }

    println!("\nReplaying...");
    let player = Player::new(device);
    player.load(&note).context("failed to load note")?;
    player.play().context("failed to start playback")?;

    let bars = waveform::bar_heights(&note.metering, args.buckets);
    while player.is_playing() {
        thread::sleep(Duration::from_millis(100));
        let played = (player.progress() * args.buckets as f32) as usize;
        let line = render_bars(&bars);
        let split = line
            .char_indices()
            .nth(played)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        print!(
            "\r[{}] {} / {}",
            &line[..split],
            format_millis(player.position_millis()),
            format_millis(player.duration_millis().unwrap_or(0)),
        );
        let _ = std::io::stdout().flush();
    }
    println!("\nDone");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&library.all())?);
    }

    Ok(())
}
