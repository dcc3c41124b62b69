//! Gesture Presenter - replay hand-gesture frame messages against a slide deck.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use gesture_presenter::hand::{FingerConfig, Handedness, YAxis};
use gesture_presenter::ipc::{handle_message, Session};
use gesture_presenter::{ControllerConfig, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "gesture-presenter", about = "Hand-gesture presentation controller")]
struct Cli {
    /// Number of slides in the deck
    #[arg(long, default_value_t = 1)]
    slides: usize,

    /// Frames to ignore repeated triggers after one fires
    #[arg(long, default_value_t = 10)]
    debounce_frames: u32,

    /// Slide navigation is accepted while the hand centre y is at most this value
    #[arg(long, default_value_t = 500.0)]
    zone_threshold: f32,

    /// Hand to assume when a frame carries no :hand label (left or right)
    #[arg(long)]
    handedness: Option<String>,

    /// Camera feed is horizontally mirrored
    #[arg(long)]
    mirrored: bool,

    /// Landmark y axis grows upward instead of downward
    #[arg(long)]
    y_up: bool,

    /// Minimum tip-over-joint margin for a finger to count as extended
    #[arg(long, default_value_t = 0.0)]
    epsilon: f32,

    /// Minimum sideways margin for the thumb to count as extended
    #[arg(long, default_value_t = 0.0)]
    thumb_threshold: f32,

    /// Message script to replay (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gesture-presenter {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_presenter=info".into()),
        )
        .init();

    info!("gesture-presenter v{} starting", env!("CARGO_PKG_VERSION"));

    let default_handedness = match cli.handedness.as_deref() {
        None => Handedness::Unknown,
        Some(name) => match Handedness::parse(name) {
            Handedness::Unknown => anyhow::bail!("unknown handedness {name:?}; use left or right"),
            hand => hand,
        },
    };

    let config = PipelineConfig {
        fingers: FingerConfig {
            y_axis: if cli.y_up { YAxis::Up } else { YAxis::Down },
            mirrored: cli.mirrored,
            extension_epsilon: cli.epsilon,
            thumb_threshold: cli.thumb_threshold,
            default_handedness,
        },
        controller: ControllerConfig {
            slide_count: cli.slides,
            debounce_delay_frames: cli.debounce_frames,
            zone_threshold_y: cli.zone_threshold,
        },
    };
    info!("config: {}", config.config_sexp());

    let mut session = Session::new(config).context("invalid session configuration")?;

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut handled = 0u64;

    for line in reader.lines() {
        let line = line.context("failed to read message")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let response = handle_message(&mut session, line);
        writeln!(out, "{}", response).context("failed to write response")?;
        handled += 1;
    }

    info!(
        messages = handled,
        slide = session.pipeline().controller().slide(),
        "input finished"
    );
    Ok(())
}

