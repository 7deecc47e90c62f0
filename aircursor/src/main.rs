//! aircursor - drive the OS pointer with hand gestures.
//!
//! Reads one hand's landmarks per frame, turns pinches into clicks, holds
//! and scrolls, and moves the cursor with the index fingertip.

pub mod gesture;
pub mod pointer;
mod session;
pub mod source;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use gesture::{FrameSize, HandTracker, TrackerConfig};
use pointer::{LogPointer, PointerActuator, PointerKind};
use session::SessionConfig;
use source::ReplaySource;

#[derive(Parser, Debug)]
#[command(name = "aircursor", about = "Hand-gesture pointer control")]
struct Cli {
    /// Recorded landmark frames to play back (JSON Lines)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Restart the replay when it reaches the end
    #[arg(long)]
    loop_replay: bool,

    /// Tracker config file (JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Capture frame size as WxH
    #[arg(long, default_value = "640x480")]
    frame_size: String,

    /// Frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Pointer backend: log or enigo
    #[arg(long, default_value = "log")]
    pointer: String,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<f64>,

    /// Do not mirror the camera image horizontally
    #[arg(long)]
    no_mirror: bool,

    /// Screen size as WxH (default: queried from the pointer backend)
    #[arg(long)]
    screen: Option<String>,

    /// Click cooldown in milliseconds
    #[arg(long)]
    cooldown: Option<f64>,

    /// Scroll amount per step
    #[arg(long)]
    scroll_speed: Option<i32>,

    /// Seconds between status log lines
    #[arg(long, default_value_t = 60)]
    status_interval: u64,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn parse_size(flag: &str, value: &str) -> anyhow::Result<FrameSize> {
    FrameSize::parse(value).with_context(|| format!("--{flag} expects WxH, got {value:?}"))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TrackerConfig> {
    let Some(path) = path else {
        return Ok(TrackerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!(path = %path.display(), "loaded tracker config");
    Ok(config)
}

fn tracker_config(cli: &Cli) -> anyhow::Result<TrackerConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    if cli.no_mirror {
        config.mirror = false;
    }
    if let Some(screen) = &cli.screen {
        config.screen = Some(parse_size("screen", screen)?);
    }
    if let Some(ms) = cli.cooldown {
        config.cooldown_ms = ms;
    }
    if let Some(speed) = cli.scroll_speed {
        config.scroll_speed = speed;
    }
    config.validate()?;
    Ok(config)
}

fn make_pointer(
    kind: PointerKind,
    screen: Option<FrameSize>,
) -> anyhow::Result<Arc<dyn PointerActuator>> {
    match kind {
        PointerKind::Log => {
            let screen = screen.unwrap_or_else(|| LogPointer::default().screen_size());
            Ok(Arc::new(LogPointer::new(screen)))
        }
        #[cfg(feature = "enigo")]
        PointerKind::Enigo => Ok(Arc::new(pointer::EnigoPointer::new()?)),
        #[cfg(not(feature = "enigo"))]
        PointerKind::Enigo => bail!("built without the `enigo` feature; use --pointer log"),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("aircursor {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aircursor=info".into()),
        )
        .init();

    info!("aircursor v{} starting", env!("CARGO_PKG_VERSION"));

    let config = tracker_config(&cli)?;
    let frame_size = parse_size("frame-size", &cli.frame_size)?;
    let Some(kind) = PointerKind::from_str(&cli.pointer) else {
        bail!("unknown pointer backend: {}. Use: log or enigo", cli.pointer);
    };
    info!("pointer: {}", kind.as_str());

    let Some(replay) = &cli.replay else {
        bail!("no landmark source; pass --replay <file.jsonl>");
    };
    let source = ReplaySource::open(replay, cli.loop_replay)
        .with_context(|| format!("opening replay {}", replay.display()))?;
    if source.is_empty() {
        bail!("replay {} has no frames", replay.display());
    }

    let pointer = make_pointer(kind, config.screen)?;
    let mut tracker = HandTracker::new(config, Box::new(source), pointer)?;

    let exit_after = match cli.exit_after {
        Some(secs) if secs.is_finite() && secs >= 0.0 => Some(Duration::from_secs_f64(secs)),
        Some(secs) => bail!("--exit-after expects a non-negative number of seconds, got {secs}"),
        None => None,
    };
    let session_config = SessionConfig {
        fps: cli.fps,
        frame_size,
        exit_after,
        status_interval: Duration::from_secs(cli.status_interval.max(1)),
    };

    // Signal handling via libc
    session::install_signal_handlers();

    let (reason, stats) = session::run(&mut tracker, &session_config);
    info!(
        "aircursor shutting down ({}; {} frame(s), {} with a hand)",
        reason.as_str(),
        stats.frames,
        stats.hand_frames
    );
    Ok(())
}
