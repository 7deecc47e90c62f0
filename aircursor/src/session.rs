//! Capture loop: paces frames through the tracker until told to stop.
//!
//! Stops on SIGINT/SIGTERM, on the optional exit timer, or when the
//! landmark source runs dry. Logs tracker status periodically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, Level};

use crate::gesture::{FrameSize, GestureEvent, HandTracker};
use crate::source::VideoFrame;

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Target frames per second.
    pub fps: u32,
    /// Capture resolution handed to the landmark source.
    pub frame_size: FrameSize,
    /// Stop after this long.
    pub exit_after: Option<Duration>,
    pub status_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            frame_size: FrameSize::new(640, 480),
            exit_after: None,
            status_interval: Duration::from_secs(60),
        }
    }
}

impl SessionConfig {
    fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Signal,
    ExitTimer,
    SourceExhausted,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signal => "signal",
            Self::ExitTimer => "exit-timer",
            Self::SourceExhausted => "source-exhausted",
        }
    }
}

/// Totals for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub hand_frames: u64,
    pub left_clicks: u64,
    pub right_clicks: u64,
    pub holds: u64,
    pub scrolls: u64,
}

impl SessionStats {
    fn record(&mut self, events: &[GestureEvent]) {
        for event in events {
            match event {
                GestureEvent::LeftClick => self.left_clicks += 1,
                GestureEvent::RightClick => self.right_clicks += 1,
                GestureEvent::HoldStarted => self.holds += 1,
                GestureEvent::ScrollStarted { .. } => self.scrolls += 1,
                _ => {}
            }
        }
    }
}

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
pub fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Drive `tracker` until a stop condition, then release it.
pub fn run(tracker: &mut HandTracker, config: &SessionConfig) -> (StopReason, SessionStats) {
    let reason_and_stats = run_until(tracker, config, || SHUTDOWN_REQUESTED.load(Ordering::SeqCst));
    tracker.release();
    reason_and_stats
}

fn run_until(
    tracker: &mut HandTracker,
    config: &SessionConfig,
    stop_requested: impl Fn() -> bool,
) -> (StopReason, SessionStats) {
    let frame = VideoFrame::blank(config.frame_size);
    let interval = config.frame_interval();
    let start_time = Instant::now();
    let mut last_status_log = start_time;
    let mut stats = SessionStats::default();

    info!(
        fps = config.fps,
        frame = %config.frame_size,
        exit_after_s = config.exit_after.map(|d| d.as_secs_f64()),
        "session started"
    );

    let reason = loop {
        if stop_requested() {
            info!("Shutdown signal received, exiting");
            break StopReason::Signal;
        }

        if let Some(dur) = config.exit_after {
            if start_time.elapsed() >= dur {
                info!("exit timer fired after {:.1}s", dur.as_secs_f64());
                break StopReason::ExitTimer;
            }
        }

        if tracker.source_exhausted() {
            info!("landmark source exhausted");
            break StopReason::SourceExhausted;
        }

        let frame_start = Instant::now();
        let report = tracker.process_frame_at(&frame, frame_start);
        stats.frames += 1;
        if report.hand.is_some() {
            stats.hand_frames += 1;
        }
        stats.record(&report.events);
        if tracing::enabled!(Level::TRACE) {
            if let Some(overlay) = report.overlay_sexp() {
                trace!("overlay: {}", overlay);
            }
        }

        if last_status_log.elapsed() >= config.status_interval {
            info!("tracker status: {}", tracker.status_sexp(Instant::now()));
            last_status_log = Instant::now();
        }

        let spent = frame_start.elapsed();
        if spent < interval {
            thread::sleep(interval - spent);
        } else {
            debug!(spent_ms = spent.as_millis() as u64, "frame over budget");
        }
    };

    info!(
        reason = reason.as_str(),
        frames = stats.frames,
        hand_frames = stats.hand_frames,
        left_clicks = stats.left_clicks,
        right_clicks = stats.right_clicks,
        holds = stats.holds,
        scrolls = stats.scrolls,
        "session ended"
    );
    (reason, stats)
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{NormalizedPoint, TrackerConfig};
    use crate::pointer::{PointerCall, RecordingPointer};
    use crate::source::ScriptedSource;
    use std::sync::Arc;

    fn fast() -> SessionConfig {
        SessionConfig {
            fps: 1000,
            ..SessionConfig::default()
        }
    }

    /// All 21 landmarks at one spot: every pair in contact.
    fn fist() -> Vec<NormalizedPoint> {
        vec![NormalizedPoint::new(0.5, 0.5); 21]
    }

    fn tracker(frames: Vec<Option<Vec<NormalizedPoint>>>) -> (HandTracker, Arc<RecordingPointer>) {
        let pointer = Arc::new(RecordingPointer::default());
        let source = ScriptedSource::new(frames.into_iter().map(Ok).collect());
        let tracker = HandTracker::new(TrackerConfig::default(), Box::new(source), pointer.clone())
            .unwrap();
        (tracker, pointer)
    }

    #[test]
    fn test_stops_when_source_exhausted() {
        let (mut tracker, pointer) = tracker(vec![Some(fist()), Some(fist()), None]);
        let (reason, stats) = run(&mut tracker, &fast());
        assert_eq!(reason, StopReason::SourceExhausted);
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.hand_frames, 2);
        assert_eq!(stats.holds, 1);
        assert_eq!(stats.right_clicks, 1);
        assert!(tracker.is_released());
        assert_eq!(pointer.count(|c| *c == PointerCall::MouseDown), 1);
        assert_eq!(pointer.count(|c| *c == PointerCall::MouseUp), 1);
    }

    #[test]
    fn test_stop_request() {
        let (mut tracker, _pointer) = tracker(vec![Some(fist()); 10]);
        let (reason, stats) = run_until(&mut tracker, &fast(), || true);
        assert_eq!(reason, StopReason::Signal);
        assert_eq!(stats.frames, 0);
    }

    #[test]
    fn test_exit_timer() {
        let (mut tracker, _pointer) = tracker(vec![None; 100_000]);
        let config = SessionConfig {
            exit_after: Some(Duration::from_millis(30)),
            ..fast()
        };
        let (reason, stats) = run_until(&mut tracker, &config, || false);
        assert_eq!(reason, StopReason::ExitTimer);
        assert!(stats.frames > 0);
    }

    #[test]
    fn test_frame_interval() {
        let config = SessionConfig {
            fps: 0,
            ..SessionConfig::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_secs(1));
        assert_eq!(SessionConfig::default().frame_interval(), Duration::from_nanos(33_333_333));
    }
}
