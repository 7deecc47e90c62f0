//! Per-frame gesture coordinator.
//!
//! `HandTracker` owns every detector and the scroll loop. For each frame
//! it asks the landmark source for a hand, then runs, in this order:
//! cursor tracking, scroll, hold, left click (skipped while holding), and
//! right click. Scroll and hold come before the clicks so a click sees
//! this frame's hold state. Losing the hand releases the hold and stops
//! scrolling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::click::{LeftClickDetector, RightClickDetector};
use super::config::{ConfigError, TrackerConfig};
use super::hold::{HoldLatch, HoldTransition};
use super::landmark::{
    map_to_screen, FrameSize, HandLandmark, Highlight, Highlights, LandmarkFrame, NormalizedPoint,
    Point, TRACKED_LANDMARKS,
};
use super::scroll::{ScrollActuator, ScrollDetector, ScrollDirection, ScrollTransition};
use crate::pointer::PointerActuator;
use crate::source::{LandmarkSource, VideoFrame};

// ── Events ─────────────────────────────────────────────────

/// Pointer actions dispatched while processing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    LeftClick,
    RightClick,
    HoldStarted,
    HoldReleased { held_for: Duration },
    ScrollStarted { direction: ScrollDirection },
    ScrollDirectionChanged { direction: ScrollDirection },
    ScrollStopped,
}

impl GestureEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftClick => "left-click",
            Self::RightClick => "right-click",
            Self::HoldStarted => "hold-started",
            Self::HoldReleased { .. } => "hold-released",
            Self::ScrollStarted { .. } => "scroll-started",
            Self::ScrollDirectionChanged { .. } => "scroll-direction-changed",
            Self::ScrollStopped => "scroll-stopped",
        }
    }
}

impl From<ScrollTransition> for GestureEvent {
    fn from(t: ScrollTransition) -> Self {
        match t {
            ScrollTransition::Started(direction) => Self::ScrollStarted { direction },
            ScrollTransition::DirectionChanged(direction) => {
                Self::ScrollDirectionChanged { direction }
            }
            ScrollTransition::Stopped => Self::ScrollStopped,
        }
    }
}

// ── Frame report ───────────────────────────────────────────

/// One overlay dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPoint {
    pub landmark: HandLandmark,
    pub position: Point,
    pub highlight: Highlight,
}

/// Everything a frame produced. The input frame itself is never modified.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// The hand in frame pixels, if one was detected.
    pub hand: Option<LandmarkFrame>,
    pub highlights: Highlights,
    /// Where the cursor was moved, in screen pixels.
    pub cursor: Option<Point>,
    pub events: Vec<GestureEvent>,
    /// The landmark source failed on this frame.
    pub source_failed: bool,
}

impl FrameReport {
    /// Highlighted dots for the tracked landmarks present in this frame.
    pub fn overlay_points(&self) -> Vec<OverlayPoint> {
        let Some(hand) = &self.hand else {
            return Vec::new();
        };
        TRACKED_LANDMARKS
            .iter()
            .filter_map(|lm| {
                hand.get(*lm).map(|position| OverlayPoint {
                    landmark: *lm,
                    position,
                    highlight: self.highlights.get(*lm),
                })
            })
            .collect()
    }

    /// Overlay dots as an s-expression, or None without a hand.
    pub fn overlay_sexp(&self) -> Option<String> {
        self.hand.as_ref()?;
        let dots: Vec<String> = self
            .overlay_points()
            .iter()
            .map(|p| {
                let (r, g, b) = p.highlight.rgb();
                format!(
                    "(:landmark {} :x {} :y {} :highlight {} :rgb ({} {} {}))",
                    p.landmark.as_str(),
                    p.position.x,
                    p.position.y,
                    p.highlight.as_str(),
                    r,
                    g,
                    b
                )
            })
            .collect();
        Some(format!("({})", dots.join(" ")))
    }
}

// ── Tracker ────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid tracker config: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to start scroll loop: {0}")]
    ScrollLoop(#[from] std::io::Error),
}

pub struct HandTracker {
    config: TrackerConfig,
    source: Box<dyn LandmarkSource>,
    pointer: Arc<dyn PointerActuator>,
    screen: FrameSize,
    scroll_detector: ScrollDetector,
    scroll: ScrollActuator,
    hold: HoldLatch,
    left_click: LeftClickDetector,
    right_click: RightClickDetector,
    frames_processed: u64,
    source_failures: u64,
    released: bool,
}

impl HandTracker {
    pub fn new(
        config: TrackerConfig,
        source: Box<dyn LandmarkSource>,
        pointer: Arc<dyn PointerActuator>,
    ) -> Result<Self, TrackerError> {
        config.validate()?;
        let cooldown = config.cooldown()?;
        let screen = config.screen.unwrap_or_else(|| pointer.screen_size());
        let scroll = ScrollActuator::spawn(
            Arc::clone(&pointer),
            config.scroll_speed,
            config.scroll_interval()?,
        )?;
        info!(
            pointer = pointer.name(),
            %screen,
            cooldown_ms = config.cooldown_ms,
            mirror = config.mirror,
            "hand tracker ready"
        );
        Ok(Self {
            scroll_detector: ScrollDetector::new(config.scroll, config.scroll_dead_band_px),
            hold: HoldLatch::new(config.hold, config.min_hold()?),
            left_click: LeftClickDetector::new(config.click, cooldown),
            right_click: RightClickDetector::new(config.right_click, cooldown),
            scroll,
            screen,
            source,
            pointer,
            config,
            frames_processed: 0,
            source_failures: 0,
            released: false,
        })
    }

    /// Detect and act on one captured frame.
    pub fn process_frame(&mut self, frame: &VideoFrame) -> FrameReport {
        self.process_frame_at(frame, Instant::now())
    }

    pub fn process_frame_at(&mut self, frame: &VideoFrame, now: Instant) -> FrameReport {
        if self.released {
            return FrameReport::default();
        }
        match self.source.detect(frame) {
            Ok(landmarks) => self.process_landmarks(landmarks.as_deref(), frame.size, now),
            Err(e) => {
                self.source_failures += 1;
                warn!(error = %e, failures = self.source_failures, "landmark detection failed");
                let mut report = self.process_landmarks(None, frame.size, now);
                report.source_failed = true;
                report
            }
        }
    }

    /// Run the gesture pipeline on already-detected landmarks.
    pub fn process_landmarks(
        &mut self,
        landmarks: Option<&[NormalizedPoint]>,
        frame_size: FrameSize,
        now: Instant,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        if self.released {
            return report;
        }
        self.frames_processed += 1;

        let Some(points) = landmarks.filter(|p| !p.is_empty()) else {
            self.hand_lost(now, &mut report.events);
            return report;
        };
        let hand = LandmarkFrame::from_normalized(points, frame_size, self.config.mirror);
        let hl = &mut report.highlights;

        if let Some(tip) = hand.get(HandLandmark::IndexTip) {
            let cursor = map_to_screen(tip, frame_size, self.screen);
            self.pointer.move_cursor(cursor.x, cursor.y);
            report.cursor = Some(cursor);
        }

        let target = self.scroll_detector.update(&hand, hl);
        if let Some(transition) = self.scroll.set_target(target) {
            report.events.push(transition.into());
        }

        match self.hold.update(&hand, hl, now) {
            Some(HoldTransition::Pressed) => {
                self.pointer.mouse_down();
                report.events.push(GestureEvent::HoldStarted);
            }
            Some(HoldTransition::Released { held_for }) => {
                self.pointer.mouse_up();
                report.events.push(GestureEvent::HoldReleased { held_for });
            }
            None => {}
        }

        if !self.hold.is_held() && self.left_click.update(&hand, hl, now) {
            self.pointer.click_left();
            report.events.push(GestureEvent::LeftClick);
        }

        if self.right_click.update(&hand, hl, now) {
            self.pointer.click_right();
            report.events.push(GestureEvent::RightClick);
        }

        if !report.events.is_empty() {
            debug!(
                events = ?report.events.iter().map(|e| e.as_str()).collect::<Vec<_>>(),
                "frame dispatched"
            );
        }
        report.hand = Some(hand);
        report
    }

    /// Drop into the released state: button up, scrolling off.
    fn hand_lost(&mut self, now: Instant, events: &mut Vec<GestureEvent>) {
        if let Some(HoldTransition::Released { held_for }) = self.hold.release(now) {
            self.pointer.mouse_up();
            events.push(GestureEvent::HoldReleased { held_for });
        }
        if let Some(transition) = self.scroll.stop() {
            events.push(transition.into());
        }
    }

    pub fn is_holding(&self) -> bool {
        self.hold.is_held()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_running()
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll.command().target()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn source_failures(&self) -> u64 {
        self.source_failures
    }

    /// Whether the landmark source has run dry.
    pub fn source_exhausted(&self) -> bool {
        self.source.is_exhausted()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Stop the scroll loop, let go of any held button, and close the
    /// landmark source. Later calls do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.scroll.shutdown();
        if self.hold.release(Instant::now()).is_some() {
            self.pointer.mouse_up();
        }
        self.source.close();
        info!(
            frames = self.frames_processed,
            source_failures = self.source_failures,
            "hand tracker released"
        );
    }

    /// Generate s-expression for status logging.
    pub fn status_sexp(&self, now: Instant) -> String {
        let scroll = match self.scroll_direction() {
            Some(d) => format!("(:active t :direction :{})", d.as_str()),
            None => "(:active nil)".to_string(),
        };
        let since = |t: Option<Instant>| match t {
            Some(t) => format!("{}", now.saturating_duration_since(t).as_millis()),
            None => "nil".to_string(),
        };
        format!(
            "(:frames {} :source-failures {} :holding {} :hold-ms {} :scroll {} :last-left-click-ms {} :last-right-click-ms {})",
            self.frames_processed,
            self.source_failures,
            if self.hold.is_held() { "t" } else { "nil" },
            self.hold
                .held_for(now)
                .map(|d| d.as_millis().to_string())
                .unwrap_or_else(|| "nil".to_string()),
            scroll,
            since(self.left_click.last_click()),
            since(self.right_click.last_click()),
        )
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) {
        self.release();
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
const TEST_FRAME: FrameSize = FrameSize {
    width: 640,
    height: 480,
};

/// A relaxed hand with no gesture engaged, in frame pixels.
#[cfg(test)]
fn neutral_pose() -> Vec<Point> {
    let mut pts = vec![Point::new(600, 50); super::landmark::LANDMARK_COUNT];
    pts[HandLandmark::Wrist.index()] = Point::new(320, 460);
    pts[HandLandmark::ThumbTip.index()] = Point::new(100, 300);
    pts[HandLandmark::IndexMcp.index()] = Point::new(250, 300);
    pts[HandLandmark::IndexPip.index()] = Point::new(250, 250);
    pts[HandLandmark::IndexDip.index()] = Point::new(250, 200);
    pts[HandLandmark::IndexTip.index()] = Point::new(250, 150);
    pts[HandLandmark::MiddleMcp.index()] = Point::new(320, 300);
    pts[HandLandmark::MiddleTip.index()] = Point::new(330, 120);
    pts[HandLandmark::PinkyTip.index()] = Point::new(450, 200);
    pts
}

/// Convert pixels to normalized coordinates that truncate back exactly.
#[cfg(test)]
fn normalize(pts: &[Point]) -> Vec<NormalizedPoint> {
    pts.iter()
        .map(|p| {
            NormalizedPoint::new(
                (p.x as f32 + 0.5) / TEST_FRAME.width as f32,
                (p.y as f32 + 0.5) / TEST_FRAME.height as f32,
            )
        })
        .collect()
}

#[cfg(test)]
fn test_config() -> TrackerConfig {
    TrackerConfig {
        mirror: false,
        ..TrackerConfig::default()
    }
}

// ── Tests ──────────────────────────────────────────────────
