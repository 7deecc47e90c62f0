//! Two-finger scroll: detection on the frame path, actuation on its own
//! thread.
//!
//! The frame path decides whether scrolling should run and in which
//! direction, and publishes that as a `ScrollCommand`. A background loop
//! wakes once per scroll interval, reads the whole command under a lock,
//! and scrolls. Scroll cadence therefore does not depend on frame rate.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::landmark::{HandLandmark, Highlight, Highlights, LandmarkFrame};
use super::zone::{mark_zone, DistanceMetric, Zone, ZoneProbe, ZoneRadii};
use crate::pointer::PointerActuator;

// ── Direction & command ────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Up,
    Down,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Signed actuator amount for one scroll step.
    pub fn amount(&self, speed: i32) -> i32 {
        match self {
            Self::Up => speed,
            Self::Down => -speed,
        }
    }
}

/// What the scroll loop should be doing. Read and written as one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollCommand {
    pub active: bool,
    pub direction: ScrollDirection,
    /// Bumped each time a run starts, so the loop can tell a restart from
    /// a run it has already been stepping.
    pub run: u64,
}

impl ScrollCommand {
    pub fn target(&self) -> Option<ScrollDirection> {
        self.active.then_some(self.direction)
    }
}

// ── Detection ──────────────────────────────────────────────

/// Index and middle tips pinched together, pointing up or down relative to
/// the middle-finger base.
#[derive(Debug, Clone)]
pub struct ScrollDetector {
    probe: ZoneProbe,
    dead_band: i32,
}

impl ScrollDetector {
    pub fn new(radii: ZoneRadii, dead_band: i32) -> Self {
        Self {
            probe: ZoneProbe::new(
                HandLandmark::IndexTip,
                HandLandmark::MiddleTip,
                DistanceMetric::Manhattan,
                radii,
            ),
            dead_band,
        }
    }

    /// Direction to scroll this frame, or None when scrolling should stop.
    pub fn update(&self, frame: &LandmarkFrame, highlights: &mut Highlights) -> Option<ScrollDirection> {
        let reading = self.probe.evaluate(frame)?;
        let direction = self.direction(frame)?;
        let involved = [HandLandmark::IndexTip, HandLandmark::MiddleTip, HandLandmark::MiddleMcp];
        // Without a direction the pinch only counts as hovering.
        let zone = match direction {
            Some(_) => reading.zone,
            None => reading.zone.min(Zone::Hover),
        };
        mark_zone(highlights, zone, Highlight::Scroll, &involved);
        if reading.zone.is_active() {
            direction
        } else {
            None
        }
    }

    /// Vertical offset of the tip midpoint from the middle base, with the
    /// dead band applied. Outer None means landmarks are missing.
    fn direction(&self, frame: &LandmarkFrame) -> Option<Option<ScrollDirection>> {
        let index_tip = frame.get(HandLandmark::IndexTip)?;
        let middle_tip = frame.get(HandLandmark::MiddleTip)?;
        let middle_base = frame.get(HandLandmark::MiddleMcp)?;
        let mid_y = (index_tip.y as i64 + middle_tip.y as i64).div_euclid(2);
        let offset = mid_y - middle_base.y as i64;
        let band = self.dead_band as i64;
        Some(if offset < -band {
            Some(ScrollDirection::Up)
        } else if offset > band {
            Some(ScrollDirection::Down)
        } else {
            None
        })
    }
}

// ── Cadence ────────────────────────────────────────────────

/// Decides when the loop actually scrolls. Fires immediately when a run
/// starts, then once per interval on a fixed grid.
#[derive(Debug, Clone)]
pub struct ScrollTicker {
    interval: Duration,
    last_fire: Option<Instant>,
    run: u64,
}

impl ScrollTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
            run: 0,
        }
    }

    /// Direction to scroll at `now`, if a step is due.
    pub fn poll(&mut self, command: ScrollCommand, now: Instant) -> Option<ScrollDirection> {
        let Some(direction) = command.target() else {
            self.last_fire = None;
            return None;
        };
        if command.run != self.run {
            self.run = command.run;
            self.last_fire = None;
        }
        match self.last_fire {
            None => {
                self.last_fire = Some(now);
                Some(direction)
            }
            Some(last) => {
                let due = last + self.interval;
                if now < due {
                    return None;
                }
                // Stay on the grid unless we fell a whole interval behind.
                self.last_fire = Some(if now - due < self.interval { due } else { now });
                Some(direction)
            }
        }
    }

    /// How long the loop may sleep before the next possible step.
    pub fn wait(&self, now: Instant) -> Duration {
        match self.last_fire {
            Some(last) => (last + self.interval).saturating_duration_since(now),
            None => self.interval,
        }
    }
}

// ── Actuator ───────────────────────────────────────────────

enum ScrollControl {
    /// A run just started; scroll now instead of at the next wake.
    Kick,
    Shutdown,
}

/// Edge on the frame path's view of the scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTransition {
    Started(ScrollDirection),
    DirectionChanged(ScrollDirection),
    Stopped,
}

/// Owns the scroll thread and the command it reads.
pub struct ScrollActuator {
    command: Arc<Mutex<ScrollCommand>>,
    control: Sender<ScrollControl>,
    handle: Option<JoinHandle<()>>,
    /// Frame-side copy of the last published command.
    current: ScrollCommand,
}

impl ScrollActuator {
    /// Start the scroll loop.
    pub fn spawn(
        pointer: Arc<dyn PointerActuator>,
        speed: i32,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let command = Arc::new(Mutex::new(ScrollCommand::default()));
        // Kicks coalesce; a full channel already has one queued.
        let (control, rx) = bounded(4);
        let shared = Arc::clone(&command);
        let handle = thread::Builder::new()
            .name("aircursor-scroll".into())
            .spawn(move || scroll_loop(shared, rx, pointer, speed, interval))?;
        debug!(speed, interval_ms = interval.as_millis() as u64, "scroll loop started");
        Ok(Self {
            command,
            control,
            handle: Some(handle),
            current: ScrollCommand::default(),
        })
    }

    /// Publish this frame's scroll target. `None` stops scrolling.
    pub fn set_target(&mut self, target: Option<ScrollDirection>) -> Option<ScrollTransition> {
        let mut next = match target {
            Some(direction) => ScrollCommand {
                active: true,
                direction,
                run: self.current.run,
            },
            None => ScrollCommand {
                active: false,
                direction: self.current.direction,
                run: self.current.run,
            },
        };
        if next == self.current {
            return None;
        }
        let transition = match (self.current.target(), next.target()) {
            (None, Some(d)) => {
                next.run = self.current.run.wrapping_add(1);
                ScrollTransition::Started(d)
            }
            (Some(_), Some(d)) => ScrollTransition::DirectionChanged(d),
            (Some(_), None) => ScrollTransition::Stopped,
            (None, None) => {
                self.current = next;
                return None;
            }
        };
        *self.command.lock() = next;
        self.current = next;
        match transition {
            ScrollTransition::Started(d) => {
                info!(direction = d.as_str(), "scroll started");
                let _ = self.control.try_send(ScrollControl::Kick);
            }
            ScrollTransition::DirectionChanged(d) => {
                debug!(direction = d.as_str(), "scroll direction changed");
            }
            ScrollTransition::Stopped => info!("scroll stopped"),
        }
        Some(transition)
    }

    /// Stop scrolling. Returns None when already stopped.
    pub fn stop(&mut self) -> Option<ScrollTransition> {
        self.set_target(None)
    }

    pub fn is_running(&self) -> bool {
        self.current.active
    }

    pub fn command(&self) -> ScrollCommand {
        self.current
    }

    /// Stop the loop and wait for it to exit. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.stop();
        let Some(handle) = self.handle.take() else {
            return;
        };
        // Blocking send: a queued Kick must not crowd out the shutdown.
        let _ = self.control.send(ScrollControl::Shutdown);
        if handle.join().is_err() {
            warn!("scroll loop panicked");
        } else {
            debug!("scroll loop joined");
        }
    }
}

impl Drop for ScrollActuator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn scroll_loop(
    command: Arc<Mutex<ScrollCommand>>,
    control: Receiver<ScrollControl>,
    pointer: Arc<dyn PointerActuator>,
    speed: i32,
    interval: Duration,
) {
    let mut ticker = ScrollTicker::new(interval);
    loop {
        match control.recv_timeout(ticker.wait(Instant::now())) {
            Ok(ScrollControl::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(ScrollControl::Kick) | Err(RecvTimeoutError::Timeout) => {}
        }
        let snapshot = *command.lock();
        if let Some(direction) = ticker.poll(snapshot, Instant::now()) {
            pointer.scroll(direction.amount(speed));
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
