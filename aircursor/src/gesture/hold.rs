//! Click-and-hold latch.
//!
//! Edge-triggered Idle/Held state over the thumb-tip/index-tip pinch. The
//! latch presses on entering the Active zone and releases as soon as the
//! pair leaves it (hover, far, missing landmarks, or no hand at all).
//! The minimum hold duration is advisory: short holds are logged, never
//! extended.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::landmark::{HandLandmark, Highlight, Highlights, LandmarkFrame};
use super::zone::{mark_zone, DistanceMetric, ZoneProbe, ZoneRadii};

/// Latch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Idle,
    Held { since: Instant },
}

/// Edge emitted by the latch; the caller turns these into button events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldTransition {
    Pressed,
    Released { held_for: Duration },
}

#[derive(Debug, Clone)]
pub struct HoldLatch {
    probe: ZoneProbe,
    min_hold: Duration,
    state: HoldState,
}

impl HoldLatch {
    pub fn new(radii: ZoneRadii, min_hold: Duration) -> Self {
        Self {
            probe: ZoneProbe::new(
                HandLandmark::ThumbTip,
                HandLandmark::IndexTip,
                DistanceMetric::Euclidean,
                radii,
            ),
            min_hold,
            state: HoldState::Idle,
        }
    }

    /// Advance the latch with this frame's landmarks.
    pub fn update(
        &mut self,
        frame: &LandmarkFrame,
        highlights: &mut Highlights,
        now: Instant,
    ) -> Option<HoldTransition> {
        let Some(reading) = self.probe.evaluate(frame) else {
            return self.release(now);
        };
        mark_zone(
            highlights,
            reading.zone,
            Highlight::Hold,
            &[self.probe.a, self.probe.b],
        );

        match (self.state, reading.zone.is_active()) {
            (HoldState::Idle, true) => {
                self.state = HoldState::Held { since: now };
                info!(distance = reading.distance, "hold engaged");
                Some(HoldTransition::Pressed)
            }
            (HoldState::Held { .. }, false) => {
                debug!(zone = reading.zone.as_str(), "hold pinch opened");
                self.release(now)
            }
            _ => None,
        }
    }

    /// Force the latch to Idle. Returns None when already Idle.
    pub fn release(&mut self, now: Instant) -> Option<HoldTransition> {
        let HoldState::Held { since } = self.state else {
            return None;
        };
        self.state = HoldState::Idle;
        let held_for = now.saturating_duration_since(since);
        if held_for < self.min_hold {
            debug!(
                held_ms = held_for.as_millis() as u64,
                min_hold_ms = self.min_hold.as_millis() as u64,
                "hold released before minimum duration"
            );
        }
        info!(held_ms = held_for.as_millis() as u64, "hold released");
        Some(HoldTransition::Released { held_for })
    }

    pub fn is_held(&self) -> bool {
        matches!(self.state, HoldState::Held { .. })
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    /// How long the current hold has lasted, if held.
    pub fn held_for(&self, now: Instant) -> Option<Duration> {
        match self.state {
            HoldState::Held { since } => Some(now.saturating_duration_since(since)),
            HoldState::Idle => None,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmark::{test_hand, FrameSize, Point};

    fn pinch(dist: i32) -> LandmarkFrame {
        let mut pts = test_hand(Point::new(600, 450));
        pts[HandLandmark::IndexTip.index()] = Point::new(300, 200);
        pts[HandLandmark::ThumbTip.index()] = Point::new(300, 200 + dist);
        LandmarkFrame::from_pixels(pts, FrameSize::new(640, 480))
    }

    fn latch() -> HoldLatch {
        HoldLatch::new(ZoneRadii::new(30.0, 35.0), Duration::from_millis(100))
    }

    #[test]
    fn test_press_and_release() {
        let t0 = Instant::now();
        let mut hold = latch();
        let mut hl = Highlights::default();

        assert_eq!(hold.update(&pinch(10), &mut hl, t0), Some(HoldTransition::Pressed));
        assert!(hold.is_held());
        assert_eq!(hl.get(HandLandmark::ThumbTip), Highlight::Hold);

        // Still pinched: no new edge.
        assert_eq!(hold.update(&pinch(12), &mut hl, t0 + Duration::from_millis(50)), None);

        let t1 = t0 + Duration::from_millis(300);
        assert_eq!(
            hold.update(&pinch(40), &mut hl, t1),
            Some(HoldTransition::Released {
                held_for: Duration::from_millis(300)
            })
        );
        assert!(!hold.is_held());
    }

    #[test]
    fn test_hover_releases_held() {
        let t0 = Instant::now();
        let mut hold = latch();
        let mut hl = Highlights::default();
        hold.update(&pinch(10), &mut hl, t0);

        hl.reset();
        let edge = hold.update(&pinch(32), &mut hl, t0 + Duration::from_millis(20));
        assert!(matches!(edge, Some(HoldTransition::Released { .. })));
        assert_eq!(hl.get(HandLandmark::IndexTip), Highlight::Hover);
    }

    #[test]
    fn test_hover_while_idle_is_silent() {
        let t0 = Instant::now();
        let mut hold = latch();
        let mut hl = Highlights::default();
        assert_eq!(hold.update(&pinch(32), &mut hl, t0), None);
        assert_eq!(hold.update(&pinch(40), &mut hl, t0), None);
        assert_eq!(hold.state(), HoldState::Idle);
    }

    #[test]
    fn test_release_is_idempotent() {
        let t0 = Instant::now();
        let mut hold = latch();
        assert_eq!(hold.release(t0), None);

        let mut hl = Highlights::default();
        hold.update(&pinch(5), &mut hl, t0);
        assert!(hold.release(t0).is_some());
        assert_eq!(hold.release(t0), None);
    }

    #[test]
    fn test_short_hold_not_extended() {
        let t0 = Instant::now();
        let mut hold = latch();
        let mut hl = Highlights::default();
        hold.update(&pinch(5), &mut hl, t0);
        // 10ms is under the advisory minimum, yet release happens right away.
        let edge = hold.update(&pinch(80), &mut hl, t0 + Duration::from_millis(10));
        assert_eq!(
            edge,
            Some(HoldTransition::Released {
                held_for: Duration::from_millis(10)
            })
        );
    }

    #[test]
    fn test_missing_landmarks_release() {
        let t0 = Instant::now();
        let mut hold = latch();
        let mut hl = Highlights::default();
        hold.update(&pinch(5), &mut hl, t0);
        let partial = LandmarkFrame::from_pixels(vec![Point::new(1, 1); 8], FrameSize::new(640, 480));
        assert!(matches!(
            hold.update(&partial, &mut hl, t0),
            Some(HoldTransition::Released { .. })
        ));
    }

    #[test]
    fn test_held_for() {
        let t0 = Instant::now();
        let mut hold = latch();
        assert!(hold.held_for(t0).is_none());
        let mut hl = Highlights::default();
        hold.update(&pinch(5), &mut hl, t0);
        assert_eq!(hold.held_for(t0 + Duration::from_millis(250)), Some(Duration::from_millis(250)));
    }
}
