//! Debounced left and right click detection.
//!
//! Contact is an Active-zone reading; a click fires on contact only once
//! the button's cooldown has elapsed since its previous click. Each button
//! keeps its own timestamp. A cooling-down detector does not evaluate or
//! highlight anything.

use std::time::{Duration, Instant};

use tracing::debug;

use super::landmark::{HandLandmark, Highlight, Highlights, LandmarkFrame};
use super::zone::{mark_zone, DistanceMetric, Zone, ZoneProbe, ZoneRadii};

/// Cooldown gate shared by both buttons.
#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    last_fire: Option<Instant>,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fire: None,
        }
    }

    /// Whether a new firing is allowed at `now`.
    pub fn ready(&self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) => now.saturating_duration_since(last) >= self.window,
            None => true,
        }
    }

    /// Fire if `contact` and ready; stamps the firing time.
    pub fn trigger(&mut self, contact: bool, now: Instant) -> bool {
        if contact && self.ready(now) {
            self.last_fire = Some(now);
            true
        } else {
            false
        }
    }

    pub fn last_fire(&self) -> Option<Instant> {
        self.last_fire
    }
}

// ── Left click ─────────────────────────────────────────────

/// Thumb tip touching any index-finger joint.
#[derive(Debug, Clone)]
pub struct LeftClickDetector {
    probes: [ZoneProbe; 4],
    cooldown: Cooldown,
}

impl LeftClickDetector {
    pub fn new(radii: ZoneRadii, cooldown: Duration) -> Self {
        let probes = HandLandmark::index_finger_joints().map(|joint| {
            ZoneProbe::new(HandLandmark::ThumbTip, joint, DistanceMetric::Euclidean, radii)
        });
        Self {
            probes,
            cooldown: Cooldown::new(cooldown),
        }
    }

    /// Returns true when a left click should fire this frame.
    pub fn update(&mut self, frame: &LandmarkFrame, highlights: &mut Highlights, now: Instant) -> bool {
        // Every joint up to the index tip must be present.
        if frame.get(HandLandmark::IndexTip).is_none() || !self.cooldown.ready(now) {
            return false;
        }
        // The thumb takes the strongest zone across all four joints.
        let mut thumb_zone = Zone::Far;
        let mut contact = false;
        for probe in &self.probes {
            let Some(reading) = probe.evaluate(frame) else {
                continue;
            };
            mark_zone(highlights, reading.zone, Highlight::Click, &[probe.b]);
            thumb_zone = thumb_zone.max(reading.zone);
            contact |= reading.zone.is_active();
        }
        mark_zone(highlights, thumb_zone, Highlight::Click, &[HandLandmark::ThumbTip]);

        let fired = self.cooldown.trigger(contact, now);
        if fired {
            debug!("left click contact");
        }
        fired
    }

    pub fn last_click(&self) -> Option<Instant> {
        self.cooldown.last_fire()
    }
}

// ── Right click ────────────────────────────────────────────

/// Pinky tip curled down to the wrist.
#[derive(Debug, Clone)]
pub struct RightClickDetector {
    probe: ZoneProbe,
    cooldown: Cooldown,
}

impl RightClickDetector {
    pub fn new(radii: ZoneRadii, cooldown: Duration) -> Self {
        Self {
            probe: ZoneProbe::new(
                HandLandmark::PinkyTip,
                HandLandmark::Wrist,
                DistanceMetric::Euclidean,
                radii,
            ),
            cooldown: Cooldown::new(cooldown),
        }
    }

    /// Returns true when a right click should fire this frame.
    pub fn update(&mut self, frame: &LandmarkFrame, highlights: &mut Highlights, now: Instant) -> bool {
        if !self.cooldown.ready(now) {
            return false;
        }
        let Some(reading) = self.probe.evaluate(frame) else {
            return false;
        };
        mark_zone(
            highlights,
            reading.zone,
            Highlight::Click,
            &[self.probe.a, self.probe.b],
        );
        let fired = self.cooldown.trigger(reading.zone.is_active(), now);
        if fired {
            debug!(distance = reading.distance, "right click contact");
        }
        fired
    }

    pub fn last_click(&self) -> Option<Instant> {
        self.cooldown.last_fire()
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmark::{test_hand, FrameSize, Point};

    /// Hand with the thumb tip `dist` px left of the index tip and
    /// everything else out of reach.
    fn pinch_frame(dist: i32) -> LandmarkFrame {
        let mut pts = test_hand(Point::new(600, 50));
        pts[HandLandmark::IndexMcp.index()] = Point::new(400, 400);
        pts[HandLandmark::IndexPip.index()] = Point::new(400, 350);
        pts[HandLandmark::IndexDip.index()] = Point::new(400, 300);
        pts[HandLandmark::IndexTip.index()] = Point::new(400, 250);
        pts[HandLandmark::ThumbTip.index()] = Point::new(400 - dist, 250);
        pts[HandLandmark::Wrist.index()] = Point::new(100, 450);
        LandmarkFrame::from_pixels(pts, FrameSize::new(640, 480))
    }

    fn right_frame(dist: i32) -> LandmarkFrame {
        let mut pts = test_hand(Point::new(300, 100));
        pts[HandLandmark::Wrist.index()] = Point::new(300, 400);
        pts[HandLandmark::PinkyTip.index()] = Point::new(300, 400 - dist);
        LandmarkFrame::from_pixels(pts, FrameSize::new(640, 480))
    }

    #[test]
    fn test_cooldown_gate() {
        let t0 = Instant::now();
        let mut cd = Cooldown::new(Duration::from_millis(400));
        assert!(cd.ready(t0));
        assert!(!cd.trigger(false, t0));
        assert!(cd.trigger(true, t0));
        assert!(!cd.trigger(true, t0 + Duration::from_millis(399)));
        assert!(cd.trigger(true, t0 + Duration::from_millis(400)));
    }

    #[test]
    fn test_left_click_fires_once_within_cooldown() {
        let t0 = Instant::now();
        let mut det = LeftClickDetector::new(ZoneRadii::new(20.0, 25.0), Duration::from_millis(400));
        let mut hl = Highlights::default();

        assert!(det.update(&pinch_frame(15), &mut hl, t0));
        assert_eq!(hl.get(HandLandmark::ThumbTip), Highlight::Click);
        assert_eq!(hl.get(HandLandmark::IndexTip), Highlight::Click);

        hl.reset();
        assert!(!det.update(&pinch_frame(15), &mut hl, t0 + Duration::from_millis(10)));
        assert_eq!(det.last_click(), Some(t0));
    }

    #[test]
    fn test_left_click_any_joint_counts() {
        let t0 = Instant::now();
        let mut det = LeftClickDetector::new(ZoneRadii::new(20.0, 25.0), Duration::from_millis(400));
        let mut pts = pinch_frame(200).points().to_vec();
        // Thumb resting on the middle joint only.
        pts[HandLandmark::ThumbTip.index()] = Point::new(405, 350);
        let frame = LandmarkFrame::from_pixels(pts, FrameSize::new(640, 480));
        let mut hl = Highlights::default();
        assert!(det.update(&frame, &mut hl, t0));
        assert_eq!(hl.get(HandLandmark::IndexPip), Highlight::Click);
        assert_eq!(hl.get(HandLandmark::IndexTip), Highlight::Idle);
    }

    #[test]
    fn test_left_click_hover_does_not_fire() {
        let t0 = Instant::now();
        let mut det = LeftClickDetector::new(ZoneRadii::new(20.0, 25.0), Duration::from_millis(400));
        let mut hl = Highlights::default();
        assert!(!det.update(&pinch_frame(22), &mut hl, t0));
        assert_eq!(hl.get(HandLandmark::ThumbTip), Highlight::Hover);
        assert!(det.last_click().is_none());
    }

    #[test]
    fn test_left_click_cooldown_bound() {
        // Sustained contact at 100 fps for 2s: at most ceil(2.0 / 0.4) = 5 clicks.
        let t0 = Instant::now();
        let mut det = LeftClickDetector::new(ZoneRadii::new(20.0, 25.0), Duration::from_millis(400));
        let frame = pinch_frame(5);
        let mut clicks = 0;
        for i in 0..200 {
            let mut hl = Highlights::default();
            if det.update(&frame, &mut hl, t0 + Duration::from_millis(i * 10)) {
                clicks += 1;
            }
        }
        assert_eq!(clicks, 5);
    }

    #[test]
    fn test_left_click_partial_hand() {
        let t0 = Instant::now();
        let mut det = LeftClickDetector::new(ZoneRadii::new(20.0, 25.0), Duration::from_millis(400));
        // Thumb (4) and index MCP (5) coincide, but joints 6-8 are missing.
        let frame = LandmarkFrame::from_pixels(vec![Point::new(10, 10); 6], FrameSize::new(640, 480));
        let mut hl = Highlights::default();
        assert!(!det.update(&frame, &mut hl, t0));
        assert_eq!(hl, Highlights::default());
        assert!(det.last_click().is_none());

        let frame = LandmarkFrame::from_pixels(vec![Point::new(10, 10); 9], FrameSize::new(640, 480));
        assert!(det.update(&frame, &mut hl, t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_cooling_down_detectors_leave_highlights_alone() {
        let t0 = Instant::now();
        let mut left = LeftClickDetector::new(ZoneRadii::new(20.0, 25.0), Duration::from_millis(400));
        let mut right = RightClickDetector::new(ZoneRadii::new(50.0, 60.0), Duration::from_millis(400));
        let mut hl = Highlights::default();
        assert!(left.update(&pinch_frame(5), &mut hl, t0));
        assert!(right.update(&right_frame(10), &mut hl, t0));

        let mut hl = Highlights::default();
        let later = t0 + Duration::from_millis(100);
        assert!(!left.update(&pinch_frame(5), &mut hl, later));
        assert!(!right.update(&right_frame(10), &mut hl, later));
        assert_eq!(hl, Highlights::default());
    }

    #[test]
    fn test_right_click() {
        let t0 = Instant::now();
        let mut det = RightClickDetector::new(ZoneRadii::new(50.0, 60.0), Duration::from_millis(400));
        let mut hl = Highlights::default();

        assert!(!det.update(&right_frame(55), &mut hl, t0));
        assert_eq!(hl.get(HandLandmark::PinkyTip), Highlight::Hover);

        assert!(det.update(&right_frame(40), &mut hl, t0));
        assert!(!det.update(&right_frame(40), &mut hl, t0 + Duration::from_millis(100)));
        assert!(det.update(&right_frame(40), &mut hl, t0 + Duration::from_millis(450)));
    }

    #[test]
    fn test_right_click_needs_pinky() {
        let t0 = Instant::now();
        let mut det = RightClickDetector::new(ZoneRadii::new(50.0, 60.0), Duration::from_millis(400));
        let frame = LandmarkFrame::from_pixels(vec![Point::new(10, 10); 20], FrameSize::new(640, 480));
        let mut hl = Highlights::default();
        assert!(!det.update(&frame, &mut hl, t0));
    }
}
