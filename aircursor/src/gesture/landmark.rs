//! Hand landmark layout and per-frame landmark snapshots.
//!
//! Models the 21-point hand layout produced by the external pose estimator.
//! Points arrive normalized (0.0-1.0) and are converted to integer frame
//! pixels once per frame; every detector works in pixel space.

use serde::{Deserialize, Serialize};

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in the estimator's fixed anatomical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Landmarks drawn on the diagnostic overlay.
pub const TRACKED_LANDMARKS: [HandLandmark; 10] = [
    HandLandmark::Wrist,
    HandLandmark::ThumbIp,
    HandLandmark::ThumbTip,
    HandLandmark::IndexMcp,
    HandLandmark::IndexPip,
    HandLandmark::IndexDip,
    HandLandmark::IndexTip,
    HandLandmark::MiddleMcp,
    HandLandmark::MiddleTip,
    HandLandmark::PinkyTip,
];

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for logging and status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// The four index-finger joints, base to tip.
    pub fn index_finger_joints() -> [HandLandmark; 4] {
        [Self::IndexMcp, Self::IndexPip, Self::IndexDip, Self::IndexTip]
    }
}

// ── Geometry ───────────────────────────────────────────────

/// A landmark position as reported by the estimator, normalized to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A position in frame or screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in pixels.
    pub fn euclidean_distance(&self, other: &Point) -> f32 {
        let (dx, dy) = self.delta(other);
        let (dx, dy) = (dx as f64, dy as f64);
        (dx * dx + dy * dy).sqrt() as f32
    }

    /// Axis-sum distance in pixels.
    pub fn manhattan_distance(&self, other: &Point) -> f32 {
        let (dx, dy) = self.delta(other);
        (dx.abs() + dy.abs()) as f32
    }

    /// Per-axis difference, widened so extreme coordinates cannot overflow.
    fn delta(&self, other: &Point) -> (i64, i64) {
        (
            other.x as i64 - self.x as i64,
            other.y as i64 - self.y as i64,
        )
    }
}

/// Width and height of a frame or a screen, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a "WxH" string. Returns None for malformed or zero sizes.
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.split_once('x')?;
        let width = w.trim().parse::<u32>().ok()?;
        let height = h.trim().parse::<u32>().ok()?;
        if width > 0 && height > 0 {
            Some(Self { width, height })
        } else {
            None
        }
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ── Highlights ─────────────────────────────────────────────

/// Diagnostic highlight tag for one landmark on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Idle,
    Hover,
    Click,
    Hold,
    Scroll,
}

impl Highlight {
    /// Overlay color as (r, g, b).
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Idle => (0, 255, 0),
            Self::Hover => (255, 255, 0),
            Self::Click => (0, 0, 255),
            Self::Hold => (255, 0, 0),
            Self::Scroll => (255, 0, 255),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Hover => "hover",
            Self::Click => "click",
            Self::Hold => "hold",
            Self::Scroll => "scroll",
        }
    }
}

/// Per-landmark highlight tags for one frame. Later writes win.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Highlights {
    tags: [Highlight; LANDMARK_COUNT],
}

impl Highlights {
    pub fn set(&mut self, landmark: HandLandmark, tag: Highlight) {
        self.tags[landmark.index()] = tag;
    }

    pub fn get(&self, landmark: HandLandmark) -> Highlight {
        self.tags[landmark.index()]
    }

    pub fn reset(&mut self) {
        self.tags = [Highlight::Idle; LANDMARK_COUNT];
    }
}

// ── Landmark frame ─────────────────────────────────────────

/// One hand's landmarks for a single processing cycle, in frame pixels.
///
/// A partially reported hand is kept as-is; lookups past the end return
/// `None` and each detector decides what a missing landmark means.
#[derive(Debug, Clone)]
pub struct LandmarkFrame {
    points: Vec<Point>,
    size: FrameSize,
}

impl LandmarkFrame {
    /// Convert normalized estimator output into frame pixels.
    ///
    /// With `mirror` set, x is flipped so the image reads like a mirror and
    /// moving the hand right moves the cursor right. Pixels are clamped to
    /// one frame width or height beyond each edge.
    pub fn from_normalized(points: &[NormalizedPoint], size: FrameSize, mirror: bool) -> Self {
        fn to_pixel(n: f32, extent: u32) -> i32 {
            let extent = extent as f32;
            (n * extent).clamp(-extent, 2.0 * extent) as i32
        }
        let points = points
            .iter()
            .take(LANDMARK_COUNT)
            .map(|p| {
                let nx = if mirror { 1.0 - p.x } else { p.x };
                Point::new(to_pixel(nx, size.width), to_pixel(p.y, size.height))
            })
            .collect();
        Self { points, size }
    }

    /// Build directly from pixel points.
    pub fn from_pixels(points: Vec<Point>, size: FrameSize) -> Self {
        Self { points, size }
    }

    pub fn get(&self, landmark: HandLandmark) -> Option<Point> {
        self.points.get(landmark.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Map a frame-space point to screen space by per-axis linear
/// interpolation, clamped to the screen.
pub fn map_to_screen(point: Point, frame: FrameSize, screen: FrameSize) -> Point {
    fn interp(v: i32, from: u32, to: u32) -> i32 {
        if from == 0 {
            return 0;
        }
        let t = (v as f64 / from as f64).clamp(0.0, 1.0);
        (t * to as f64) as i32
    }
    Point::new(
        interp(point.x, frame.width, screen.width),
        interp(point.y, frame.height, screen.height),
    )
}

/// Create a full hand with every landmark at the same pixel.
#[cfg(test)]
pub(crate) fn test_hand(at: Point) -> Vec<Point> {
    vec![at; LANDMARK_COUNT]
}

// ── Tests ──────────────────────────────────────────────────
