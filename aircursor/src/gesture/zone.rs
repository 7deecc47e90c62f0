//! Two-radius proximity zones shared by every gesture detector.
//!
//! A pair of landmarks is Far, Hover, or Active depending on how their
//! distance compares with a hover radius and a tighter active radius.
//! Classification is stateless; highlighting is written to the frame's
//! `Highlights` as a side output.

use serde::{Deserialize, Serialize};

use super::config::ConfigError;
use super::landmark::{HandLandmark, Highlight, Highlights, LandmarkFrame};

/// Proximity zone between two landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Zone {
    /// distance >= hover radius
    Far,
    /// active radius <= distance < hover radius
    Hover,
    /// distance < active radius
    Active,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Far => "far",
            Self::Hover => "hover",
            Self::Active => "active",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// How the distance between two landmarks is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    Euclidean,
    /// Axis-sum distance; coarser but cheap enough to run every frame.
    Manhattan,
}

/// Hover and active radii for one gesture, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneRadii {
    pub active: f32,
    pub hover: f32,
}

impl ZoneRadii {
    pub const fn new(active: f32, hover: f32) -> Self {
        Self { active, hover }
    }

    pub fn classify(&self, distance: f32) -> Zone {
        if distance < self.active {
            Zone::Active
        } else if distance < self.hover {
            Zone::Hover
        } else {
            Zone::Far
        }
    }

    /// Both radii positive and finite, hover strictly wider than active.
    pub fn validate(&self, gesture: &'static str) -> Result<(), ConfigError> {
        if !(self.active.is_finite() && self.hover.is_finite())
            || self.active <= 0.0
            || self.hover <= 0.0
        {
            return Err(ConfigError::NonPositiveRadius { gesture });
        }
        if self.hover <= self.active {
            return Err(ConfigError::HoverNotWider {
                gesture,
                active: self.active,
                hover: self.hover,
            });
        }
        Ok(())
    }
}

/// Result of probing one landmark pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneReading {
    pub zone: Zone,
    pub distance: f32,
}

/// A landmark pair with the metric and radii used to classify it.
#[derive(Debug, Clone, Copy)]
pub struct ZoneProbe {
    pub a: HandLandmark,
    pub b: HandLandmark,
    pub metric: DistanceMetric,
    pub radii: ZoneRadii,
}

impl ZoneProbe {
    pub fn new(a: HandLandmark, b: HandLandmark, metric: DistanceMetric, radii: ZoneRadii) -> Self {
        Self { a, b, metric, radii }
    }

    /// Classify the pair. `None` when the frame lacks either landmark.
    pub fn evaluate(&self, frame: &LandmarkFrame) -> Option<ZoneReading> {
        let pa = frame.get(self.a)?;
        let pb = frame.get(self.b)?;
        let distance = match self.metric {
            DistanceMetric::Euclidean => pa.euclidean_distance(&pb),
            DistanceMetric::Manhattan => pa.manhattan_distance(&pb),
        };
        Some(ZoneReading {
            zone: self.radii.classify(distance),
            distance,
        })
    }
}

/// Tag `landmarks` for the overlay: Hover in the hover band, `active_tag`
/// in the active band, untouched when far.
pub fn mark_zone(
    highlights: &mut Highlights,
    zone: Zone,
    active_tag: Highlight,
    landmarks: &[HandLandmark],
) {
    let tag = match zone {
        Zone::Far => return,
        Zone::Hover => Highlight::Hover,
        Zone::Active => active_tag,
    };
    for lm in landmarks {
        highlights.set(*lm, tag);
    }
}

// ── Tests ──────────────────────────────────────────────────
