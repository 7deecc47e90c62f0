//! Tracker configuration: radii, timings, and scroll tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::landmark::FrameSize;
use super::zone::ZoneRadii;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{gesture}: radii must be positive and finite")]
    NonPositiveRadius { gesture: &'static str },
    #[error("{gesture}: hover radius {hover} must be wider than active radius {active}")]
    HoverNotWider {
        gesture: &'static str,
        active: f32,
        hover: f32,
    },
    #[error("{field} must be a finite, non-negative number of milliseconds (got {value})")]
    InvalidDuration { field: &'static str, value: f64 },
    #[error("scroll interval must be greater than zero")]
    ZeroScrollInterval,
    #[error("scroll speed must be positive (got {0})")]
    NonPositiveScrollSpeed(i32),
    #[error("scroll dead band must not be negative (got {0})")]
    NegativeDeadBand(i32),
}

/// Configuration for gesture detection and pointer dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum time (ms) between two clicks of the same button.
    pub cooldown_ms: f64,
    /// Thumb tip against the index joints.
    pub click: ZoneRadii,
    /// Pinky tip against the wrist.
    pub right_click: ZoneRadii,
    /// Thumb tip against index tip.
    pub hold: ZoneRadii,
    /// Index tip against middle tip (axis-sum distance).
    pub scroll: ZoneRadii,
    /// Wheel units per scroll actuation.
    pub scroll_speed: i32,
    /// Time (ms) between scroll actuations while the gesture is held.
    pub scroll_interval_ms: f64,
    /// Vertical dead band (px) around the middle-finger base.
    pub scroll_dead_band_px: i32,
    /// Advisory minimum hold (ms). Logged on release, never gates it.
    pub min_hold_ms: f64,
    /// Flip landmarks horizontally before use.
    pub mirror: bool,
    /// Screen size override; queried from the pointer backend when unset.
    pub screen: Option<FrameSize>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 400.0,
            click: ZoneRadii::new(20.0, 25.0),
            right_click: ZoneRadii::new(50.0, 60.0),
            hold: ZoneRadii::new(30.0, 35.0),
            scroll: ZoneRadii::new(25.0, 30.0),
            scroll_speed: 60,
            scroll_interval_ms: 100.0,
            scroll_dead_band_px: 15,
            min_hold_ms: 100.0,
            mirror: true,
            screen: None,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.click.validate("click")?;
        self.right_click.validate("right-click")?;
        self.hold.validate("hold")?;
        self.scroll.validate("scroll")?;
        millis("cooldown_ms", self.cooldown_ms)?;
        millis("min_hold_ms", self.min_hold_ms)?;
        if millis("scroll_interval_ms", self.scroll_interval_ms)?.is_zero() {
            return Err(ConfigError::ZeroScrollInterval);
        }
        if self.scroll_speed <= 0 {
            return Err(ConfigError::NonPositiveScrollSpeed(self.scroll_speed));
        }
        if self.scroll_dead_band_px < 0 {
            return Err(ConfigError::NegativeDeadBand(self.scroll_dead_band_px));
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Result<Duration, ConfigError> {
        millis("cooldown_ms", self.cooldown_ms)
    }

    pub fn scroll_interval(&self) -> Result<Duration, ConfigError> {
        millis("scroll_interval_ms", self.scroll_interval_ms)
    }

    pub fn min_hold(&self) -> Result<Duration, ConfigError> {
        millis("min_hold_ms", self.min_hold_ms)
    }
}

fn millis(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidDuration { field, value });
    }
    Ok(Duration::from_secs_f64(value / 1000.0))
}

// ── Tests ──────────────────────────────────────────────────
