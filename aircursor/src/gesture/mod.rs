//! Gesture core: hand landmarks in, pointer actions out.
//!
//! Provides:
//! - `landmark`: landmark indices, pixel frames, overlay highlights
//! - `zone`: two-radius hysteresis classification of landmark pairs
//! - `click`: cooldown-debounced left and right click detectors
//! - `hold`: click-and-hold latch
//! - `scroll`: scroll detection and the background scroll loop
//! - `tracker`: per-frame coordinator owning all of the above

pub mod click;
pub mod config;
pub mod hold;
pub mod landmark;
pub mod scroll;
pub mod tracker;
pub mod zone;

pub use config::{ConfigError, TrackerConfig};
pub use landmark::{FrameSize, HandLandmark, Highlight, NormalizedPoint, Point};
pub use tracker::{FrameReport, GestureEvent, HandTracker, TrackerError};
