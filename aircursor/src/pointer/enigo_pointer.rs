//! OS pointer injection through enigo.
//!
//! Injection failures are logged and swallowed. Scrolling is converted to
//! wheel notches with a per-platform scale; if the batched scroll is
//! rejected it falls back to one notch per call.

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::PointerActuator;
use crate::gesture::landmark::FrameSize;

/// Scroll units per wheel notch.
#[cfg(target_os = "windows")]
const UNITS_PER_NOTCH: i32 = 120; // WHEEL_DELTA
#[cfg(target_os = "macos")]
const UNITS_PER_NOTCH: i32 = 10;
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const UNITS_PER_NOTCH: i32 = 20;

/// Screen size used when the display cannot be queried.
const FALLBACK_SCREEN: FrameSize = FrameSize {
    width: 1920,
    height: 1080,
};

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("failed to connect to the input backend: {0}")]
    Connect(String),
}

pub struct EnigoPointer {
    enigo: Mutex<Enigo>,
    screen: FrameSize,
}

impl EnigoPointer {
    pub fn new() -> Result<Self, ActuatorError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| ActuatorError::Connect(e.to_string()))?;
        let screen = match enigo.main_display() {
            Ok((w, h)) if w > 0 && h > 0 => FrameSize::new(w as u32, h as u32),
            Ok(_) | Err(_) => {
                warn!(fallback = %FALLBACK_SCREEN, "could not query main display size");
                FALLBACK_SCREEN
            }
        };
        info!(%screen, "enigo pointer ready");
        Ok(Self {
            enigo: Mutex::new(enigo),
            screen,
        })
    }

    fn button(&self, button: Button, direction: Direction, what: &'static str) {
        if let Err(e) = self.enigo.lock().button(button, direction) {
            warn!(error = %e, "{what} failed");
        }
    }
}

/// Wheel notches for a scroll amount; never zero for a non-zero amount.
/// enigo scrolls content down for positive lengths, so the sign flips.
fn notches(amount: i32) -> i32 {
    if amount == 0 {
        return 0;
    }
    let n = (amount.abs() / UNITS_PER_NOTCH).max(1);
    if amount > 0 {
        -n
    } else {
        n
    }
}

impl PointerActuator for EnigoPointer {
    fn name(&self) -> &'static str {
        "enigo"
    }

    fn screen_size(&self) -> FrameSize {
        self.screen
    }

    fn move_cursor(&self, x: i32, y: i32) {
        if let Err(e) = self.enigo.lock().move_mouse(x, y, Coordinate::Abs) {
            debug!(error = %e, x, y, "cursor move failed");
        }
    }

    fn click_left(&self) {
        self.button(Button::Left, Direction::Click, "left click");
    }

    fn click_right(&self) {
        self.button(Button::Right, Direction::Click, "right click");
    }

    fn mouse_down(&self) {
        self.button(Button::Left, Direction::Press, "mouse down");
    }

    fn mouse_up(&self) {
        self.button(Button::Left, Direction::Release, "mouse up");
    }

    fn scroll(&self, amount: i32) {
        let length = notches(amount);
        if length == 0 {
            return;
        }
        let mut enigo = self.enigo.lock();
        if let Err(e) = enigo.scroll(length, Axis::Vertical) {
            warn!(error = %e, length, "batched scroll failed, stepping");
            let step = length.signum();
            for _ in 0..length.abs() {
                if let Err(e) = enigo.scroll(step, Axis::Vertical) {
                    warn!(error = %e, "scroll step failed");
                    break;
                }
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notches_sign_and_floor() {
        assert_eq!(notches(0), 0);
        assert!(notches(60) < 0);
        assert!(notches(-60) > 0);
        assert_eq!(notches(1).abs(), 1);
        assert_eq!(notches(UNITS_PER_NOTCH * 3).abs(), 3);
    }
}
