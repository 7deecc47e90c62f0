//! Pointer actuators: where gestures become OS input.
//!
//! Provides:
//! - `PointerActuator`: the interface the gesture core drives
//! - `LogPointer`: traces every call, always available
//! - `EnigoPointer`: real injection via enigo (gated behind `enigo` feature)
//!
//! Calls are fire-and-forget. Implementations handle their own failures and
//! never report them back to the caller.

#[cfg(feature = "enigo")]
pub mod enigo_pointer;

#[cfg(feature = "enigo")]
pub use enigo_pointer::EnigoPointer;

use tracing::info;

use crate::gesture::landmark::FrameSize;

/// OS pointer operations used by the gesture core.
///
/// Shared between the frame path and the scroll loop, so every method takes
/// `&self`. A redundant `mouse_up` must be harmless.
pub trait PointerActuator: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;
    /// Size of the screen cursor coordinates map onto.
    fn screen_size(&self) -> FrameSize;
    fn move_cursor(&self, x: i32, y: i32);
    fn click_left(&self);
    fn click_right(&self);
    fn mouse_down(&self);
    fn mouse_up(&self);
    /// Positive scrolls up, negative scrolls down.
    fn scroll(&self, amount: i32);
}

/// Pointer backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Log,
    Enigo,
}

impl PointerKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "log" => Some(Self::Log),
            "enigo" => Some(Self::Enigo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Enigo => "enigo",
        }
    }
}

// ── Log pointer ────────────────────────────────────────────

/// Pointer that only logs. Used for dry runs and replay sessions.
#[derive(Debug, Clone)]
pub struct LogPointer {
    screen: FrameSize,
}

impl Default for LogPointer {
    fn default() -> Self {
        Self {
            screen: FrameSize::new(1920, 1080),
        }
    }
}

impl LogPointer {
    pub fn new(screen: FrameSize) -> Self {
        info!(%screen, "pointer injection disabled, logging actions only");
        Self { screen }
    }
}

impl PointerActuator for LogPointer {
    fn name(&self) -> &'static str {
        "log"
    }

    fn screen_size(&self) -> FrameSize {
        self.screen
    }

    fn move_cursor(&self, x: i32, y: i32) {
        tracing::trace!(x, y, "move cursor");
    }

    fn click_left(&self) {
        info!("left click");
    }

    fn click_right(&self) {
        info!("right click");
    }

    fn mouse_down(&self) {
        info!("mouse down");
    }

    fn mouse_up(&self) {
        info!("mouse up");
    }

    fn scroll(&self, amount: i32) {
        info!(amount, "scroll");
    }
}

// ── Recording pointer ──────────────────────────────────────

/// One recorded pointer call.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointerCall {
    Move(i32, i32),
    ClickLeft,
    ClickRight,
    MouseDown,
    MouseUp,
    Scroll(i32),
}

/// Test double recording every call in order.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingPointer {
    calls: parking_lot::Mutex<Vec<PointerCall>>,
}

#[cfg(test)]
impl RecordingPointer {
    pub(crate) fn calls(&self) -> Vec<PointerCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&PointerCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn clear(&self) {
        self.calls.lock().clear();
    }

    fn push(&self, call: PointerCall) {
        self.calls.lock().push(call);
    }
}

#[cfg(test)]
impl PointerActuator for RecordingPointer {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn screen_size(&self) -> FrameSize {
        FrameSize::new(1920, 1080)
    }

    fn move_cursor(&self, x: i32, y: i32) {
        self.push(PointerCall::Move(x, y));
    }

    fn click_left(&self) {
        self.push(PointerCall::ClickLeft);
    }

    fn click_right(&self) {
        self.push(PointerCall::ClickRight);
    }

    fn mouse_down(&self) {
        self.push(PointerCall::MouseDown);
    }

    fn mouse_up(&self) {
        self.push(PointerCall::MouseUp);
    }

    fn scroll(&self, amount: i32) {
        self.push(PointerCall::Scroll(amount));
    }
}

// ── Tests ──────────────────────────────────────────────────
