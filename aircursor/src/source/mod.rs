//! Landmark sources: the boundary to the external hand-pose estimator.
//!
//! A source turns a video frame into at most one hand's normalized
//! landmarks. Errors stop at the tracker, which treats them as "no hand"
//! for that frame.

pub mod replay;

pub use replay::ReplaySource;

use thiserror::Error;

use crate::gesture::landmark::{FrameSize, NormalizedPoint};

/// A captured video frame. Pixel data is opaque to the gesture core.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub size: FrameSize,
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Frame with no pixel data, for sources that ignore the image.
    pub fn blank(size: FrameSize) -> Self {
        Self {
            size,
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("landmark detection failed: {0}")]
    Detection(String),
    #[error("landmark source io: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad landmark record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("landmark source is closed")]
    Closed,
}

/// Produces one hand's landmarks per frame.
pub trait LandmarkSource: Send {
    /// Landmarks for `frame`, or `Ok(None)` when no hand is visible.
    fn detect(&mut self, frame: &VideoFrame) -> Result<Option<Vec<NormalizedPoint>>, SourceError>;

    /// True once the source has nothing more to give.
    fn is_exhausted(&self) -> bool {
        false
    }

    /// Release the underlying model or file. Called once on shutdown.
    fn close(&mut self) {}
}

/// Scripted source for tests: pops one result per frame, then reports no hand.
#[cfg(test)]
pub(crate) struct ScriptedSource {
    pub(crate) frames: std::collections::VecDeque<Result<Option<Vec<NormalizedPoint>>, SourceError>>,
    pub(crate) closed: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(
        frames: Vec<Result<Option<Vec<NormalizedPoint>>, SourceError>>,
    ) -> Self {
        Self {
            frames: frames.into(),
            closed: Default::default(),
        }
    }
}

#[cfg(test)]
impl LandmarkSource for ScriptedSource {
    fn detect(&mut self, _frame: &VideoFrame) -> Result<Option<Vec<NormalizedPoint>>, SourceError> {
        self.frames.pop_front().unwrap_or(Ok(None))
    }

    fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }

    fn close(&mut self) {
        self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}
