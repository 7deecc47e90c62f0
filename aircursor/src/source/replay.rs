//! Replay of recorded landmark frames from a JSON Lines file.
//!
//! One record per line:
//! - `[[x, y], ...]`: normalized landmarks of the visible hand
//! - `null`: no hand in this frame
//! - `"error"`: the estimator failed on this frame
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::{LandmarkSource, SourceError, VideoFrame};
use crate::gesture::landmark::NormalizedPoint;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Record {
    Hand(Vec<[f32; 2]>),
    Marker(String),
}

#[derive(Debug, Clone)]
enum Frame {
    Hand(Vec<NormalizedPoint>),
    NoHand,
    Failure(String),
}

pub struct ReplaySource {
    frames: Vec<Frame>,
    cursor: usize,
    looping: bool,
    closed: bool,
}

impl ReplaySource {
    /// Load every record up front so malformed files fail at startup.
    pub fn open(path: &Path, looping: bool) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let source = Self::from_reader(BufReader::new(file), looping)?;
        info!(
            path = %path.display(),
            frames = source.frames.len(),
            looping,
            "replay source loaded"
        );
        Ok(source)
    }

    pub fn from_reader(reader: impl BufRead, looping: bool) -> Result<Self, SourceError> {
        let mut frames = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let record: Option<Record> = serde_json::from_str(trimmed)
                .map_err(|source| SourceError::Parse { line: i + 1, source })?;
            frames.push(match record {
                None => Frame::NoHand,
                Some(Record::Hand(points)) => Frame::Hand(
                    points
                        .into_iter()
                        .map(|[x, y]| NormalizedPoint::new(x, y))
                        .collect(),
                ),
                Some(Record::Marker(m)) => Frame::Failure(m),
            });
        }
        Ok(Self {
            frames,
            cursor: 0,
            looping,
            closed: false,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkSource for ReplaySource {
    fn detect(&mut self, _frame: &VideoFrame) -> Result<Option<Vec<NormalizedPoint>>, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(None);
            }
            debug!("replay rewound");
            self.cursor = 0;
        }
        let frame = &self.frames[self.cursor];
        self.cursor += 1;
        match frame {
            Frame::Hand(points) => Ok(Some(points.clone())),
            Frame::NoHand => Ok(None),
            Frame::Failure(reason) => Err(SourceError::Detection(reason.clone())),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.closed || (!self.looping && self.cursor >= self.frames.len())
    }

    fn close(&mut self) {
        if !self.closed {
            debug!(played = self.cursor, "replay source closed");
        }
        self.closed = true;
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmark::FrameSize;
    use std::io::Cursor;

    fn blank() -> VideoFrame {
        VideoFrame::blank(FrameSize::new(640, 480))
    }

    const SCRIPT: &str = "# recorded session\n[[0.1, 0.2], [0.3, 0.4]]\n\nnull\n\"error\"\n";

    #[test]
    fn test_replay_records() {
        let mut src = ReplaySource::from_reader(Cursor::new(SCRIPT), false).unwrap();
        assert_eq!(src.len(), 3);

        let hand = src.detect(&blank()).unwrap().unwrap();
        assert_eq!(hand, vec![NormalizedPoint::new(0.1, 0.2), NormalizedPoint::new(0.3, 0.4)]);
        assert!(src.detect(&blank()).unwrap().is_none());
        assert!(matches!(src.detect(&blank()), Err(SourceError::Detection(m)) if m == "error"));
        assert!(src.is_exhausted());
        assert!(src.detect(&blank()).unwrap().is_none());
    }

    #[test]
    fn test_replay_loops() {
        let mut src = ReplaySource::from_reader(Cursor::new("null\n[[0.5, 0.5]]\n"), true).unwrap();
        assert!(src.detect(&blank()).unwrap().is_none());
        assert!(src.detect(&blank()).unwrap().is_some());
        assert!(!src.is_exhausted());
        assert!(src.detect(&blank()).unwrap().is_none());
    }

    #[test]
    fn test_replay_parse_error_line() {
        let err = ReplaySource::from_reader(Cursor::new("null\n[[0.1]]\n"), false)
            .err()
            .unwrap();
        assert!(matches!(err, SourceError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_replay_closed() {
        let mut src = ReplaySource::from_reader(Cursor::new("null\n"), true).unwrap();
        src.close();
        assert!(src.is_exhausted());
        assert!(matches!(src.detect(&blank()), Err(SourceError::Closed)));
    }
}
