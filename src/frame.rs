//! Frame stream input
//!
//! A [`PitchFrame`] is one measurement from the external pitch estimator. A
//! [`FrameStream`] is the validated, time-ordered sequence the pipeline consumes.

use serde::{Deserialize, Serialize};

use crate::error::TranscribeError;

/// One estimator frame.
///
/// - `time`: seconds from the start of the recording
/// - `pitch`: estimated pitch (Hz or MIDI, see [`PitchScale`](crate::PitchScale)), `None` when unvoiced
/// - `strength`: confidence or magnitude reported by the estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchFrame {
    pub time: f64,
    #[serde(default)]
    pub pitch: Option<f64>,
    pub strength: f64,
}

impl PitchFrame {
    pub fn new(time: f64, pitch: Option<f64>, strength: f64) -> Self {
        Self {
            time,
            pitch,
            strength,
        }
    }
}

/// A frame sequence whose times are finite and non-decreasing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameStream {
    frames: Vec<PitchFrame>,
}

impl FrameStream {
    /// Validate and take ownership of a frame sequence.
    ///
    /// # Errors
    /// [`TranscribeError::MalformedFrame`] if a time is NaN or infinite, or smaller
    /// than the time of the frame before it.
    pub fn new(frames: Vec<PitchFrame>) -> Result<Self, TranscribeError> {
        let mut previous: Option<f64> = None;
        for (index, frame) in frames.iter().enumerate() {
            if !frame.time.is_finite() {
                return Err(TranscribeError::MalformedFrame {
                    index,
                    message: format!("frame time {} is not finite", frame.time),
                });
            }
            if let Some(prev) = previous {
                if frame.time < prev {
                    return Err(TranscribeError::MalformedFrame {
                        index,
                        message: format!(
                            "frame time {} goes backwards (previous frame at {})",
                            frame.time, prev
                        ),
                    });
                }
            }
            previous = Some(frame.time);
        }
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[PitchFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
