//! Confidence gating
//!
//! Drops frames whose strength does not exceed the threshold.

use log::debug;

use crate::config::{validate_threshold, Threshold};
use crate::error::TranscribeError;
use crate::frame::{FrameStream, PitchFrame};

/// Frames that passed the confidence gate, in their original order.
#[derive(Debug, Clone, PartialEq)]
pub struct GatedFrames {
    frames: Vec<PitchFrame>,
    threshold: f64,
}

impl GatedFrames {
    pub fn frames(&self) -> &[PitchFrame] {
        &self.frames
    }

    /// The resolved threshold the frames were gated with.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Validated confidence gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    threshold: Threshold,
}

impl ConfidenceGate {
    /// # Errors
    /// [`TranscribeError::InvalidThreshold`] if the threshold is non-finite or out of range.
    pub fn new(threshold: Threshold) -> Result<Self, TranscribeError> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    /// Resolve the numeric threshold for a given stream.
    pub fn resolve(&self, stream: &FrameStream) -> f64 {
        match self.threshold {
            Threshold::Absolute(value) => value,
            Threshold::MedianScaled(multiplier) => {
                let strengths: Vec<f64> = stream
                    .frames()
                    .iter()
                    .map(|f| f.strength)
                    .filter(|s| !s.is_nan())
                    .collect();
                median(&strengths).map_or(0.0, |m| m * multiplier)
            }
        }
    }

    /// Keep frames with `strength > threshold`. May return an empty set.
    pub fn apply(&self, stream: &FrameStream) -> GatedFrames {
        let threshold = self.resolve(stream);
        let frames: Vec<PitchFrame> = stream
            .frames()
            .iter()
            .filter(|f| f.strength > threshold)
            .copied()
            .collect();
        debug!(
            "Confidence gate kept {} of {} frames (threshold {:.3})",
            frames.len(),
            stream.len(),
            threshold
        );
        GatedFrames { frames, threshold }
    }

    /// Like [`apply`](Self::apply), but reports an empty result as
    /// [`TranscribeError::EmptyInput`].
    pub fn apply_strict(&self, stream: &FrameStream) -> Result<GatedFrames, TranscribeError> {
        let gated = self.apply(stream);
        if gated.frames.is_empty() {
            return Err(TranscribeError::EmptyInput);
        }
        Ok(gated)
    }
}

/// Median of a slice; the mean of the two middle values for even lengths.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
