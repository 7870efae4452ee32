//! # Transcription Pipeline
//!
//! Turns an estimator's frame stream into a [`Timeline`] of notes or chords.
//!
//! ## Stages
//! ```text
//! FrameStream -> ConfidenceGate -> PitchSmoother -> EventSegmenter -> TimelineBuilder -> Timeline
//! ```
//!
//! Each stage takes the previous stage's output type and returns a new one
//! ([`GatedFrames`], [`SmoothedFrames`], [`Segments`], [`Timeline`]), so stages cannot run
//! out of order and nothing is mutated in place.
//!
//! ## Sub-modules
//! - `gate` - Confidence threshold
//! - `smooth` - MIDI conversion and median filter
//! - `segment` - Grouping frames into events (melody or chord selection)
//! - `timeline` - Start times, durations and the note-list format
//! - `query` - Time-to-event lookup for renderers
//!
//! ## Example
//! ```rust
//! use pitchline::{PipelineConfig, PitchFrame, Transcriber};
//!
//! let frames = vec![
//!     PitchFrame::new(0.0, Some(261.63), 0.9),
//!     PitchFrame::new(0.1, Some(261.63), 0.9),
//!     PitchFrame::new(0.2, Some(261.63), 0.9),
//!     PitchFrame::new(0.3, Some(329.63), 0.2), // low confidence, dropped
//! ];
//!
//! let timeline = Transcriber::new(PipelineConfig::chords())?.transcribe(frames)?;
//! assert_eq!(timeline.events()[0].note_names(), vec!["C4"]);
//! # Ok::<(), pitchline::TranscribeError>(())
//! ```

mod gate;
mod query;
mod segment;
mod smooth;
mod timeline;

#[cfg(test)]
mod tests;

pub use gate::{ConfidenceGate, GatedFrames};
pub use query::{Active, TimelineQuery};
pub use segment::{EventSegmenter, Segment, Segments};
pub use smooth::{PitchSmoother, SmoothedFrame, SmoothedFrames};
pub use timeline::{NoteEvent, NoteRecord, Timeline, TimelineBuilder};

use log::{debug, info};

use crate::config::PipelineConfig;
use crate::error::TranscribeError;
use crate::frame::{FrameStream, PitchFrame};

/// The full pipeline, configured once.
///
/// Holds no mutable state: one `Transcriber` can process any number of recordings,
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct Transcriber {
    gate: ConfidenceGate,
    smoother: PitchSmoother,
    segmenter: EventSegmenter,
    builder: TimelineBuilder,
}

impl Transcriber {
    /// Validate the configuration and assemble the stages.
    ///
    /// # Errors
    /// - [`TranscribeError::InvalidThreshold`] for a bad confidence threshold
    /// - [`TranscribeError::Config`] for any other invalid value
    pub fn new(config: PipelineConfig) -> Result<Self, TranscribeError> {
        config.validate()?;
        Ok(Self {
            gate: ConfidenceGate::new(config.threshold)?,
            smoother: PitchSmoother::new(config.smoothing_width, config.pitch_scale),
            segmenter: EventSegmenter::new(config.grouping_interval, config.selection),
            builder: TimelineBuilder::new(config.last_duration),
        })
    }

    /// Run every stage over one recording's frames.
    ///
    /// A stream where no frame passes the confidence gate is silence, not a failure:
    /// the result is an empty timeline.
    ///
    /// # Errors
    /// [`TranscribeError::MalformedFrame`] if frame times are not finite or go backwards.
    pub fn transcribe(&self, frames: Vec<PitchFrame>) -> Result<Timeline, TranscribeError> {
        let stream = FrameStream::new(frames)?;
        self.transcribe_stream(&stream)
    }

    pub fn transcribe_stream(&self, stream: &FrameStream) -> Result<Timeline, TranscribeError> {
        debug!("Transcribing {} frames", stream.len());

        let gated = match self.gate.apply_strict(stream) {
            Ok(gated) => gated,
            Err(TranscribeError::EmptyInput) => {
                info!("No frame passed the confidence gate, returning an empty timeline");
                return Ok(Timeline::empty());
            }
            Err(e) => return Err(e),
        };

        let smoothed = self.smoother.apply(&gated);
        let segments = self.segmenter.apply(&smoothed);
        self.builder.build(&segments)
    }
}
