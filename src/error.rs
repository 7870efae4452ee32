//! # Error Types
//!
//! This module defines all error types for the transcription pipeline.
//!
//! Errors fall into two groups:
//! - **Structural** (`InvalidThreshold`, `MalformedFrame`, `Config`, `Input`, `Output`)
//!   abort the build and are returned to the caller.
//! - **Per-frame** (`UnmappablePitch`, `UnknownNoteName`, `EmptyInput`) are recovered
//!   inside the pipeline: the frame becomes a rest, or the result is an empty timeline.
//!   They only surface directly from the lower-level stage functions.
//!
//! ## Usage
//! ```rust
//! use pitchline::{PipelineConfig, Threshold, Transcriber, TranscribeError};
//!
//! let mut config = PipelineConfig::melody();
//! config.threshold = Threshold::Absolute(1.5);
//!
//! match Transcriber::new(config) {
//!     Ok(_) => unreachable!(),
//!     Err(TranscribeError::InvalidThreshold { value, .. }) => assert_eq!(value, 1.5),
//!     Err(e) => panic!("unexpected error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranscribeError {
    /// The confidence threshold is non-finite or outside its range.
    ///
    /// # Example
    /// ```
    /// # use pitchline::TranscribeError;
    /// let err = TranscribeError::InvalidThreshold {
    ///     value: 1.5,
    ///     reason: "absolute threshold must lie in [0, 1]".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Invalid confidence threshold 1.5: absolute threshold must lie in [0, 1]"
    /// );
    /// ```
    #[error("Invalid confidence threshold {value}: {reason}")]
    InvalidThreshold { value: f64, reason: String },

    /// Frame times are NaN or go backwards, or a computed duration is negative.
    ///
    /// `index` is the position of the offending frame or event.
    #[error("Malformed frame at index {index}: {message}")]
    MalformedFrame { index: usize, message: String },

    /// No frame survived confidence gating.
    #[error("No frame survived confidence gating")]
    EmptyInput,

    /// A pitch value has no MIDI note number (outside 0..=127 or not finite).
    #[error("Pitch {0} cannot be mapped to a MIDI note")]
    UnmappablePitch(f64),

    /// A note name such as `"H2"` could not be parsed.
    #[error("Unknown note name: {0}")]
    UnknownNoteName(String),

    /// Invalid pipeline configuration (other than the threshold).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An input document (frames or note list) could not be parsed.
    #[error("Invalid input document: {0}")]
    Input(String),

    /// A note-list document could not be written.
    ///
    /// # Example
    /// ```
    /// # use pitchline::TranscribeError;
    /// let err = TranscribeError::Output("stream closed".to_string());
    /// assert_eq!(err.to_string(), "Could not write note list: stream closed");
    /// ```
    #[error("Could not write note list: {0}")]
    Output(String),
}
