//! # Public API
//!
//! Entry points that tie the pipeline to its document formats.
//!
//! - [`transcribe()`] - frames in, timeline out
//! - [`frames_from_json()`] - parse an estimator's frame dump
//! - [`timeline_to_json()`] / [`timeline_from_json()`] - the note-list document
//!
//! ## Typical Usage
//!
//! ```rust
//! use pitchline::{frames_from_json, timeline_to_json, transcribe, PipelineConfig};
//!
//! let frames = frames_from_json(r#"[
//!     {"time": 0.0, "pitch": 440.0, "strength": 0.95},
//!     {"time": 0.1, "pitch": 440.0, "strength": 0.93},
//!     {"time": 0.2, "pitch": null,  "strength": 0.10}
//! ]"#)?;
//!
//! let timeline = transcribe(frames, PipelineConfig::chords())?;
//! let json = timeline_to_json(&timeline)?;
//! assert!(json.contains("\"A4\""));
//! # Ok::<(), pitchline::TranscribeError>(())
//! ```

use serde::Serialize;

use crate::{NoteRecord, PipelineConfig, PitchFrame, Timeline, TranscribeError, Transcriber};

/// Run the whole pipeline once with the given configuration.
///
/// # Errors
/// Returns [`TranscribeError`] for invalid configuration or malformed frame times.
/// A stream with no confident frame is not an error; it yields an empty timeline.
pub fn transcribe(frames: Vec<PitchFrame>, config: PipelineConfig) -> Result<Timeline, TranscribeError> {
    Transcriber::new(config)?.transcribe(frames)
}

/// Parse a JSON array of `{"time", "pitch", "strength"}` objects.
///
/// `pitch` may be `null` or missing for unvoiced frames.
pub fn frames_from_json(content: &str) -> Result<Vec<PitchFrame>, TranscribeError> {
    serde_json::from_str(content).map_err(|e| TranscribeError::Input(e.to_string()))
}

/// Serialize a timeline as a note-list document, indented by four spaces.
///
/// ```json
/// [
///     {
///         "notes": ["C4"],
///         "start_time": 0.0,
///         "duration": 0.65
///     }
/// ]
/// ```
///
/// # Errors
/// Returns [`TranscribeError::Output`] if the document cannot be written.
pub fn timeline_to_json(timeline: &Timeline) -> Result<String, TranscribeError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    timeline
        .to_records()
        .serialize(&mut serializer)
        .map_err(|e| TranscribeError::Output(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TranscribeError::Output(e.to_string()))
}

/// Load a note-list document back into a timeline.
///
/// # Errors
/// - [`TranscribeError::Input`] for invalid JSON
/// - [`TranscribeError::UnknownNoteName`] for an unparsable note name
/// - [`TranscribeError::MalformedFrame`] if the events do not form a valid timeline
pub fn timeline_from_json(content: &str) -> Result<Timeline, TranscribeError> {
    let records: Vec<NoteRecord> =
        serde_json::from_str(content).map_err(|e| TranscribeError::Input(e.to_string()))?;
    Timeline::from_records(&records)
}
