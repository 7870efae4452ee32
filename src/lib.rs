//! # pitchline
//!
//! Turns the frame-by-frame output of a pitch estimator (time, pitch, confidence) into a
//! timeline of notes or chords, and answers "what is playing at time `t`" for renderers
//! that draw one video frame at a time.
//!
//! Decoding audio and estimating pitch happen before this crate runs; drawing notation
//! and encoding video happen after. See [`pipeline`] for the stages in between.

pub mod api;
pub mod config;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod pitch;

pub use api::{frames_from_json, timeline_from_json, timeline_to_json, transcribe};
pub use config::{LastDuration, PipelineConfig, PitchScale, SelectionPolicy, Threshold};
pub use error::*;
pub use frame::{FrameStream, PitchFrame};
pub use pipeline::{Active, NoteEvent, NoteRecord, Timeline, TimelineQuery, Transcriber};
