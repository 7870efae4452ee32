//! Timeline construction
//!
//! Turns segments into timed [`NoteEvent`]s. Every event except the last lasts until the
//! next one starts, so a [`Timeline`] covers its span without gaps or overlap. The last
//! event's duration comes from the configured [`LastDuration`] policy.

use log::debug;
use serde::{Deserialize, Serialize};

use super::segment::Segments;
use crate::config::LastDuration;
use crate::error::TranscribeError;
use crate::pitch::{note_name, parse_note_name};

/// A note, chord or rest with its timing in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pitches: Vec<u8>,
    start_time: f64,
    duration: f64,
}

impl NoteEvent {
    /// Sorted MIDI note numbers; empty for a rest.
    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn is_rest(&self) -> bool {
        self.pitches.is_empty()
    }

    /// Note names for the pitches, e.g. `["C4", "E4"]`.
    pub fn note_names(&self) -> Vec<String> {
        self.pitches.iter().map(|&p| note_name(p)).collect()
    }

    /// `start_time <= t < end_time`
    pub fn contains(&self, t: f64) -> bool {
        self.start_time <= t && t < self.end_time()
    }
}

/// Serialized form of a [`NoteEvent`], as written to a note-list document.
///
/// ```json
/// { "notes": ["C4"], "start_time": 0.0, "duration": 0.65 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub notes: Vec<String>,
    pub start_time: f64,
    pub duration: f64,
}

impl From<&NoteEvent> for NoteRecord {
    fn from(event: &NoteEvent) -> Self {
        Self {
            notes: event.note_names(),
            start_time: event.start_time,
            duration: event.duration,
        }
    }
}

/// Ordered, gap-free sequence of events. Immutable once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    events: Vec<NoteEvent>,
}

impl Timeline {
    /// The timeline of a silent recording.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// End of the last event, or 0 for an empty timeline.
    pub fn total_duration(&self) -> f64 {
        self.events.last().map_or(0.0, NoteEvent::end_time)
    }

    pub fn to_records(&self) -> Vec<NoteRecord> {
        self.events.iter().map(NoteRecord::from).collect()
    }

    /// Rebuild a timeline from a note-list document.
    ///
    /// # Errors
    /// - [`TranscribeError::UnknownNoteName`] for a name that cannot be parsed
    /// - [`TranscribeError::MalformedFrame`] if the events are out of order, overlap,
    ///   leave gaps, or have negative or non-finite timings
    pub fn from_records(records: &[NoteRecord]) -> Result<Self, TranscribeError> {
        let mut events = Vec::with_capacity(records.len());
        for record in records {
            let mut pitches = record
                .notes
                .iter()
                .map(|name| parse_note_name(name))
                .collect::<Result<Vec<u8>, _>>()?;
            pitches.sort_unstable();
            pitches.dedup();
            events.push(NoteEvent {
                pitches,
                start_time: record.start_time,
                duration: record.duration,
            });
        }
        let timeline = Self { events };
        timeline.check_invariants()?;
        Ok(timeline)
    }

    fn check_invariants(&self) -> Result<(), TranscribeError> {
        for (index, event) in self.events.iter().enumerate() {
            if !event.start_time.is_finite() || !event.duration.is_finite() || event.duration < 0.0 {
                return Err(TranscribeError::MalformedFrame {
                    index,
                    message: format!(
                        "event at {}s has invalid duration {}",
                        event.start_time, event.duration
                    ),
                });
            }
        }
        for (index, pair) in self.events.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            if next.start_time <= current.start_time {
                return Err(TranscribeError::MalformedFrame {
                    index: index + 1,
                    message: format!(
                        "event starts at {}s, not after the previous event at {}s",
                        next.start_time, current.start_time
                    ),
                });
            }
            if (current.end_time() - next.start_time).abs() > 1e-6 {
                return Err(TranscribeError::MalformedFrame {
                    index,
                    message: format!(
                        "event ends at {}s but the next event starts at {}s",
                        current.end_time(),
                        next.start_time
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Assigns start times and durations to segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineBuilder {
    last_duration: LastDuration,
}

impl TimelineBuilder {
    pub fn new(last_duration: LastDuration) -> Self {
        Self { last_duration }
    }

    /// # Errors
    /// [`TranscribeError::MalformedFrame`] if a computed duration is negative or not finite.
    pub fn build(&self, segments: &Segments) -> Result<Timeline, TranscribeError> {
        let segments = segments.segments();
        let mut events: Vec<NoteEvent> = Vec::with_capacity(segments.len());

        for (index, segment) in segments.iter().enumerate() {
            let next = segments.get(index + 1);
            let duration = match next {
                Some(next) => next.anchor - segment.anchor,
                None => match self.last_duration {
                    LastDuration::Fixed(secs) => secs,
                    LastDuration::MatchPrevious => events.last().map_or(0.0, |e| e.duration),
                    LastDuration::Zero => 0.0,
                },
            };
            // Starts strictly increase, so only the last event may last zero seconds.
            let too_short = duration < 0.0 || (next.is_some() && duration == 0.0);
            if !duration.is_finite() || too_short {
                return Err(TranscribeError::MalformedFrame {
                    index,
                    message: format!(
                        "event at {}s would have duration {}",
                        segment.anchor, duration
                    ),
                });
            }
            events.push(NoteEvent {
                pitches: segment.pitches.clone(),
                start_time: segment.anchor,
                duration,
            });
        }

        let timeline = Timeline { events };
        debug!(
            "Built timeline with {} events spanning {:.3}s",
            timeline.len(),
            timeline.total_duration()
        );
        Ok(timeline)
    }
}
