//! Time-to-event lookup for renderers
//!
//! A renderer asks "what is sounding at `t`" once per video frame. Lookup is by interval
//! containment (`start <= t < start + duration`), so events of unequal length never
//! drift. Queries never fail:
//!
//! - an empty timeline, a gap before the first event, or a NaN time is a rest
//! - times before 0 resolve to the first event
//! - times at or past the end resolve to the last event

use super::timeline::{NoteEvent, Timeline};

/// Result of a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Active<'a> {
    Notes(&'a NoteEvent),
    Rest,
}

impl<'a> Active<'a> {
    /// Active MIDI note numbers; empty for a rest.
    pub fn pitches(&self) -> &'a [u8] {
        match *self {
            Active::Notes(event) => event.pitches(),
            Active::Rest => &[],
        }
    }

    pub fn event(&self) -> Option<&'a NoteEvent> {
        match *self {
            Active::Notes(event) => Some(event),
            Active::Rest => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.pitches().is_empty()
    }
}

/// Read-only view over a built [`Timeline`].
#[derive(Debug, Clone, Copy)]
pub struct TimelineQuery<'a> {
    timeline: &'a Timeline,
}

impl<'a> TimelineQuery<'a> {
    pub fn new(timeline: &'a Timeline) -> Self {
        Self { timeline }
    }

    pub fn total_duration(&self) -> f64 {
        self.timeline.total_duration()
    }

    /// The event active at `t`.
    ///
    /// Times before 0 resolve to the first event and times at or past the end to the
    /// last one. A time inside the leading gap `[0, start)` is a rest.
    ///
    /// # Example
    /// ```rust
    /// use pitchline::{NoteRecord, Timeline, TimelineQuery};
    ///
    /// let timeline = Timeline::from_records(&[
    ///     NoteRecord { notes: vec!["C4".into()], start_time: 0.0, duration: 0.65 },
    ///     NoteRecord { notes: vec!["E4".into()], start_time: 0.65, duration: 0.25 },
    /// ])?;
    /// let query = TimelineQuery::new(&timeline);
    ///
    /// assert_eq!(query.query(0.6).pitches(), &[60]);
    /// assert_eq!(query.query(0.65).pitches(), &[64]);
    /// assert_eq!(query.query(10.0).pitches(), &[64]); // clamped to the last event
    /// # Ok::<(), pitchline::TranscribeError>(())
    /// ```
    pub fn query(&self, t: f64) -> Active<'a> {
        let events = self.timeline.events();
        let Some(last) = events.last() else {
            return Active::Rest;
        };
        if t.is_nan() {
            return Active::Rest;
        }

        if t < 0.0 {
            return Active::Notes(&events[0]);
        }
        let end = last.end_time();
        if t >= end {
            return Active::Notes(last);
        }

        // Index of the last event starting at or before `t`.
        let after = events.partition_point(|e| e.start_time() <= t);
        match after.checked_sub(1).map(|i| &events[i]) {
            Some(event) if event.contains(t) => Active::Notes(event),
            _ => Active::Rest,
        }
    }

    /// Sample the timeline at `fps` frames per second, from 0 through the end.
    ///
    /// Yields `(t, active)` for `t = k / fps`. An fps that is not a positive finite
    /// number yields nothing.
    pub fn sample(&self, fps: f64) -> impl Iterator<Item = (f64, Active<'a>)> + 'a {
        let query = *self;
        let frames = if fps.is_finite() && fps > 0.0 {
            ((self.total_duration() * fps).floor() as usize).saturating_add(1)
        } else {
            0
        };
        (0..frames).map(move |k| {
            let t = k as f64 / fps;
            (t, query.query(t))
        })
    }
}

impl Timeline {
    /// Shorthand for [`TimelineQuery::new`].
    pub fn query(&self) -> TimelineQuery<'_> {
        TimelineQuery::new(self)
    }
}
