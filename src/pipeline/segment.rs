//! Event segmentation
//!
//! Groups smoothed frames into events. A group starts at its first frame (the anchor)
//! and takes every following frame whose time is within `grouping_interval` seconds of
//! that anchor. The selection policy then turns each group into a pitch set:
//!
//! - **Melody**: the most frequent note of the group. Ties go to the lowest note.
//! - **Chord**: every distinct note of the group, ascending.
//!
//! A group without any voiced frame becomes a rest (empty pitch set).

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use super::gate::median;
use super::smooth::SmoothedFrames;
use crate::config::SelectionPolicy;
use crate::pitch::note_number;

/// One group of frames, not yet given a duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Time of the first frame in the group.
    pub anchor: f64,
    /// Sorted MIDI note numbers; empty for a rest.
    pub pitches: Vec<u8>,
}

/// Output of the segmentation stage, ordered by anchor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segments {
    segments: Vec<Segment>,
}

impl Segments {
    /// Wrap segments grouped elsewhere. Ordering is checked when the timeline is built.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSegmenter {
    grouping_interval: f64,
    selection: SelectionPolicy,
}

impl EventSegmenter {
    pub fn new(grouping_interval: f64, selection: SelectionPolicy) -> Self {
        Self {
            grouping_interval,
            selection,
        }
    }

    pub fn apply(&self, smoothed: &SmoothedFrames) -> Segments {
        let mut notes: Vec<(f64, Option<u8>)> = smoothed
            .frames()
            .iter()
            .map(|f| {
                let note = f.pitch.and_then(|p| match note_number(p) {
                    Ok(n) => Some(n),
                    Err(e) => {
                        warn!("{} at {:.3}s, treating frame as a rest", e, f.time);
                        None
                    }
                });
                (f.time, note)
            })
            .collect();

        if let SelectionPolicy::Melody {
            drop_rare_pitches: true,
        } = self.selection
        {
            drop_rare_notes(&mut notes);
        }

        let mut segments = Vec::new();
        let mut group: Vec<u8> = Vec::new();
        let mut anchor: Option<f64> = None;

        for (time, note) in notes {
            match anchor {
                Some(a) if time - a <= self.grouping_interval => {}
                Some(a) => {
                    segments.push(Segment {
                        anchor: a,
                        pitches: self.select(&group),
                    });
                    group.clear();
                    anchor = Some(time);
                }
                None => anchor = Some(time),
            }
            group.extend(note);
        }
        if let Some(a) = anchor {
            segments.push(Segment {
                anchor: a,
                pitches: self.select(&group),
            });
        }

        debug!("Segmented {} frames into {} events", smoothed.frames().len(), segments.len());
        Segments { segments }
    }

    fn select(&self, group: &[u8]) -> Vec<u8> {
        match self.selection {
            SelectionPolicy::Melody { .. } => majority(group).into_iter().collect(),
            SelectionPolicy::Chord => group
                .iter()
                .copied()
                .collect::<BTreeSet<u8>>()
                .into_iter()
                .collect(),
        }
    }
}

/// Most frequent note; the lowest one when several share the top count.
fn majority(group: &[u8]) -> Option<u8> {
    let counts = count_notes(group.iter().copied());
    let mut best: Option<(u8, usize)> = None;
    for (note, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((note, count));
        }
    }
    best.map(|(note, _)| note)
}

fn count_notes(notes: impl Iterator<Item = u8>) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for note in notes {
        *counts.entry(note).or_insert(0) += 1;
    }
    counts
}

/// Remove frames whose note occurs no more often than the median note count.
///
/// Skipped when it would leave no voiced frame at all, e.g. a recording with a
/// single repeated note.
fn drop_rare_notes(notes: &mut Vec<(f64, Option<u8>)>) {
    let counts = count_notes(notes.iter().filter_map(|(_, n)| *n));
    let values: Vec<f64> = counts.values().map(|&c| c as f64).collect();
    let Some(threshold) = median(&values) else {
        return;
    };

    let kept: BTreeSet<u8> = counts
        .iter()
        .filter(|&(_, &c)| c as f64 > threshold)
        .map(|(&note, _)| note)
        .collect();
    if kept.is_empty() {
        debug!("Every note occurs {} times or fewer, keeping all notes", threshold);
        return;
    }

    let before = notes.len();
    notes.retain(|(_, note)| note.map_or(true, |n| kept.contains(&n)));
    debug!(
        "Dropped {} frames with rare notes (count <= {})",
        before - notes.len(),
        threshold
    );
}
