//! Pitch smoothing
//!
//! Moves gated frames onto the continuous MIDI scale and runs a median filter over them
//! to remove one-frame octave and harmonic errors from the estimator.
//!
//! Unvoiced frames are carried as `Sample::Unvoiced`, a separate variant rather than a
//! magic number, so no real pitch can ever collide with it. Near either end of the
//! sequence the window narrows symmetrically instead of being padded, so every rank is
//! taken over real frames only.

use std::cmp::Ordering;

use log::debug;

use super::gate::GatedFrames;
use crate::config::PitchScale;
use crate::pitch::hz_to_midi;

/// A frame after smoothing: continuous MIDI pitch, `None` for a rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedFrame {
    pub time: f64,
    pub pitch: Option<f64>,
}

/// Output of the smoothing stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedFrames {
    frames: Vec<SmoothedFrame>,
}

impl SmoothedFrames {
    pub fn frames(&self) -> &[SmoothedFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Build directly from already-smoothed frames.
    ///
    /// Returns `None` if times are non-finite or go backwards.
    pub fn from_frames(frames: Vec<SmoothedFrame>) -> Option<Self> {
        let ordered = frames.iter().all(|f| f.time.is_finite())
            && frames.windows(2).all(|w| w[0].time <= w[1].time);
        ordered.then_some(Self { frames })
    }
}

/// Filter input value. `Unvoiced` sorts below every real pitch.
#[derive(Debug, Clone, Copy)]
enum Sample {
    Unvoiced,
    Voiced(f64),
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Sample {}

impl PartialOrd for Sample {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sample {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Sample::Unvoiced, Sample::Unvoiced) => Ordering::Equal,
            (Sample::Unvoiced, Sample::Voiced(_)) => Ordering::Less,
            (Sample::Voiced(_), Sample::Unvoiced) => Ordering::Greater,
            (Sample::Voiced(a), Sample::Voiced(b)) => a.total_cmp(b),
        }
    }
}

impl Sample {
    fn pitch(self) -> Option<f64> {
        match self {
            Sample::Unvoiced => None,
            Sample::Voiced(p) => Some(p),
        }
    }
}

/// Median filter over the MIDI scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchSmoother {
    width: usize,
    scale: PitchScale,
}

impl PitchSmoother {
    /// `width` must be odd; callers validate it through
    /// [`PipelineConfig::validate`](crate::PipelineConfig::validate).
    pub fn new(width: usize, scale: PitchScale) -> Self {
        Self { width, scale }
    }

    pub fn apply(&self, gated: &GatedFrames) -> SmoothedFrames {
        let samples: Vec<Sample> = gated
            .frames()
            .iter()
            .map(|f| self.to_sample(f.pitch))
            .collect();

        let filtered = median_filter(&samples, self.width);

        let frames = gated
            .frames()
            .iter()
            .zip(filtered)
            .map(|(f, sample)| SmoothedFrame {
                time: f.time,
                pitch: sample.pitch(),
            })
            .collect();

        SmoothedFrames { frames }
    }

    fn to_sample(&self, pitch: Option<f64>) -> Sample {
        let midi = match (pitch, self.scale) {
            (None, _) => return Sample::Unvoiced,
            (Some(hz), PitchScale::Hertz) => hz_to_midi(hz),
            (Some(midi), PitchScale::Midi) => Some(midi).filter(|m| m.is_finite()),
        };
        match midi {
            Some(m) => Sample::Voiced(m),
            None => {
                debug!("Pitch {:?} has no MIDI value, treating frame as unvoiced", pitch);
                Sample::Unvoiced
            }
        }
    }
}

/// Odd-width median filter. At the edges the window shrinks to the widest symmetric
/// span that stays inside `samples`; the first and last frames keep their own value.
fn median_filter(samples: &[Sample], width: usize) -> Vec<Sample> {
    let half = width / 2;
    let last = samples.len().saturating_sub(1);
    let mut window = Vec::with_capacity(width);

    (0..samples.len())
        .map(|i| {
            let reach = half.min(i).min(last - i);
            window.clear();
            window.extend_from_slice(&samples[i - reach..=i + reach]);
            window.sort();
            window[reach]
        })
        .collect()
}
