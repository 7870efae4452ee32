//! # Pipeline Configuration
//!
//! Every variant of the pipeline (melody extraction, chord tracking, different last-note
//! handling) is the same code driven by one [`PipelineConfig`], chosen once when a
//! [`Transcriber`](crate::Transcriber) is built.
//!
//! ## YAML
//! Configuration files use kebab-case keys; every key is optional and falls back to the
//! preset selected by `mode`:
//!
//! ```yaml
//! mode: melody            # or: chord
//! drop-rare-pitches: true
//! confidence-threshold: 0.8
//! pitch-scale: hz         # or: midi
//! smoothing-width: 3
//! grouping-interval: 0.5
//! last-duration: previous # or: zero, or a number of seconds
//! ```
//!
//! `median-multiplier: 1.5` can replace `confidence-threshold` to gate on
//! `median(strength) * 1.5` instead of a fixed value.

use serde::Deserialize;

use crate::error::TranscribeError;

/// Confidence threshold used by the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Fixed threshold in `[0, 1]`.
    Absolute(f64),
    /// `median(strength) * multiplier`, computed over the whole stream.
    MedianScaled(f64),
}

/// Scale of the `pitch` field of incoming frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchScale {
    Hertz,
    Midi,
}

/// How the pitches of a group become an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Single most frequent note per group (lowest note wins ties).
    ///
    /// With `drop_rare_pitches`, notes whose total count over the recording is at or
    /// below the median count are removed before grouping.
    Melody { drop_rare_pitches: bool },
    /// All distinct notes of the group.
    Chord,
}

/// Duration given to the final event, which has no successor to bound it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LastDuration {
    /// Fixed number of seconds.
    Fixed(f64),
    /// Same as the preceding event, or zero when there is only one event.
    MatchPrevious,
    Zero,
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub threshold: Threshold,
    pub pitch_scale: PitchScale,
    /// Odd median filter width; 1 disables smoothing.
    pub smoothing_width: usize,
    /// Seconds after a group's anchor within which frames join the group.
    pub grouping_interval: f64,
    pub selection: SelectionPolicy,
    pub last_duration: LastDuration,
}

impl PipelineConfig {
    /// Melody extraction: one note per half second, rare pitches discarded.
    pub fn melody() -> Self {
        Self {
            threshold: Threshold::Absolute(0.8),
            pitch_scale: PitchScale::Hertz,
            smoothing_width: 3,
            grouping_interval: 0.5,
            selection: SelectionPolicy::Melody {
                drop_rare_pitches: true,
            },
            last_duration: LastDuration::MatchPrevious,
        }
    }

    /// Chord tracking: every distinct pitch within 50 ms forms one chord.
    pub fn chords() -> Self {
        Self {
            threshold: Threshold::Absolute(0.8),
            pitch_scale: PitchScale::Hertz,
            smoothing_width: 3,
            grouping_interval: 0.05,
            selection: SelectionPolicy::Chord,
            last_duration: LastDuration::MatchPrevious,
        }
    }

    /// Parse a YAML configuration document.
    ///
    /// # Example
    /// ```rust
    /// use pitchline::{PipelineConfig, SelectionPolicy, LastDuration};
    ///
    /// let config = PipelineConfig::from_yaml("mode: chord\nlast-duration: 0.25\n")?;
    /// assert_eq!(config.selection, SelectionPolicy::Chord);
    /// assert_eq!(config.last_duration, LastDuration::Fixed(0.25));
    /// # Ok::<(), pitchline::TranscribeError>(())
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, TranscribeError> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| TranscribeError::Config(e.to_string()))?
        };
        let config = raw.into_config()?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value before any frame is processed.
    pub fn validate(&self) -> Result<(), TranscribeError> {
        validate_threshold(self.threshold)?;

        if self.smoothing_width == 0 || self.smoothing_width % 2 == 0 {
            return Err(TranscribeError::Config(format!(
                "smoothing width must be a positive odd number, got {}",
                self.smoothing_width
            )));
        }
        if !self.grouping_interval.is_finite() || self.grouping_interval < 0.0 {
            return Err(TranscribeError::Config(format!(
                "grouping interval must be a non-negative number of seconds, got {}",
                self.grouping_interval
            )));
        }
        if let LastDuration::Fixed(secs) = self.last_duration {
            if !secs.is_finite() || secs < 0.0 {
                return Err(TranscribeError::Config(format!(
                    "last duration must be a non-negative number of seconds, got {}",
                    secs
                )));
            }
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::melody()
    }
}

pub(crate) fn validate_threshold(threshold: Threshold) -> Result<(), TranscribeError> {
    match threshold {
        Threshold::Absolute(value) if !value.is_finite() || !(0.0..=1.0).contains(&value) => {
            Err(TranscribeError::InvalidThreshold {
                value,
                reason: "absolute threshold must lie in [0, 1]".to_string(),
            })
        }
        Threshold::MedianScaled(value) if !value.is_finite() || value < 0.0 => {
            Err(TranscribeError::InvalidThreshold {
                value,
                reason: "median multiplier must be finite and non-negative".to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Raw configuration for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    mode: Option<String>,
    drop_rare_pitches: Option<bool>,
    confidence_threshold: Option<f64>,
    median_multiplier: Option<f64>,
    pitch_scale: Option<String>,
    smoothing_width: Option<usize>,
    grouping_interval: Option<f64>,
    last_duration: Option<String>, // "previous", "zero" or seconds like "0.5"
}

impl RawConfig {
    fn into_config(self) -> Result<PipelineConfig, TranscribeError> {
        let mut config = match self.mode.as_deref().map(str::trim) {
            None | Some("melody") => PipelineConfig::melody(),
            Some("chord") | Some("chords") => PipelineConfig::chords(),
            Some(other) => {
                return Err(TranscribeError::Config(format!(
                    "unknown mode '{}', expected 'melody' or 'chord'",
                    other
                )))
            }
        };

        if let Some(drop) = self.drop_rare_pitches {
            match &mut config.selection {
                SelectionPolicy::Melody { drop_rare_pitches } => *drop_rare_pitches = drop,
                SelectionPolicy::Chord => {
                    return Err(TranscribeError::Config(
                        "drop-rare-pitches only applies to melody mode".to_string(),
                    ))
                }
            }
        }

        match (self.confidence_threshold, self.median_multiplier) {
            (Some(_), Some(_)) => {
                return Err(TranscribeError::Config(
                    "set either confidence-threshold or median-multiplier, not both".to_string(),
                ))
            }
            (Some(value), None) => config.threshold = Threshold::Absolute(value),
            (None, Some(multiplier)) => config.threshold = Threshold::MedianScaled(multiplier),
            (None, None) => {}
        }

        if let Some(scale) = &self.pitch_scale {
            config.pitch_scale = match scale.trim().to_ascii_lowercase().as_str() {
                "hz" | "hertz" => PitchScale::Hertz,
                "midi" => PitchScale::Midi,
                other => {
                    return Err(TranscribeError::Config(format!(
                        "unknown pitch scale '{}', expected 'hz' or 'midi'",
                        other
                    )))
                }
            };
        }

        if let Some(width) = self.smoothing_width {
            config.smoothing_width = width;
        }
        if let Some(interval) = self.grouping_interval {
            config.grouping_interval = interval;
        }
        if let Some(last) = &self.last_duration {
            config.last_duration = parse_last_duration(last)?;
        }

        Ok(config)
    }
}

fn parse_last_duration(s: &str) -> Result<LastDuration, TranscribeError> {
    match s.trim() {
        "previous" => Ok(LastDuration::MatchPrevious),
        "zero" => Ok(LastDuration::Zero),
        other => other.parse().map(LastDuration::Fixed).map_err(|_| {
            TranscribeError::Config(format!(
                "invalid last-duration '{}', expected 'previous', 'zero' or seconds",
                other
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_melody_preset() {
        assert_eq!(PipelineConfig::from_yaml("").unwrap(), PipelineConfig::melody());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
mode: melody
drop-rare-pitches: false
median-multiplier: 1.5
pitch-scale: midi
smoothing-width: 5
grouping-interval: 0.25
last-duration: zero
"#;
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.threshold, Threshold::MedianScaled(1.5));
        assert_eq!(config.pitch_scale, PitchScale::Midi);
        assert_eq!(config.smoothing_width, 5);
        assert_eq!(config.grouping_interval, 0.25);
        assert_eq!(
            config.selection,
            SelectionPolicy::Melody {
                drop_rare_pitches: false
            }
        );
        assert_eq!(config.last_duration, LastDuration::Zero);
    }

    #[test]
    fn test_chord_preset() {
        let config = PipelineConfig::from_yaml("mode: chord").unwrap();
        assert_eq!(config.selection, SelectionPolicy::Chord);
        assert_eq!(config.grouping_interval, 0.05);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let result = PipelineConfig::from_yaml("confidence-threshold: 1.2");
        assert!(matches!(
            result,
            Err(TranscribeError::InvalidThreshold { value, .. }) if value == 1.2
        ));
    }

    #[test]
    fn test_both_thresholds_rejected() {
        let result = PipelineConfig::from_yaml("confidence-threshold: 0.5\nmedian-multiplier: 2");
        assert!(matches!(result, Err(TranscribeError::Config(_))));
    }

    #[test]
    fn test_even_smoothing_width_rejected() {
        let result = PipelineConfig::from_yaml("smoothing-width: 4");
        assert!(matches!(result, Err(TranscribeError::Config(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = PipelineConfig::from_yaml("tempo: 120");
        assert!(matches!(result, Err(TranscribeError::Config(_))));
    }

    #[test]
    fn test_bad_last_duration() {
        let result = PipelineConfig::from_yaml("last-duration: forever");
        assert!(matches!(result, Err(TranscribeError::Config(_))));
        let result = PipelineConfig::from_yaml("last-duration: -1");
        assert!(matches!(result, Err(TranscribeError::Config(_))));
    }

    #[test]
    fn test_drop_rare_pitches_requires_melody() {
        let result = PipelineConfig::from_yaml("mode: chord\ndrop-rare-pitches: true");
        assert!(matches!(result, Err(TranscribeError::Config(_))));
    }
}
