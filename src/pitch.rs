//! Pitch scale helpers
//!
//! Conversions between Hertz, the continuous MIDI scale and note names.
//! A4 = 440 Hz = MIDI 69, C4 = MIDI 60.

use crate::error::TranscribeError;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Converts a frequency in Hz to the continuous MIDI scale.
///
/// Returns `None` for non-positive or non-finite frequencies (unvoiced).
pub fn hz_to_midi(hz: f64) -> Option<f64> {
    if !hz.is_finite() || hz <= 0.0 {
        return None;
    }
    Some(69.0 + 12.0 * (hz / 440.0).log2())
}

/// Rounds a continuous MIDI pitch to the nearest note number.
///
/// # Example
/// ```
/// use pitchline::pitch::note_number;
///
/// assert_eq!(note_number(60.4).unwrap(), 60);
/// assert_eq!(note_number(60.5).unwrap(), 61);
/// assert!(note_number(128.0).is_err());
/// ```
pub fn note_number(midi: f64) -> Result<u8, TranscribeError> {
    let rounded = midi.round();
    if !rounded.is_finite() || !(0.0..=127.0).contains(&rounded) {
        return Err(TranscribeError::UnmappablePitch(midi));
    }
    Ok(rounded as u8)
}

/// Formats a MIDI note number as a note name with octave, e.g. `60` → `"C4"`.
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave)
}

/// Parses a note name such as `"C4"`, `"F#3"`, `"Bb2"` or `"C-1"` into a MIDI note number.
///
/// Accepts `#`/`♯` for sharps and `b`/`♭` for flats, and a lower-case letter.
///
/// # Example
/// ```
/// use pitchline::pitch::parse_note_name;
///
/// assert_eq!(parse_note_name("A4").unwrap(), 69);
/// assert_eq!(parse_note_name("Bb3").unwrap(), 58);
/// assert_eq!(parse_note_name("C-1").unwrap(), 0);
/// assert!(parse_note_name("H2").is_err());
/// ```
pub fn parse_note_name(name: &str) -> Result<u8, TranscribeError> {
    let unknown = || TranscribeError::UnknownNoteName(name.to_string());
    let trimmed = name.trim();
    let mut chars = trimmed.chars();

    let base: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(unknown()),
    };

    let rest = chars.as_str();
    let (accidental, octave_str) = if let Some(s) = rest.strip_prefix(['#', '♯']) {
        (1, s)
    } else if let Some(s) = rest.strip_prefix(['b', '♭']) {
        (-1, s)
    } else {
        (0, rest)
    };

    let octave: i32 = octave_str.parse().map_err(|_| unknown())?;
    let midi = (octave + 1) * 12 + base + accidental;
    u8::try_from(midi)
        .ok()
        .filter(|n| *n <= 127)
        .ok_or_else(unknown)
}
