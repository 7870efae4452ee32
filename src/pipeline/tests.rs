use super::*;
use crate::config::{LastDuration, PitchScale, SelectionPolicy, Threshold};

fn midi_config(selection: SelectionPolicy, grouping_interval: f64, last: LastDuration) -> PipelineConfig {
    PipelineConfig {
        threshold: Threshold::Absolute(0.5),
        pitch_scale: PitchScale::Midi,
        smoothing_width: 1,
        grouping_interval,
        selection,
        last_duration: last,
    }
}

fn frames(data: &[(f64, Option<f64>)]) -> Vec<PitchFrame> {
    data.iter()
        .map(|&(time, pitch)| PitchFrame::new(time, pitch, 0.9))
        .collect()
}

fn summary(timeline: &Timeline) -> Vec<(Vec<u8>, f64, f64)> {
    timeline
        .events()
        .iter()
        .map(|e| (e.pitches().to_vec(), e.start_time(), e.duration()))
        .collect()
}

/// A longer melody with estimator noise: octave blips, low-confidence frames and a pause.
fn noisy_melody() -> Vec<PitchFrame> {
    let mut out = Vec::new();
    let notes = [(60.0, 0.0), (62.0, 0.6), (64.0, 1.2), (65.0, 2.4), (64.0, 3.0)];
    for (pitch, start) in notes {
        for k in 0..5 {
            let time = start + k as f64 * 0.1;
            let pitch = if k == 2 { pitch + 12.0 } else { pitch };
            let strength = if k == 4 { 0.3 } else { 0.95 };
            out.push(PitchFrame::new(time, Some(pitch), strength));
        }
    }
    out.push(PitchFrame::new(1.8, None, 0.9));
    out.push(PitchFrame::new(1.9, None, 0.9));
    out.sort_by(|a, b| a.time.total_cmp(&b.time));
    out
}

#[test]
fn test_segmentation_example_timeline() {
    let config = midi_config(
        SelectionPolicy::Melody { drop_rare_pitches: false },
        0.5,
        LastDuration::Fixed(0.5),
    );
    let timeline = Transcriber::new(config)
        .unwrap()
        .transcribe(frames(&[
            (0.0, Some(60.0)),
            (0.1, Some(60.0)),
            (0.2, Some(61.0)),
            (0.3, Some(60.0)),
            (0.65, Some(64.0)),
        ]))
        .unwrap();

    assert_eq!(
        summary(&timeline),
        vec![(vec![60], 0.0, 0.65), (vec![64], 0.65, 0.5)]
    );
}

#[test]
fn test_last_duration_policies() {
    let input = frames(&[(0.0, Some(60.0)), (0.4, Some(62.0))]);
    let run = |last| {
        let config = midi_config(SelectionPolicy::Chord, 0.1, last);
        Transcriber::new(config).unwrap().transcribe(input.clone()).unwrap()
    };

    assert_eq!(run(LastDuration::Fixed(1.0)).events()[1].duration(), 1.0);
    assert_eq!(run(LastDuration::MatchPrevious).events()[1].duration(), 0.4);
    assert_eq!(run(LastDuration::Zero).events()[1].duration(), 0.0);
}

#[test]
fn test_single_event_match_previous_is_zero() {
    let config = midi_config(SelectionPolicy::Chord, 0.5, LastDuration::MatchPrevious);
    let timeline = Transcriber::new(config)
        .unwrap()
        .transcribe(frames(&[(0.0, Some(60.0)), (0.1, Some(64.0))]))
        .unwrap();
    assert_eq!(summary(&timeline), vec![(vec![60, 64], 0.0, 0.0)]);
}

#[test]
fn test_empty_stream_is_empty_timeline() {
    let transcriber = Transcriber::new(PipelineConfig::melody()).unwrap();
    let timeline = transcriber.transcribe(vec![]).unwrap();
    assert!(timeline.is_empty());
    assert_eq!(timeline.query().query(1.0), Active::Rest);
}

#[test]
fn test_fully_gated_stream_is_empty_timeline() {
    let transcriber = Transcriber::new(PipelineConfig::melody()).unwrap();
    let quiet = (0..10)
        .map(|i| PitchFrame::new(i as f64 * 0.1, Some(440.0), 0.2))
        .collect();
    let timeline = transcriber.transcribe(quiet).unwrap();
    assert!(timeline.is_empty());
    for t in [0.0, 0.5, 2.0] {
        assert!(timeline.query().query(t).is_rest());
    }
}

#[test]
fn test_single_confident_frame_is_a_note() {
    let timeline = Transcriber::new(PipelineConfig::melody())
        .unwrap()
        .transcribe(vec![PitchFrame::new(0.0, Some(440.0), 0.95)])
        .unwrap();
    assert_eq!(summary(&timeline), vec![(vec![69], 0.0, 0.0)]);
}

#[test]
fn test_backwards_time_is_malformed() {
    let transcriber = Transcriber::new(PipelineConfig::chords()).unwrap();
    let result = transcriber.transcribe(frames(&[(0.5, Some(440.0)), (0.4, Some(440.0))]));
    assert!(matches!(
        result,
        Err(TranscribeError::MalformedFrame { index: 1, .. })
    ));
}

#[test]
fn test_invalid_threshold_rejected_before_processing() {
    let mut config = PipelineConfig::melody();
    config.threshold = Threshold::Absolute(f64::INFINITY);
    assert!(matches!(
        Transcriber::new(config),
        Err(TranscribeError::InvalidThreshold { .. })
    ));
}

#[test]
fn test_builder_rejects_unordered_segments() {
    let segments = Segments::from_segments(vec![
        Segment { anchor: 1.0, pitches: vec![60] },
        Segment { anchor: 0.5, pitches: vec![62] },
    ]);
    let result = TimelineBuilder::new(LastDuration::Zero).build(&segments);
    assert!(matches!(
        result,
        Err(TranscribeError::MalformedFrame { index: 0, .. })
    ));

    let duplicate = Segments::from_segments(vec![
        Segment { anchor: 1.0, pitches: vec![60] },
        Segment { anchor: 1.0, pitches: vec![62] },
    ]);
    assert!(TimelineBuilder::new(LastDuration::Zero).build(&duplicate).is_err());
}

#[test]
fn test_noisy_melody_end_to_end() {
    let config = PipelineConfig {
        pitch_scale: PitchScale::Midi,
        selection: SelectionPolicy::Melody { drop_rare_pitches: false },
        ..PipelineConfig::melody()
    };
    let timeline = Transcriber::new(config).unwrap().transcribe(noisy_melody()).unwrap();

    let pitches: Vec<Vec<u8>> = timeline.events().iter().map(|e| e.pitches().to_vec()).collect();
    assert_eq!(
        pitches,
        vec![vec![60], vec![62], vec![64], vec![], vec![65], vec![64]]
    );
    let starts: Vec<f64> = timeline.events().iter().map(|e| e.start_time()).collect();
    assert_eq!(starts[3], 1.8);
    assert!((starts[4] - 2.4).abs() < 1e-9);
}

#[test]
fn test_noisy_melody_keeps_only_common_notes() {
    let config = PipelineConfig {
        pitch_scale: PitchScale::Midi,
        ..PipelineConfig::melody()
    };
    let timeline = Transcriber::new(config).unwrap().transcribe(noisy_melody()).unwrap();

    // After smoothing, 64 is the only note heard more often than the median count.
    assert!(timeline
        .events()
        .iter()
        .all(|e| e.is_rest() || e.pitches() == [64]));
    assert!(!timeline.is_empty());
}

#[test]
fn test_start_times_strictly_increase() {
    for config in [PipelineConfig::melody(), PipelineConfig::chords()] {
        let config = PipelineConfig {
            pitch_scale: PitchScale::Midi,
            ..config
        };
        let timeline = Transcriber::new(config).unwrap().transcribe(noisy_melody()).unwrap();
        assert!(timeline
            .events()
            .windows(2)
            .all(|w| w[0].start_time() < w[1].start_time()));
    }
}

#[test]
fn test_coverage_invariant() {
    let config = PipelineConfig {
        pitch_scale: PitchScale::Midi,
        ..PipelineConfig::chords()
    };
    let timeline = Transcriber::new(config).unwrap().transcribe(noisy_melody()).unwrap();
    let events = timeline.events();
    let (first, last) = (&events[0], &events[events.len() - 1]);

    let sum: f64 = events[..events.len() - 1].iter().map(|e| e.duration()).sum();
    assert!((sum - (last.start_time() - first.start_time())).abs() < 1e-9);
    for pair in events.windows(2) {
        assert!((pair[0].end_time() - pair[1].start_time()).abs() < 1e-9);
    }
}

#[test]
fn test_containment_round_trip() {
    let config = PipelineConfig {
        pitch_scale: PitchScale::Midi,
        ..PipelineConfig::chords()
    };
    let timeline = Transcriber::new(config).unwrap().transcribe(noisy_melody()).unwrap();
    let query = timeline.query();

    for event in timeline.events().iter().filter(|e| e.duration() > 0.0) {
        for step in 0..10 {
            let t = event.start_time() + event.duration() * step as f64 / 10.0;
            assert_eq!(query.query(t).pitches(), event.pitches(), "at t = {}", t);
        }
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let transcriber = Transcriber::new(PipelineConfig {
        pitch_scale: PitchScale::Midi,
        ..PipelineConfig::melody()
    })
    .unwrap();
    let first = transcriber.transcribe(noisy_melody()).unwrap();
    let second = transcriber.transcribe(noisy_melody()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.to_records()).unwrap(),
        serde_json::to_string(&second.to_records()).unwrap()
    );
}

#[test]
fn test_transcriber_is_shareable_across_threads() {
    let transcriber = std::sync::Arc::new(
        Transcriber::new(PipelineConfig {
            pitch_scale: PitchScale::Midi,
            ..PipelineConfig::chords()
        })
        .unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let transcriber = transcriber.clone();
            std::thread::spawn(move || transcriber.transcribe(noisy_melody()).unwrap())
        })
        .collect();
    let results: Vec<Timeline> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}
