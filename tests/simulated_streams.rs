// tests/simulated_streams.rs
//! Synthetic pose streams driven through the analyzer
//!
//! Checks that full simulated sets count exactly, that injected faults are
//! absorbed by the gate and that sway shows up as form feedback.

#![cfg(feature = "simulation")]

use proptest::prelude::*;
use repcount_core::analysis::{ExerciseKind, FrameAnalyzer, FrameOutput, RuleTable, Session, Severity};
use repcount_core::pose::{PoseSimulator, PoseSource, SimulatorConfig};
use std::sync::Arc;

/// Feed every frame of a simulator into a fresh session
fn run_stream(config: SimulatorConfig, reps_per_set: u32) -> (Session, FrameAnalyzer, Vec<FrameOutput>) {
    let mut analyzer = FrameAnalyzer::new(Arc::new(RuleTable::default()));
    let mut session = Session::new(config.exercise, reps_per_set).unwrap();
    let mut source = PoseSimulator::new(config).unwrap();
    let mut outputs = Vec::new();

    while !source.is_exhausted() {
        let pose = source.next_pose().unwrap();
        outputs.push(analyzer.analyze(&mut session, pose.as_ref()));
    }
    (session, analyzer, outputs)
}

#[test]
fn every_exercise_counts_clean_reps() {
    for exercise in ExerciseKind::ALL {
        let (session, analyzer, outputs) = run_stream(SimulatorConfig::for_reps(exercise, 3), 10);

        assert_eq!(session.rep_count(), 3, "{exercise}");
        assert_eq!(session.set_count(), 0, "{exercise}");
        assert_eq!(analyzer.metrics().frames_rejected(), 0, "{exercise}");
        assert!(
            outputs.iter().all(|o| o.feedback.severity == Severity::Ok),
            "{exercise} produced a warning on clean frames"
        );
    }
}

#[test]
fn sets_roll_over_from_a_long_stream() {
    let (session, analyzer, _) = run_stream(SimulatorConfig::for_reps(ExerciseKind::BicepCurl, 7), 3);

    assert_eq!((session.set_count(), session.rep_count()), (2, 1));
    assert_eq!(analyzer.metrics().sets_completed, 2);
    assert_eq!(analyzer.metrics().reps_counted, 7);
}

#[test]
fn counters_are_monotonic_across_a_stream() {
    let (_, _, outputs) = run_stream(SimulatorConfig::for_reps(ExerciseKind::UprightRow, 5), 2);

    let progress: Vec<u32> = outputs.iter().map(|o| o.set_count * o.reps_per_set + o.rep_count).collect();
    assert!(progress.windows(2).all(|w| w[1] == w[0] || w[1] == w[0] + 1));
    assert!(outputs.iter().all(|o| o.rep_count < o.reps_per_set));
}

#[test]
fn swaying_curls_are_flagged_but_counted() {
    let mut config = SimulatorConfig::for_reps(ExerciseKind::BicepCurl, 2);
    config.torso_sway_px = 80.0;

    let (session, _, outputs) = run_stream(config, 10);

    assert_eq!(session.rep_count(), 2);
    assert!(outputs
        .iter()
        .filter(|o| o.is_analyzed())
        .all(|o| o.feedback.message == "Don't swing your body"));
}

#[test]
fn dropped_frames_are_rejected_without_losing_reps() {
    let mut config = SimulatorConfig::for_reps(ExerciseKind::FrontRaise, 4);
    config.dropout_probability = 0.1;
    config.seed = 7;

    let (session, analyzer, outputs) = run_stream(config, 10);

    let rejected = outputs.iter().filter(|o| !o.is_analyzed()).count() as u64;
    assert_eq!(rejected, analyzer.metrics().frames_rejected());
    assert!(rejected > 0);
    assert_eq!(session.rep_count(), 4);
    assert!(outputs
        .iter()
        .filter(|o| !o.is_analyzed())
        .all(|o| o.feedback.severity == Severity::Notice));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn small_jitter_never_changes_the_count(
        seed in any::<u64>(),
        jitter in 0.0f32..3.0,
        reps in 1u32..6,
        exercise_index in 0usize..3,
    ) {
        let mut config = SimulatorConfig::for_reps(ExerciseKind::ALL[exercise_index], reps);
        config.jitter_px = jitter;
        config.seed = seed;

        let (session, analyzer, _) = run_stream(config, 10);
        prop_assert_eq!(session.rep_count(), reps);
        prop_assert_eq!(analyzer.metrics().warnings_issued, 0);
    }
}
