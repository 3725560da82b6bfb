// benches/analysis_pipeline.rs
//! Per-frame analysis throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use repcount_core::analysis::{joint_angle, validate_pose, ExerciseKind, FrameAnalyzer, RuleTable, Session};
use repcount_core::pose::{Point2, PoseSimulator, PoseSnapshot, PoseSource, SimulatorConfig};
use repcount_core::utils::time::MockTimeProvider;
use std::sync::Arc;

const REP_COUNTS: &[u32] = &[1, 10, 50];
const FRAMES_PER_REP: u32 = 30;

fn simulated_frames(exercise: ExerciseKind, reps: u32, dropout: f32) -> Vec<Option<PoseSnapshot>> {
    let mut config = SimulatorConfig::for_reps(exercise, reps);
    config.frames_per_rep = FRAMES_PER_REP;
    config.jitter_px = 2.0;
    config.dropout_probability = dropout;

    let mut source = PoseSimulator::new(config).unwrap();
    let mut frames = Vec::new();
    while !source.is_exhausted() {
        frames.push(source.next_pose().unwrap());
    }
    frames
}

fn benchmark_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");

    let shoulder = Point2::new(320.0, 200.0);
    let elbow = Point2::new(320.0, 310.0);
    let wrist = Point2::new(386.0, 385.0);

    group.bench_function("joint_angle", |b| {
        b.iter(|| joint_angle(black_box(shoulder), black_box(elbow), black_box(wrist)));
    });

    group.finish();
}

fn benchmark_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("keypoint_gate");
    let table = RuleTable::default();

    for exercise in ExerciseKind::ALL {
        let frames = simulated_frames(exercise, 1, 0.2);
        let rules = table.get(exercise);
        group.throughput(Throughput::Elements(frames.len() as u64));

        group.bench_with_input(BenchmarkId::new("validate_pose", exercise.key()), &frames, |b, frames| {
            b.iter(|| {
                for frame in frames {
                    let _ = black_box(validate_pose(frame.as_ref(), rules));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for exercise in ExerciseKind::ALL {
        for &reps in REP_COUNTS {
            let frames = simulated_frames(exercise, reps, 0.0);
            group.throughput(Throughput::Elements(frames.len() as u64));

            group.bench_with_input(
                BenchmarkId::new(exercise.key(), format!("{}reps", reps)),
                &frames,
                |b, frames| {
                    let mut analyzer = FrameAnalyzer::with_time_provider(
                        Arc::new(RuleTable::default()),
                        Arc::new(MockTimeProvider::new(0)),
                    );
                    b.iter(|| {
                        let mut session = Session::new(exercise, 10).unwrap();
                        for frame in frames {
                            black_box(analyzer.analyze(&mut session, frame.as_ref()));
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_noisy_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("noisy_stream");
    let frames = simulated_frames(ExerciseKind::BicepCurl, 10, 0.3);
    group.throughput(Throughput::Elements(frames.len() as u64));

    // Wall-clock timing included, as a live driver would run it
    group.bench_function("bicep_curl_with_dropout", |b| {
        let mut analyzer = FrameAnalyzer::new(Arc::new(RuleTable::default()));
        b.iter(|| {
            let mut session = Session::new(ExerciseKind::BicepCurl, 10).unwrap();
            for frame in &frames {
                black_box(analyzer.analyze(&mut session, frame.as_ref()));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_geometry,
    benchmark_gate,
    benchmark_analyze,
    benchmark_noisy_stream
);
criterion_main!(benches);
