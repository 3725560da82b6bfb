// tests/config_driven_rules.rs
//! Configuration files flowing into the rule table
//!
//! Thresholds written to TOML must change what the analyzer counts, and
//! bad files must never reach a running analyzer.

use repcount_core::analysis::{Condition, ExerciseKind, FrameAnalyzer, RuleTable, Session};
use repcount_core::config::{ConfigError, ConfigLoader, SystemConfig};
use repcount_core::pose::{BodySide, Keypoint, Landmark, PoseSnapshot};
use serial_test::serial;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("repcount.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn curl(elbow_angle: f32) -> PoseSnapshot {
    let theta = elbow_angle.to_radians();
    PoseSnapshot::new()
        .with(Landmark::RightShoulder, Keypoint::new(320.0, 200.0, 0.9))
        .with(Landmark::RightElbow, Keypoint::new(320.0, 310.0, 0.9))
        .with(
            Landmark::RightWrist,
            Keypoint::new(320.0 + 100.0 * theta.sin(), 310.0 - 100.0 * theta.cos(), 0.9),
        )
        .with(Landmark::RightHip, Keypoint::new(320.0, 400.0, 0.9))
}

#[test]
#[serial]
fn loosened_up_threshold_counts_shallow_curls() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "[exercises.bicep_curl]\nup_angle = 45.0\n");
    let config = ConfigLoader::with_paths(vec![path]).load_system_config().unwrap();

    let mut strict = FrameAnalyzer::new(Arc::new(RuleTable::default()));
    let mut loose = FrameAnalyzer::from_config(&config).unwrap();
    let mut strict_session = Session::new(ExerciseKind::BicepCurl, 10).unwrap();
    let mut loose_session = Session::from_config(&config.session).unwrap();

    for angle in [170.0, 40.0, 170.0, 40.0] {
        strict.analyze(&mut strict_session, Some(&curl(angle)));
        loose.analyze(&mut loose_session, Some(&curl(angle)));
    }

    assert_eq!(strict_session.rep_count(), 0);
    assert_eq!(loose_session.rep_count(), 2);
}

#[test]
#[serial]
fn session_defaults_come_from_the_file() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[session]\nreps_per_set = 2\ndefault_exercise = \"bicep_curl\"\nbody_side = \"left\"\n",
    );
    let config = ConfigLoader::with_paths(vec![path]).load_system_config().unwrap();
    let table = RuleTable::from_config(&config).unwrap();

    assert!(table.iter().all(|rules| rules.side == BodySide::Left));
    assert!(table
        .get(ExerciseKind::BicepCurl)
        .required_landmarks()
        .contains(&Landmark::LeftElbow));

    let session = Session::from_config(&config.session).unwrap();
    assert_eq!(session.reps_per_set(), 2);
}

#[test]
#[serial]
fn cheat_margins_follow_the_file() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "[exercises.bicep_curl]\nsway_limit_px = 120.0\n");
    let config = ConfigLoader::with_paths(vec![path]).load_system_config().unwrap();
    let table = RuleTable::from_config(&config).unwrap();

    let sway = &table.get(ExerciseKind::BicepCurl).cheats[0];
    assert!(matches!(sway.condition, Condition::Spread { limit, .. } if limit == 120.0));
    assert_eq!(sway.message, "Don't swing your body");
}

#[test]
#[serial]
fn environment_beats_files() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "[exercises.front_raise]\nup_angle_min = 75.0\n");

    std::env::set_var("REPCOUNT_EXERCISES__FRONT_RAISE__UP_ANGLE_MIN", "85");
    let result = ConfigLoader::with_paths(vec![path]).load_system_config();
    std::env::remove_var("REPCOUNT_EXERCISES__FRONT_RAISE__UP_ANGLE_MIN");

    let config = result.unwrap();
    assert_eq!(config.exercises.front_raise.up_angle_min, 85.0);
}

#[test]
#[serial]
fn inverted_curl_band_is_rejected() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "[exercises.bicep_curl]\ndown_angle = 20.0\nup_angle = 40.0\n");
    let mut loader = ConfigLoader::with_paths(vec![path.clone()]);

    assert!(matches!(loader.load_system_config(), Err(ConfigError::Validation(_))));
    assert!(loader.validate_config_file(&path).is_err());
    assert_eq!(loader.get_current_config(), SystemConfig::default());
}

#[test]
#[serial]
fn reps_per_set_out_of_range_is_rejected() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "[session]\nreps_per_set = 0\n");

    let err = ConfigLoader::with_paths(vec![path]).load_system_config().unwrap_err();
    assert!(err.to_string().contains("reps_per_set"));
}

#[test]
fn hand_built_config_with_bad_thresholds_fails_table_build() {
    let mut config = SystemConfig::default();
    config.exercises.front_raise.up_angle_min = 110.0;

    assert!(RuleTable::from_config(&config).is_err());
    assert!(FrameAnalyzer::from_config(&config).is_err());
}
