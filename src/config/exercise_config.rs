// src/config/exercise_config.rs
//! Per-exercise threshold configuration
//!
//! Angles are in degrees, offsets in the same pixel units as the keypoints.

use crate::config::constants::{bicep_curl, front_raise, gate, geometry, upright_row};
use serde::{Deserialize, Serialize};

/// Tunables for every exercise in the rule table
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ExerciseConfigs {
    pub bicep_curl: BicepCurlConfig,
    pub upright_row: UprightRowConfig,
    pub front_raise: FrontRaiseConfig,
}

/// Standing bicep curl: elbow angle shoulder–elbow–wrist
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BicepCurlConfig {
    pub min_confidence: f32,
    /// Arm counts as extended above this elbow angle
    pub down_angle: f32,
    /// Arm counts as curled below this elbow angle
    pub up_angle: f32,
    /// Horizontal shoulder/hip distance that counts as swinging
    pub sway_limit_px: f32,
    /// How far the elbow may rise above the shoulder
    pub elbow_rise_margin_px: f32,
}

/// Standing upright row: counted on wrist height
///
/// Down and up overlap when the lifter's hip sits less than
/// `wrist_down_offset_px + wrist_up_offset_px` below the shoulder in the
/// image. Frames in that overlap are ambiguous and never count a rep, so
/// lower both offsets for small or distant subjects.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct UprightRowConfig {
    pub min_confidence: f32,
    pub wrist_down_offset_px: f32,
    pub wrist_up_offset_px: f32,
    pub elbow_rise_margin_px: f32,
    pub grip_inset_px: f32,
}

/// Standing front raise: arm angle elbow–shoulder–hip
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FrontRaiseConfig {
    pub min_confidence: f32,
    pub down_angle: f32,
    pub up_angle_min: f32,
    pub up_angle_max: f32,
    pub overshoot_angle: f32,
    pub lean_back_px: f32,
}

impl Default for BicepCurlConfig {
    fn default() -> Self {
        Self {
            min_confidence: gate::DEFAULT_MIN_CONFIDENCE,
            down_angle: bicep_curl::DOWN_ANGLE_DEGREES,
            up_angle: bicep_curl::UP_ANGLE_DEGREES,
            sway_limit_px: bicep_curl::SWAY_LIMIT_PX,
            elbow_rise_margin_px: bicep_curl::ELBOW_RISE_MARGIN_PX,
        }
    }
}

impl Default for UprightRowConfig {
    fn default() -> Self {
        Self {
            min_confidence: gate::STRICT_MIN_CONFIDENCE,
            wrist_down_offset_px: upright_row::WRIST_DOWN_OFFSET_PX,
            wrist_up_offset_px: upright_row::WRIST_UP_OFFSET_PX,
            elbow_rise_margin_px: upright_row::ELBOW_RISE_MARGIN_PX,
            grip_inset_px: upright_row::GRIP_INSET_PX,
        }
    }
}

impl Default for FrontRaiseConfig {
    fn default() -> Self {
        Self {
            min_confidence: gate::DEFAULT_MIN_CONFIDENCE,
            down_angle: front_raise::DOWN_ANGLE_DEGREES,
            up_angle_min: front_raise::UP_ANGLE_MIN_DEGREES,
            up_angle_max: front_raise::UP_ANGLE_MAX_DEGREES,
            overshoot_angle: front_raise::OVERSHOOT_ANGLE_DEGREES,
            lean_back_px: front_raise::LEAN_BACK_PX,
        }
    }
}

fn check_confidence(name: &str, value: f32) -> Result<(), String> {
    if !(gate::MIN_CONFIDENCE_FLOOR..=gate::MAX_CONFIDENCE_FLOOR).contains(&value) {
        return Err(format!(
            "{} min_confidence must be between {} and {}",
            name,
            gate::MIN_CONFIDENCE_FLOOR,
            gate::MAX_CONFIDENCE_FLOOR
        ));
    }
    Ok(())
}

fn check_angle(name: &str, value: f32) -> Result<(), String> {
    if !(0.0..=geometry::MAX_ANGLE_DEGREES).contains(&value) {
        return Err(format!("{} must be between 0 and 180 degrees", name));
    }
    Ok(())
}

fn check_offset(name: &str, value: f32) -> Result<(), String> {
    if !(0.0..=geometry::MAX_PIXEL_OFFSET).contains(&value) {
        return Err(format!("{} must be between 0 and {} px", name, geometry::MAX_PIXEL_OFFSET));
    }
    Ok(())
}

/// Validate threshold configuration, including hysteresis band ordering
pub fn validate_exercise_config(config: &ExerciseConfigs) -> Result<(), String> {
    let curl = &config.bicep_curl;
    check_confidence("bicep_curl", curl.min_confidence)?;
    check_angle("bicep_curl.down_angle", curl.down_angle)?;
    check_angle("bicep_curl.up_angle", curl.up_angle)?;
    check_offset("bicep_curl.sway_limit_px", curl.sway_limit_px)?;
    check_offset("bicep_curl.elbow_rise_margin_px", curl.elbow_rise_margin_px)?;
    if curl.up_angle >= curl.down_angle {
        return Err("bicep_curl.up_angle must be below bicep_curl.down_angle".to_string());
    }

    let row = &config.upright_row;
    check_confidence("upright_row", row.min_confidence)?;
    check_offset("upright_row.wrist_down_offset_px", row.wrist_down_offset_px)?;
    check_offset("upright_row.wrist_up_offset_px", row.wrist_up_offset_px)?;
    check_offset("upright_row.elbow_rise_margin_px", row.elbow_rise_margin_px)?;
    check_offset("upright_row.grip_inset_px", row.grip_inset_px)?;

    let raise = &config.front_raise;
    check_confidence("front_raise", raise.min_confidence)?;
    check_angle("front_raise.down_angle", raise.down_angle)?;
    check_angle("front_raise.up_angle_min", raise.up_angle_min)?;
    check_angle("front_raise.up_angle_max", raise.up_angle_max)?;
    check_angle("front_raise.overshoot_angle", raise.overshoot_angle)?;
    check_offset("front_raise.lean_back_px", raise.lean_back_px)?;
    if raise.down_angle >= raise.up_angle_min {
        return Err("front_raise.down_angle must be below front_raise.up_angle_min".to_string());
    }
    if raise.up_angle_min > raise.up_angle_max {
        return Err("front_raise.up_angle_min must not exceed front_raise.up_angle_max".to_string());
    }

    Ok(())
}
