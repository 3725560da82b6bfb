// src/config/schema_validator.rs
//! Configuration schema validation
//!
//! Runs on the merged TOML tree before it is deserialized, so range errors
//! are reported with their dotted key instead of a serde message.

use std::collections::HashMap;
use crate::analysis::rules::ExerciseKind;
use crate::config::constants::*;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub value: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation error for '{}': {} (value: {})", self.field, self.message, self.value)
    }
}

impl std::error::Error for ValidationError {}

/// Schema validator for configuration
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    constraints: HashMap<String, FieldConstraint>,
}

/// Field validation constraints
#[derive(Debug, Clone)]
pub enum FieldConstraint {
    /// Accepts integers and floats
    Range { min: f64, max: f64 },
    IntRange { min: i64, max: i64 },
    OneOf(Vec<String>),
}

impl SchemaValidator {
    /// Create new schema validator with default constraints
    pub fn new() -> Self {
        let mut constraints = HashMap::new();

        // Session constraints
        constraints.insert("session.reps_per_set".to_string(),
                           FieldConstraint::IntRange {
                               min: session::MIN_REPS_PER_SET as i64,
                               max: session::MAX_REPS_PER_SET as i64
                           });

        constraints.insert("session.default_exercise".to_string(),
                           FieldConstraint::OneOf(
                               ExerciseKind::ALL.iter().map(|kind| kind.key().to_string()).collect()
                           ));

        constraints.insert("session.body_side".to_string(),
                           FieldConstraint::OneOf(vec!["left".to_string(), "right".to_string()]));

        // Logging constraints
        constraints.insert("logging.level".to_string(),
                           FieldConstraint::OneOf(logging::LEVELS.iter().map(|l| l.to_string()).collect()));

        // Exercise thresholds
        let confidence = FieldConstraint::Range {
            min: gate::MIN_CONFIDENCE_FLOOR as f64,
            max: gate::MAX_CONFIDENCE_FLOOR as f64,
        };
        let angle = FieldConstraint::Range { min: 0.0, max: geometry::MAX_ANGLE_DEGREES as f64 };
        let offset = FieldConstraint::Range { min: 0.0, max: geometry::MAX_PIXEL_OFFSET as f64 };

        for kind in ExerciseKind::ALL {
            constraints.insert(format!("exercises.{}.min_confidence", kind.key()), confidence.clone());
        }

        for key in ["bicep_curl.down_angle", "bicep_curl.up_angle",
                    "front_raise.down_angle", "front_raise.up_angle_min",
                    "front_raise.up_angle_max", "front_raise.overshoot_angle"] {
            constraints.insert(format!("exercises.{}", key), angle.clone());
        }

        for key in ["bicep_curl.sway_limit_px", "bicep_curl.elbow_rise_margin_px",
                    "upright_row.wrist_down_offset_px", "upright_row.wrist_up_offset_px",
                    "upright_row.elbow_rise_margin_px", "upright_row.grip_inset_px",
                    "front_raise.lean_back_px"] {
            constraints.insert(format!("exercises.{}", key), offset.clone());
        }

        Self { constraints }
    }

    /// Validate configuration value against schema
    pub fn validate_field(&self, field_path: &str, value: &toml::Value) -> Result<(), ValidationError> {
        if let Some(constraint) = self.constraints.get(field_path) {
            self.check_constraint(field_path, value, constraint)
        } else {
            Ok(()) // Unknown fields are allowed for extensibility
        }
    }

    /// Validate entire configuration
    pub fn validate_config(&self, config: &toml::Value) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        self.validate_recursive("", config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Check cross-field dependencies: hysteresis bands must not be inverted
    pub fn validate_dependencies(&self, config: &toml::Value) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let (Some(up), Some(down)) = (
            self.get_number(config, "exercises.bicep_curl.up_angle"),
            self.get_number(config, "exercises.bicep_curl.down_angle"),
        ) {
            if up >= down {
                errors.push(ValidationError {
                    field: "exercises.bicep_curl".to_string(),
                    message: "up_angle must be less than down_angle".to_string(),
                    value: format!("up: {}, down: {}", up, down),
                });
            }
        }

        if let (Some(down), Some(min), Some(max)) = (
            self.get_number(config, "exercises.front_raise.down_angle"),
            self.get_number(config, "exercises.front_raise.up_angle_min"),
            self.get_number(config, "exercises.front_raise.up_angle_max"),
        ) {
            if down >= min || min > max {
                errors.push(ValidationError {
                    field: "exercises.front_raise".to_string(),
                    message: "Angles must satisfy down_angle < up_angle_min <= up_angle_max".to_string(),
                    value: format!("down: {}, up: {}..{}", down, min, max),
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn validate_recursive(&self, prefix: &str, value: &toml::Value, errors: &mut Vec<ValidationError>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };

                    if val.is_table() {
                        self.validate_recursive(&path, val, errors);
                    } else if let Err(err) = self.validate_field(&path, val) {
                        errors.push(err);
                    }
                }
            }
            _ => {
                if let Err(err) = self.validate_field(prefix, value) {
                    errors.push(err);
                }
            }
        }
    }

    fn check_constraint(&self, field: &str, value: &toml::Value, constraint: &FieldConstraint) -> Result<(), ValidationError> {
        match constraint {
            FieldConstraint::Range { min, max } => {
                let Some(val) = as_number(value) else {
                    return Err(ValidationError {
                        field: field.to_string(),
                        message: "Value must be a number".to_string(),
                        value: value.to_string(),
                    });
                };
                if !(val >= *min && val <= *max) {
                    return Err(ValidationError {
                        field: field.to_string(),
                        message: format!("Value must be between {} and {}", min, max),
                        value: val.to_string(),
                    });
                }
            }
            FieldConstraint::IntRange { min, max } => {
                let Some(val) = value.as_integer() else {
                    return Err(ValidationError {
                        field: field.to_string(),
                        message: "Value must be an integer".to_string(),
                        value: value.to_string(),
                    });
                };
                if val < *min || val > *max {
                    return Err(ValidationError {
                        field: field.to_string(),
                        message: format!("Value must be between {} and {}", min, max),
                        value: val.to_string(),
                    });
                }
            }
            FieldConstraint::OneOf(options) => {
                if let Some(val) = value.as_str() {
                    // Exact match, the same rule serde applies when deserializing
                    if !options.iter().any(|opt| opt == val) {
                        return Err(ValidationError {
                            field: field.to_string(),
                            message: format!(
                                "Value must be one of: {}",
                                options.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
                            ),
                            value: val.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn get_number(&self, config: &toml::Value, path: &str) -> Option<f64> {
        let mut current = config;
        for part in path.split('.') {
            current = current.as_table()?.get(part)?;
        }
        as_number(current)
    }
}

fn as_number(value: &toml::Value) -> Option<f64> {
    value.as_float().or_else(|| value.as_integer().map(|i| i as f64))
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_validator_creation() {
        let validator = SchemaValidator::new();
        assert!(validator.constraints.contains_key("exercises.upright_row.grip_inset_px"));
        assert!(validator.constraints.contains_key("exercises.front_raise.min_confidence"));
    }

    #[test]
    fn test_reps_per_set_range() {
        let validator = SchemaValidator::new();
        assert!(validator.validate_field("session.reps_per_set", &toml::Value::Integer(12)).is_ok());
        assert!(validator.validate_field("session.reps_per_set", &toml::Value::Integer(0)).is_err());
    }

    #[test]
    fn test_range_accepts_integers() {
        let validator = SchemaValidator::new();
        let value = toml::Value::Integer(35);
        assert!(validator.validate_field("exercises.bicep_curl.up_angle", &value).is_ok());

        let value = toml::Value::Integer(200);
        assert!(validator.validate_field("exercises.bicep_curl.up_angle", &value).is_err());
    }

    #[test]
    fn test_exercise_name_validation() {
        let validator = SchemaValidator::new();
        let valid = toml::Value::String("upright_row".to_string());
        assert!(validator.validate_field("session.default_exercise", &valid).is_ok());

        let invalid = toml::Value::String("deadlift".to_string());
        assert!(validator.validate_field("session.default_exercise", &invalid).is_err());
    }

    #[test]
    fn test_exercise_name_is_case_sensitive() {
        let validator = SchemaValidator::new();
        let mixed = toml::Value::String("Bicep_Curl".to_string());
        let err = validator.validate_field("session.default_exercise", &mixed).unwrap_err();
        assert_eq!(err.value, "Bicep_Curl");

        let exact = toml::Value::String("bicep_curl".to_string());
        assert!(validator.validate_field("session.default_exercise", &exact).is_ok());
    }

    #[test]
    fn test_inverted_band_dependency() {
        let validator = SchemaValidator::new();
        let config: toml::Value = toml::from_str(
            r#"
[exercises.bicep_curl]
up_angle = 150.0
down_angle = 140.0

[exercises.front_raise]
down_angle = 20.0
up_angle_min = 80
up_angle_max = 100
"#,
        )
        .unwrap();

        let errors = validator.validate_dependencies(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "exercises.bicep_curl");
    }

    #[test]
    fn test_nested_errors_carry_dotted_path() {
        let validator = SchemaValidator::new();
        let config: toml::Value = toml::from_str(
            r#"
[exercises.upright_row]
min_confidence = 1.5
"#,
        )
        .unwrap();

        let errors = validator.validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "exercises.upright_row.min_confidence");
    }
}
