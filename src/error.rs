// src/error.rs
//! Unified error handling for RepCount Core
//!
//! Two families live here. [`CoreError`] covers faults a caller has to fix
//! (bad configuration, invalid construction arguments, a failing pose source).
//! [`Rejection`] covers frames the analysis cannot use; it is a plain value
//! carried in every frame output and never aborts the pipeline.

use crate::pose::types::Landmark;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::time::SystemTime;
use thiserror::Error;

/// Unified error type for the core
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration and setup errors
    #[error("[CONFIG] Configuration error in {component}: {reason} ({})", .context.operation)]
    Configuration {
        component: String,
        reason: String,
        context: ErrorContext,
    },

    /// Invalid input data errors
    #[error("[DATA] Invalid {data_type}: {reason} ({})", .context.operation)]
    InvalidData {
        data_type: String,
        reason: String,
        context: ErrorContext,
    },

    /// The external pose collaborator failed
    #[error("[SOURCE] Pose source '{source_name}' failed: {source}")]
    Source {
        source_name: String,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
}

impl CoreError {
    pub fn configuration(context: ErrorContext, reason: impl Into<String>) -> Self {
        CoreError::Configuration {
            component: context.component.clone(),
            reason: reason.into(),
            context,
        }
    }

    pub fn invalid_data(
        context: ErrorContext,
        data_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::InvalidData {
            data_type: data_type.into(),
            reason: reason.into(),
            context,
        }
    }

    pub fn from_source<E>(context: ErrorContext, source_name: impl Into<String>, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        CoreError::Source {
            source_name: source_name.into(),
            source: Box::new(err),
            context,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            CoreError::Configuration { context, .. }
            | CoreError::InvalidData { context, .. }
            | CoreError::Source { context, .. } => context,
        }
    }
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Why a frame could not be analyzed. Non-fatal by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("no body detected")]
    NoBodyDetected,

    /// A required landmark is missing or under the rule set's floor.
    /// Missing landmarks report confidence 0.
    #[error("{landmark} confidence {confidence:.2} below floor {floor:.2}")]
    LowConfidence {
        landmark: Landmark,
        confidence: f32,
        floor: f32,
    },

    /// Coincident points made the primary angle undefined
    #[error("degenerate geometry at {landmark}")]
    DegenerateGeometry { landmark: Landmark },
}

impl Rejection {
    /// Short machine-readable name, used for metrics and log fields
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::NoBodyDetected => "no_body_detected",
            Rejection::LowConfidence { .. } => "low_confidence",
            Rejection::DegenerateGeometry { .. } => "degenerate_geometry",
        }
    }
}

/// Error context for debugging and analysis
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub timestamp: SystemTime,
    pub component: String,
    pub operation: String,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub additional_info: HashMap<String, String>,
}

impl ErrorContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            component: component.to_string(),
            operation: operation.to_string(),
            file: None,
            line: None,
            additional_info: HashMap::new(),
        }
    }

    pub fn with_location(component: &str, operation: &str, file: &'static str, line: u32) -> Self {
        let mut context = Self::new(component, operation);
        context.file = Some(file);
        context.line = Some(line);
        context
    }

    pub fn add_info<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional_info.insert(key.into(), value.into());
        self
    }
}

/// Create an [`ErrorContext`] stamped with the call site
#[macro_export]
macro_rules! error_context {
    ($component:expr, $operation:expr) => {
        $crate::error::ErrorContext::with_location($component, $operation, file!(), line!())
    };
}
