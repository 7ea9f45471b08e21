//! Error types for sheet set planning and configuration.

use crate::naming::TemplateField;
use sheetset_safe_eval::{EvalError, PolicyError, SafeEvalError, ValidationError};
use thiserror::Error;

/// Failures while turning a sheet group into concrete view and sheet names.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NamingError {
    #[error("Invalid {field} template: {source}")]
    InvalidTemplate {
        field: TemplateField,
        source: ValidationError,
    },

    #[error("The {field} template failed for sheet {sheet_counter}: {source}")]
    Evaluation {
        field: TemplateField,
        sheet_counter: usize,
        source: EvalError,
    },

    #[error("The {field} template produced a blank name for sheet {sheet_counter}")]
    BlankName {
        field: TemplateField,
        sheet_counter: usize,
    },

    #[error("Duplicate {field} '{name}' for sheets {first} and {second}")]
    Duplicate {
        field: TemplateField,
        name: String,
        first: usize,
        second: usize,
    },
}

/// The main error enum for all high-level sheet set operations.
#[derive(Error, Debug)]
pub enum SheetSetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Unknown policy preset '{0}'")]
    UnknownPreset(String),

    #[error("Naming error: {0}")]
    Naming(#[from] NamingError),

    #[error("Template error: {0}")]
    SafeEval(#[from] SafeEvalError),

    #[error("Unknown {kind} '{name}'")]
    UnknownGroup { kind: &'static str, name: String },
}

impl From<ValidationError> for SheetSetError {
    fn from(e: ValidationError) -> Self {
        SheetSetError::SafeEval(e.into())
    }
}

impl From<EvalError> for SheetSetError {
    fn from(e: EvalError) -> Self {
        SheetSetError::SafeEval(e.into())
    }
}
