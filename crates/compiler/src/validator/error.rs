/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 */

use jsonschema::error::ValidationErrorKind;
use serde::{Deserialize, Serialize};

/// A single problem found in a bundle manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    pub file: String,
    pub message: String,
    /// JSON pointer to the offending value, if known.
    pub path: Option<String>,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(file: &str, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            message: message.into(),
            path: None,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Outcome of validating one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Result for a list of errors; valid when the list is empty.
    pub fn invalid(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Convert a `jsonschema` error into a `ValidationError`.
///
/// `jsonschema` reports no line/column information, only the JSON pointer of
/// the failing instance.
pub fn convert_jsonschema_error(
    file_path: &str,
    error: &jsonschema::ValidationError,
) -> ValidationError {
    let instance_path = error.instance_path.to_string();

    ValidationError {
        file: file_path.to_string(),
        message: error.to_string(),
        path: if instance_path.is_empty() {
            None
        } else {
            Some(instance_path)
        },
        suggestion: suggestion_for(&error.kind),
    }
}

fn suggestion_for(kind: &ValidationErrorKind) -> Option<String> {
    let suggestion = match kind {
        ValidationErrorKind::Required { .. } => "Add the missing field to massdriver.yaml",
        ValidationErrorKind::Type { .. } => "Check the field type matches the manifest schema",
        ValidationErrorKind::Enum { .. } => "Use one of the allowed values",
        ValidationErrorKind::Pattern { .. } => {
            "Bundle names use lowercase letters, digits and dashes"
        }
        _ => return None,
    };
    Some(suggestion.to_string())
}
