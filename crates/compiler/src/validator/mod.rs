/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 */

pub mod bundle;
pub mod common;
pub mod error;


use serde_json::Value;

use crate::schemas;
use crate::validator::bundle::validate_bundle as validate_bundle_impl;
use crate::validator::error::{ValidationError, ValidationResult};

/// Validates bundle manifests against the embedded manifest schema and the
/// rules the schema cannot express.
pub struct Validator {
    bundle_schema: Value,
}

impl Validator {
    /// Create a validator using the embedded manifest schema.
    pub fn new() -> Self {
        Self {
            bundle_schema: schemas::load_bundle_schema(),
        }
    }

    /// Create a validator with a custom manifest schema.
    pub fn with_schema(bundle_schema: Value) -> Self {
        Self { bundle_schema }
    }

    /// Validate a parsed `massdriver.yaml`.
    pub fn validate_bundle(&self, file_path: &str, data: &Value) -> ValidationResult {
        validate_bundle_impl(&self.bundle_schema, file_path, data)
    }

    /// Format validation errors for display.
    pub fn format_errors(&self, errors: &[ValidationError]) -> String {
        if errors.is_empty() {
            return String::new();
        }

        let mut error_lines = vec!["✗ Validation failed\n".to_string()];

        for error in errors {
            error_lines.push(error.file.clone());
            error_lines.push(format!("  Error: {}", error.message));

            if let Some(path) = &error.path {
                error_lines.push(format!("  Path: {path}"));
            }

            if let Some(suggestion) = &error.suggestion {
                error_lines.push(format!("  Suggestion: {suggestion}"));
            }

            error_lines.push(String::new());
        }

        error_lines.join("\n")
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
