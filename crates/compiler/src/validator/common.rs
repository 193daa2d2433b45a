/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 */

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::validator::error::{convert_jsonschema_error, ValidationError, ValidationResult};

/// Validate `data` against `schema`, then run `extra_rules` and report both
/// sets of errors together.
pub fn validate_with_schema<F>(
    schema: &Value,
    file_path: &str,
    data: &Value,
    extra_rules: F,
) -> ValidationResult
where
    F: FnOnce(&str, &Value) -> Vec<ValidationError>,
{
    let compiled = match JSONSchema::compile(schema) {
        Ok(compiled) => compiled,
        Err(err) => {
            return ValidationResult::invalid(vec![ValidationError::new(
                file_path,
                format!("Failed to compile schema: {err}"),
            )]);
        }
    };

    let mut errors: Vec<ValidationError> = match compiled.validate(data) {
        Ok(()) => Vec::new(),
        Err(schema_errors) => schema_errors
            .map(|error| convert_jsonschema_error(file_path, &error))
            .collect(),
    };
    errors.extend(extra_rules(file_path, data));

    ValidationResult::invalid(errors)
}
