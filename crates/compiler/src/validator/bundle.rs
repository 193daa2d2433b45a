/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 */

use serde_json::Value;
use std::collections::HashSet;
use std::path::{Component, Path};

use crate::validator::common::validate_with_schema;
use crate::validator::error::{ValidationError, ValidationResult};

/// Validate a bundle manifest against the manifest schema.
pub fn validate_bundle(schema: &Value, file_path: &str, data: &Value) -> ValidationResult {
    validate_with_schema(schema, file_path, data, validate_step_rules)
}

/// Step rules the schema cannot express.
fn validate_step_rules(file_path: &str, data: &Value) -> Vec<ValidationError> {
    let Some(steps) = data.get("steps").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, step) in steps.iter().enumerate() {
        let Some(path) = step.get("path").and_then(Value::as_str) else {
            continue;
        };

        if !seen.insert(path) {
            errors.push(
                ValidationError::new(file_path, format!("Duplicate step path: '{path}'"))
                    .at(format!("/steps/{index}/path"))
                    .suggest("Each step must use its own directory"),
            );
        }

        if escapes_bundle(Path::new(path)) {
            errors.push(
                ValidationError::new(
                    file_path,
                    format!("Step path '{path}' must stay inside the bundle directory"),
                )
                .at(format!("/steps/{index}/path"))
                .suggest("Use a path relative to massdriver.yaml, such as 'src'"),
            );
        }
    }

    errors
}

fn escapes_bundle(path: &Path) -> bool {
    path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
