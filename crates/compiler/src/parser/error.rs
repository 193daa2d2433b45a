/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Parser-specific error types.
 */

use thiserror::Error;

/// Why a bundle manifest or schema file could not be read into a value.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid YAML document: {0}")]
    InvalidYaml(String),

    #[error("Invalid JSON document: {0}")]
    InvalidJson(String),

    #[error("Bundle manifest must be a mapping, found {0}")]
    ManifestNotMapping(&'static str),

    #[error("Bundle manifest is missing required field \"{0}\"")]
    MissingField(String),

    #[error("Bundle manifest has a field of the wrong type: {0}")]
    InvalidFieldType(String),
}

/// JSON type name used in manifest errors.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}
