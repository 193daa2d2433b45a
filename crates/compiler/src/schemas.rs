/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 */
use serde_json::Value;

/// Bundle manifest schema, embedded at compile time
const BUNDLE_SCHEMA_JSON: &str = include_str!("../../../schemas/bundle.schema.v1.json");

/// Load the bundle manifest schema
///
/// Returns the parsed JSON schema as a `serde_json::Value`.
///
/// # Panics
///
/// Panics if the embedded schema JSON is invalid (this should never happen).
#[must_use]
pub fn load_bundle_schema() -> Value {
    serde_json::from_str(BUNDLE_SCHEMA_JSON)
        .expect("Failed to parse embedded bundle schema - this should never happen")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bundle_schema() {
        let schema = load_bundle_schema();
        assert!(schema.is_object());
        assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
        assert!(schema["properties"]["steps"].is_object());
    }
}
