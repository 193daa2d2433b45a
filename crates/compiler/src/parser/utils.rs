/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Utility functions for parsing YAML and JSON content.
 * Works only with in-memory strings (no file I/O).
 */

use crate::parser::error::ParseError;
use serde_json::{Map, Number, Value};
use yaml_rust::{Yaml, YamlLoader};

/// Parse YAML or JSON content from a string.
///
/// The format is picked from the file extension when a path is given;
/// otherwise JSON is tried first, then YAML.
///
/// # Errors
///
/// Returns `ParseError::InvalidJson` or `ParseError::InvalidYaml` when the
/// content does not parse.
pub fn parse_yaml_or_json(content: &str, file_path: Option<&str>) -> Result<Value, ParseError> {
    if let Some(path) = file_path {
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            return parse_json(content).map_err(ParseError::InvalidJson);
        }
        if path_lower.ends_with(".yaml") || path_lower.ends_with(".yml") {
            return parse_yaml(content).map_err(ParseError::InvalidYaml);
        }
    }

    match parse_json(content) {
        Ok(value) => Ok(value),
        Err(_) => parse_yaml(content).map_err(ParseError::InvalidYaml),
    }
}

fn parse_json(content: &str) -> Result<Value, String> {
    serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
}

/// Parse YAML with `yaml-rust` and convert the first document to a JSON value.
/// Mapping order is preserved.
fn parse_yaml(content: &str) -> Result<Value, String> {
    let docs = YamlLoader::load_from_str(content).map_err(|e| format!("YAML parse error: {e}"))?;

    let doc = docs
        .first()
        .ok_or_else(|| "YAML document is empty".to_string())?;

    yaml_to_json_value(doc).ok_or_else(|| "Failed to convert YAML to JSON value".to_string())
}

fn yaml_to_json_value(yaml: &Yaml) -> Option<Value> {
    match yaml {
        Yaml::Real(s) => Some(
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map_or_else(|| Value::String(s.clone()), Value::Number),
        ),
        Yaml::Integer(i) => Some(Value::from(*i)),
        Yaml::String(s) => Some(Value::String(s.clone())),
        Yaml::Boolean(b) => Some(Value::Bool(*b)),
        Yaml::Array(items) => items
            .iter()
            .map(yaml_to_json_value)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Yaml::Hash(hash) => {
            let mut map = Map::with_capacity(hash.len());
            for (k, v) in hash {
                map.insert(yaml_key(k)?, yaml_to_json_value(v)?);
            }
            Some(Value::Object(map))
        }
        Yaml::Null => Some(Value::Null),
        // Aliases are resolved by the loader; anything left is unusable
        Yaml::BadValue | Yaml::Alias(_) => None,
    }
}

fn yaml_key(yaml: &Yaml) -> Option<String> {
    match yaml {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let json = r#"{"name": "aws-rds", "steps": [{"path": "src"}]}"#;
        let result = parse_json(json).unwrap();
        assert_eq!(result["name"], "aws-rds");
        assert_eq!(result["steps"][0]["path"], "src");
    }

    #[test]
    fn test_parse_yaml_scalars() {
        let yaml = r"
name: aws-rds
replicas: 3
offset: -2
ratio: 0.5
enabled: true
missing: ~
";
        let result = parse_yaml(yaml).unwrap();
        assert_eq!(result["name"], "aws-rds");
        assert_eq!(result["replicas"], 3);
        assert_eq!(result["offset"], -2);
        assert_eq!(result["ratio"], 0.5);
        assert_eq!(result["enabled"], true);
        assert!(result["missing"].is_null());
    }

    #[test]
    fn test_parse_yaml_keeps_key_order() {
        let yaml = "zeta: 1\nalpha: 2\nmid: 3\n";
        let result = parse_yaml(yaml).unwrap();
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_yaml_nested_refs() {
        let yaml = r#"
connections:
  properties:
    vpc:
      $ref: massdriver/aws-vpc
"#;
        let result = parse_yaml(yaml).unwrap();
        assert_eq!(
            result["connections"]["properties"]["vpc"]["$ref"],
            "massdriver/aws-vpc"
        );
    }

    #[test]
    fn test_parse_yaml_or_json_by_extension() {
        let result = parse_yaml_or_json(r#"{"test": "value"}"#, Some("schema.json")).unwrap();
        assert_eq!(result["test"], "value");

        let result = parse_yaml_or_json("test: value", Some("massdriver.yaml")).unwrap();
        assert_eq!(result["test"], "value");
    }

    #[test]
    fn test_json_extension_rejects_yaml() {
        let result = parse_yaml_or_json("test: value", Some("schema.json"));
        assert!(matches!(result, Err(ParseError::InvalidJson(_))));
    }

    #[test]
    fn test_parse_yaml_or_json_falls_back_to_yaml() {
        let result = parse_yaml_or_json("test: value", None).unwrap();
        assert_eq!(result["test"], "value");
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(parse_yaml("key: [unclosed").is_err());
        assert!(parse_yaml("").is_err());
    }
}
