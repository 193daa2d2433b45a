/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Variable compiler - turns resolved bundle schemas into Terraform/OpenTofu
 * `variable` blocks and keeps `.auto.tfvars.json` files in step with them.
 */

pub mod reconcile;


use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use crate::error::VariableError;
use crate::value::to_canonical_json;

pub use reconcile::{reconcile_params, reconcile_variables};

/// Schema extension marking a property as sensitive.
pub const SENSITIVE_KEY: &str = "$md.sensitive";

/// Name of the variable every provisioner receives with deployment metadata.
pub const MD_METADATA_VARIABLE: &str = "md_metadata";

/// Terraform type a schema property compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    String,
    Number,
    Bool,
    Any,
}

impl VariableType {
    /// Map a JSON Schema `type` keyword to a Terraform type.
    ///
    /// A list of types picks the first entry that is not `"null"`. Objects,
    /// arrays and anything unrecognised compile to `any`.
    pub fn from_schema(schema_type: Option<&Value>) -> Self {
        let name = match schema_type {
            Some(Value::String(name)) => Some(name.as_str()),
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .find(|name| *name != "null"),
            _ => None,
        };

        match name {
            Some("string") => Self::String,
            Some("integer" | "number") => Self::Number,
            Some("boolean") => Self::Bool,
            _ => Self::Any,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Any => "any",
        }
    }
}

/// One variable derived from a schema property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub name: String,
    pub var_type: VariableType,
    pub required: bool,
    pub sensitive: bool,
}

#[derive(Serialize)]
struct VariableBlock<'a> {
    variable: BTreeMap<&'a str, TerraformVariable>,
}

#[derive(Serialize)]
struct TerraformVariable {
    #[serde(rename = "type")]
    var_type: &'static str,
    /// Always null; defaults belong to the params, not the generated code.
    default: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    sensitive: bool,
}

/// Build declarations for every property, sorted by name.
///
/// # Errors
///
/// Returns `VariableError::SchemaShape` if any property is not an object.
pub fn declarations(
    properties: &Map<String, Value>,
    required: &[String],
) -> Result<Vec<VariableDeclaration>, VariableError> {
    let required: HashSet<&str> = required.iter().map(String::as_str).collect();

    let mut declarations = properties
        .iter()
        .map(|(name, property)| {
            let property = property.as_object().ok_or_else(|| {
                VariableError::SchemaShape(format!(
                    "expected schema property {name} to be an object"
                ))
            })?;
            Ok(VariableDeclaration {
                name: name.clone(),
                var_type: VariableType::from_schema(property.get("type")),
                required: required.contains(name.as_str()),
                sensitive: property
                    .get(SENSITIVE_KEY)
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            })
        })
        .collect::<Result<Vec<_>, VariableError>>()?;

    declarations.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(declarations)
}

/// Compile schema properties to a `*_variables.tf.json` document.
///
/// An empty property map compiles to `{}` because an empty `variable` block
/// is rejected by Terraform.
///
/// # Errors
///
/// Returns `VariableError::SchemaShape` for malformed properties and
/// `VariableError::Serialization` if encoding fails.
pub fn compile_variables(
    properties: &Map<String, Value>,
    required: &[String],
) -> Result<Vec<u8>, VariableError> {
    if properties.is_empty() {
        return Ok(b"{}\n".to_vec());
    }

    let declarations = declarations(properties, required)?;
    render(&declarations)
}

/// Compile a resolved schema's `properties` and `required` keywords.
///
/// # Errors
///
/// Returns `VariableError::SchemaShape` when `properties` is not an object or
/// `required` is not a list of strings.
pub fn compile_schema_variables(schema: &Value) -> Result<Vec<u8>, VariableError> {
    let empty = Map::new();
    let properties = schema_properties(schema, "schema")?.unwrap_or(&empty);
    let required = required_names(schema)?;
    compile_variables(properties, &required)
}

/// The `md_metadata` declaration written alongside the params and connections.
///
/// # Errors
///
/// Returns `VariableError::Serialization` if encoding fails.
pub fn md_metadata_variables() -> Result<Vec<u8>, VariableError> {
    render(&[VariableDeclaration {
        name: MD_METADATA_VARIABLE.to_string(),
        var_type: VariableType::Any,
        required: true,
        sensitive: false,
    }])
}

fn render(declarations: &[VariableDeclaration]) -> Result<Vec<u8>, VariableError> {
    let block = VariableBlock {
        variable: declarations
            .iter()
            .map(|declaration| {
                (
                    declaration.name.as_str(),
                    TerraformVariable {
                        var_type: declaration.var_type.as_str(),
                        default: None,
                        sensitive: declaration.sensitive,
                    },
                )
            })
            .collect(),
    };
    Ok(to_canonical_json(&block)?)
}

/// Read `properties` from a schema. `None` when the schema has no properties.
pub(crate) fn schema_properties<'s>(
    schema: &'s Value,
    label: &str,
) -> Result<Option<&'s Map<String, Value>>, VariableError> {
    match schema.get("properties") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(properties)) => Ok(Some(properties)),
        Some(_) => Err(VariableError::SchemaShape(format!(
            "expected {label} schema properties to be an object"
        ))),
    }
}

/// Read the `required` list from a schema.
pub(crate) fn required_names(schema: &Value) -> Result<Vec<String>, VariableError> {
    match schema.get("required") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str().map(str::to_string).ok_or_else(|| {
                    VariableError::SchemaShape(
                        "expected schema required to be a list of strings".to_string(),
                    )
                })
            })
            .collect(),
        Some(_) => Err(VariableError::SchemaShape(
            "expected schema required to be a list of strings".to_string(),
        )),
    }
}
