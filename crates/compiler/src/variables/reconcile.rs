/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Reconciliation of generated `.auto.tfvars.json` files with the current schema.
 * Values already assigned by the user survive a rebuild.
 */

use serde_json::{Map, Value};

use crate::error::VariableError;
use crate::variables::{required_names, schema_properties};

/// Reconcile a connections tfvars file with the connections schema.
///
/// Names present in both keep their existing value, names new to the schema
/// are set to null, and names the schema no longer declares are dropped. A
/// schema without properties yields an empty object. Output keys are sorted.
///
/// `existing` is the parsed file, or `Value::Null` when there is none.
///
/// # Errors
///
/// Returns `VariableError::SchemaShape` when the schema properties or the
/// existing file are not objects.
pub fn reconcile_variables(schema: &Value, existing: &Value) -> Result<Value, VariableError> {
    reconcile(schema, existing, "connections", |_| Value::Null)
}

/// Reconcile a params tfvars file with the params schema.
///
/// Same retention rules as [`reconcile_variables`], except that a param new to
/// the schema starts from the `default` the schema declares for it, if any.
///
/// # Errors
///
/// Returns `VariableError::SchemaShape` when the schema or existing file is
/// malformed.
pub fn reconcile_params(schema: &Value, existing: &Value) -> Result<Value, VariableError> {
    let reconciled = reconcile(schema, existing, "params", |property| {
        property.get("default").cloned().unwrap_or(Value::Null)
    })?;

    for name in required_names(schema)? {
        if reconciled.get(&name).map_or(false, Value::is_null) {
            tracing::warn!(param = %name, "required param has no value in _params.auto.tfvars.json");
        }
    }

    Ok(reconciled)
}

fn reconcile(
    schema: &Value,
    existing: &Value,
    label: &str,
    seed: impl Fn(&Map<String, Value>) -> Value,
) -> Result<Value, VariableError> {
    let properties = match schema_properties(schema, label)? {
        Some(properties) if !properties.is_empty() => properties,
        _ => return Ok(Value::Object(Map::new())),
    };

    let existing = match existing {
        Value::Null => None,
        Value::Object(values) => Some(values),
        _ => {
            return Err(VariableError::SchemaShape(format!(
                "expected existing {label} variables to be an object"
            )))
        }
    };

    let mut names: Vec<&String> = properties.keys().collect();
    names.sort();

    let mut reconciled = Map::with_capacity(names.len());
    for name in names {
        let property = properties[name.as_str()].as_object().ok_or_else(|| {
            VariableError::SchemaShape(format!(
                "expected {label} schema properties to be an object"
            ))
        })?;
        let value = existing
            .and_then(|values| values.get(name.as_str()))
            .cloned()
            .unwrap_or_else(|| seed(property));
        reconciled.insert(name.clone(), value);
    }

    if let Some(values) = existing {
        for stale in values.keys().filter(|key| !properties.contains_key(key.as_str())) {
            tracing::debug!(
                variable = %stale,
                "dropping variable no longer in the {} schema",
                label
            );
        }
    }

    Ok(Value::Object(reconciled))
}
