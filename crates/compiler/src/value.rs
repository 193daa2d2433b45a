/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Helpers shared by the dereferencer and the variable compiler.
 */

use serde::Serialize;
use serde_json::{Map, Value};

/// Key that marks a reference node.
pub const REF_KEY: &str = "$ref";

/// Merge the content a `$ref` resolved to with the keys that sat next to the `$ref`.
///
/// The target's top-level keys form the base and every sibling is written on top,
/// so a sibling always wins over a same-named key from the target. A target that
/// is not an object is replaced by the siblings, unless there are none.
pub fn merge_ref_siblings(target: Value, siblings: Map<String, Value>) -> Value {
    match target {
        Value::Object(mut base) => {
            for (key, value) in siblings {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        other if siblings.is_empty() => other,
        _ => Value::Object(siblings),
    }
}

/// Serialize a value the way every generated file is written:
/// two-space indented JSON followed by a newline.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if the value cannot be serialized.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}
