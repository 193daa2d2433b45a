/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Parser module for bundle manifests and schema documents.
 * This module works only with in-memory data (no file I/O).
 */

pub mod bundle;
pub mod error;
pub mod utils;

pub use bundle::{parse_manifest, Bundle, SchemaKind, Step, MANIFEST_FILE};
pub use error::ParseError;
pub use utils::parse_yaml_or_json;
