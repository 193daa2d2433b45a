//! Massdriver Bundle Compiler Library
//!
//! Copyright 2025 Massdriver, Inc.
//! Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
//! See the LICENSE file in the project root for details.
//!
//! This library turns a bundle manifest into the files a provisioner consumes:
//! fully dereferenced JSON Schemas and Terraform/OpenTofu variable declarations.
//! It does no network I/O of its own; remote refs are fetched through the
//! [`HttpClient`] the caller provides.
//!
//! # Example
//!
//! ```rust,no_run
//! use massdriver_compiler::{
//!     compile_schema_variables, dereference, parse_manifest, Bundle, DereferenceOptions,
//!     OfflineHttpClient, OsFilesystem,
//! };
//!
//! let manifest = parse_manifest(&std::fs::read_to_string("massdriver.yaml").unwrap())?;
//! let bundle = Bundle::from_value(&manifest)?;
//!
//! let options = DereferenceOptions::in_directory(&OfflineHttpClient, &OsFilesystem, ".");
//! let params = dereference(&bundle.params, &options)?;
//! let variables = compile_schema_variables(&params)?;
//! # Ok::<(), massdriver_compiler::CompilerError>(())
//! ```

pub mod dereference;
pub mod error;
pub mod parser;
pub mod schemas;
pub mod validator;
pub mod value;
pub mod variables;

pub use dereference::{
    dereference, DereferenceOptions, Filesystem, HttpClient, HttpResponse, OfflineHttpClient,
    OsFilesystem, RefBase, RefKind,
};
pub use error::{CompilerError, DereferenceError, ParseError, TransportError, VariableError};
pub use parser::{parse_manifest, parse_yaml_or_json, Bundle, SchemaKind, Step};
pub use value::to_canonical_json;
pub use variables::{
    compile_schema_variables, compile_variables, md_metadata_variables, reconcile_params,
    reconcile_variables, VariableDeclaration, VariableType,
};

use serde_json::Value;
use validator::Validator;

/// Validate a parsed bundle manifest against the embedded manifest schema.
///
/// # Errors
///
/// Returns `CompilerError::Validation` with every problem found, formatted for
/// the terminal.
pub fn validate_bundle(file_path: &str, manifest: &Value) -> Result<(), CompilerError> {
    let validator = Validator::new();
    let result = validator.validate_bundle(file_path, manifest);
    if result.valid {
        Ok(())
    } else {
        Err(CompilerError::Validation(
            validator.format_errors(&result.errors),
        ))
    }
}
