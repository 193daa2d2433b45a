/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 */
use std::path::PathBuf;
use thiserror::Error;

pub use crate::parser::error::ParseError;

/// Boxed error returned by `HttpClient` implementations.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for the compiler
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Dereference(#[from] DereferenceError),

    #[error(transparent)]
    Variables(#[from] VariableError),
}

/// Errors raised while resolving `$ref` nodes.
///
/// Every variant carries the path or URL that was attempted so the message is
/// useful once it reaches the terminal.
#[derive(Error, Debug)]
pub enum DereferenceError {
    #[error("failed to resolve ref: open {}: file does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read ref {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("received non-200 response getting ref {status} {url}")]
    Status { status: u16, url: String },

    #[error("failed to fetch ref {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to decode ref {address}: {source}")]
    Decode {
        address: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cycle detected while resolving ref {address}")]
    CycleDetected { address: String },

    #[error("ref {reference} exceeds the maximum nesting depth of {max_depth}")]
    MaxDepthExceeded { reference: String, max_depth: usize },

    #[error("local file ref {reference} is not allowed in remote document {document}")]
    LocalRefFromRemote { reference: String, document: String },
}

/// Errors raised while turning schemas into variable blocks and tfvars files.
#[derive(Error, Debug)]
pub enum VariableError {
    #[error("{0}")]
    SchemaShape(String),

    #[error("failed to serialize variables: {0}")]
    Serialization(#[from] serde_json::Error),
}
