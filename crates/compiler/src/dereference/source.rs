/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Seams through which the dereferencer reaches the outside world. The compiler
 * never opens sockets itself; callers hand in an `HttpClient`.
 */

use crate::error::TransportError;
use std::io;
use std::path::Path;

/// Raw response to a ref fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Synchronous HTTP GET used for URL and registry refs.
pub trait HttpClient {
    /// Perform a single GET. No retries are expected.
    ///
    /// # Errors
    ///
    /// Returns a transport error when no response could be obtained. Non-2xx
    /// responses are returned as `Ok` and judged by the caller.
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError>;
}

/// Read access to the filesystem holding bundle schemas.
pub trait Filesystem {
    /// Read an entire file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error. `ErrorKind::NotFound` is reported to
    /// the user as a missing ref target.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// `Filesystem` backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// `HttpClient` for callers that never expect remote refs. Every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineHttpClient;

impl HttpClient for OfflineHttpClient {
    fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        Err(format!("network access is disabled, cannot fetch {url}").into())
    }
}
