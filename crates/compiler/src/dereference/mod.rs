/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Recursive `$ref` resolution for bundle schemas.
 *
 * Refs can point at local files, absolute URLs, or `org/name` artifact
 * definitions in the Massdriver registry. Fragment refs (`#/...`) are left for
 * the consumer of the schema.
 */

pub mod refs;
pub mod source;

#[cfg(test)]
mod tests;

use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::DereferenceError;
use crate::value::{merge_ref_siblings, REF_KEY};

pub use refs::{RefBase, RefKind};
pub use source::{Filesystem, HttpClient, HttpResponse, OfflineHttpClient, OsFilesystem};

/// Default Massdriver API used for registry refs.
pub const DEFAULT_REGISTRY_URL: &str = "https://api.massdriver.cloud";

/// Header carrying the API key on registry requests.
pub const API_KEY_HEADER: &str = "X-Md-Api-Key";

/// Refs nested deeper than this are rejected.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Everything a dereference needs from its caller.
pub struct DereferenceOptions<'a> {
    pub http: &'a dyn HttpClient,
    pub fs: &'a dyn Filesystem,
    /// Where relative refs in the top-level document resolve from.
    pub base: RefBase,
    pub registry_url: String,
    /// Sent only to the registry, never to arbitrary URLs.
    pub api_key: Option<String>,
    pub max_depth: usize,
}

impl<'a> DereferenceOptions<'a> {
    pub fn new(http: &'a dyn HttpClient, fs: &'a dyn Filesystem, base: RefBase) -> Self {
        Self {
            http,
            fs,
            base,
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            api_key: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Resolve relative refs against a directory.
    pub fn in_directory(
        http: &'a dyn HttpClient,
        fs: &'a dyn Filesystem,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self::new(http, fs, RefBase::Directory(dir.into()))
    }

    #[must_use]
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Resolve every `$ref` in `value`, returning a new document.
///
/// Objects holding a `$ref` are replaced by the referenced content with the
/// object's other keys written on top of it. Referenced content is itself
/// dereferenced, relative to where it was loaded from.
///
/// # Errors
///
/// Returns a `DereferenceError` on the first ref that cannot be read, fetched,
/// or decoded, and when refs form a cycle or nest deeper than
/// `options.max_depth`. No partial document is returned.
pub fn dereference(value: &Value, options: &DereferenceOptions<'_>) -> Result<Value, DereferenceError> {
    let mut resolver = Resolver {
        options,
        chain: Vec::new(),
    };
    resolver.walk(value, &options.base)
}

/// A ref resolved to a concrete location.
struct Target {
    /// Canonical path or URL, used for cycle detection and error messages.
    address: String,
    location: Location,
    /// Base for refs found inside the fetched document.
    base: RefBase,
}

enum Location {
    File(PathBuf),
    Http { url: String, authenticated: bool },
}

struct Resolver<'o, 'a> {
    options: &'o DereferenceOptions<'a>,
    /// Addresses of the refs currently being expanded, outermost first.
    chain: Vec<String>,
}

impl Resolver<'_, '_> {
    fn walk(&mut self, value: &Value, base: &RefBase) -> Result<Value, DereferenceError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.walk(item, base))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => match map.get(REF_KEY) {
                Some(Value::String(reference)) => self.resolve(reference, map, base),
                _ => self.walk_object(map, base).map(Value::Object),
            },
            scalar => Ok(scalar.clone()),
        }
    }

    fn walk_object(
        &mut self,
        map: &Map<String, Value>,
        base: &RefBase,
    ) -> Result<Map<String, Value>, DereferenceError> {
        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            out.insert(key.clone(), self.walk(value, base)?);
        }
        Ok(out)
    }

    fn resolve(
        &mut self,
        reference: &str,
        node: &Map<String, Value>,
        base: &RefBase,
    ) -> Result<Value, DereferenceError> {
        let Some(target) = self.locate(reference, base)? else {
            return Ok(Value::Object(node.clone()));
        };

        if self.chain.len() >= self.options.max_depth {
            return Err(DereferenceError::MaxDepthExceeded {
                reference: reference.to_string(),
                max_depth: self.options.max_depth,
            });
        }

        if self.chain.contains(&target.address) {
            return Err(DereferenceError::CycleDetected {
                address: target.address,
            });
        }

        tracing::debug!(reference, address = %target.address, "resolving ref");
        let fetched = self.load(&target)?;

        self.chain.push(target.address);
        let expanded = self.walk(&fetched, &target.base);
        self.chain.pop();
        let expanded = expanded?;

        let mut siblings = node.clone();
        siblings.remove(REF_KEY);
        let siblings = self.walk_object(&siblings, base)?;

        Ok(merge_ref_siblings(expanded, siblings))
    }

    /// `None` for fragment refs, which are never followed.
    fn locate(&self, reference: &str, base: &RefBase) -> Result<Option<Target>, DereferenceError> {
        let target = match RefKind::classify(reference) {
            RefKind::Fragment => return Ok(None),
            RefKind::Http(url) => self.http_target(url),
            RefKind::Registry { org, name } => {
                self.http_target(format!("{}/{org}/{name}", self.registry_prefix()))
            }
            RefKind::File(path) => match base {
                RefBase::Directory(dir) => file_target(&refs::normalize_path(&dir.join(path))),
                RefBase::Url(url) => self.http_target(refs::join_url(url, &path.to_string_lossy())),
            },
            RefKind::LocalFile(path) => match base {
                RefBase::Directory(_) => file_target(&refs::normalize_path(&path)),
                RefBase::Url(url) => {
                    return Err(DereferenceError::LocalRefFromRemote {
                        reference: reference.to_string(),
                        document: url.clone(),
                    })
                }
            },
        };
        Ok(Some(target))
    }

    /// `{registry_url}/artifact-definitions`
    fn registry_prefix(&self) -> String {
        format!(
            "{}/artifact-definitions",
            self.options.registry_url.trim_end_matches('/')
        )
    }

    /// Refs fetched over HTTP resolve their own relative refs against the
    /// server. The API key goes along only for artifact definitions.
    fn http_target(&self, url: String) -> Target {
        let authenticated = url.starts_with(&format!("{}/", self.registry_prefix()));
        Target {
            address: url.clone(),
            base: RefBase::Url(url.clone()),
            location: Location::Http { url, authenticated },
        }
    }

    fn load(&self, target: &Target) -> Result<Value, DereferenceError> {
        let bytes = match &target.location {
            Location::File(path) => self.read_file(path)?,
            Location::Http { url, authenticated } => self.fetch(url, *authenticated)?,
        };
        serde_json::from_slice(&bytes).map_err(|source| DereferenceError::Decode {
            address: target.address.clone(),
            source,
        })
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, DereferenceError> {
        self.options.fs.read(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DereferenceError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DereferenceError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }

    fn fetch(&self, url: &str, authenticated: bool) -> Result<Vec<u8>, DereferenceError> {
        let mut headers = vec![("Accept", "application/json")];
        if authenticated {
            if let Some(api_key) = self.options.api_key.as_deref() {
                headers.push((API_KEY_HEADER, api_key));
            }
        }

        let response =
            self.options
                .http
                .get(url, &headers)
                .map_err(|source| DereferenceError::Transport {
                    url: url.to_string(),
                    source,
                })?;

        if !response.is_success() {
            return Err(DereferenceError::Status {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(response.body)
    }
}

fn file_target(path: &Path) -> Target {
    let dir = path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Target {
        address: path.display().to_string(),
        location: Location::File(path.to_path_buf()),
        base: RefBase::Directory(dir),
    }
}
