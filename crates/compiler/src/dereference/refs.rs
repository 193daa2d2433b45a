/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Classification of `$ref` strings and resolution of relative refs against
 * the location of the document that contains them.
 */

use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// Where relative refs found in the current document are resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefBase {
    /// A directory on the local filesystem.
    Directory(PathBuf),
    /// The URL of a document fetched over HTTP.
    Url(String),
}

/// The address form of a `$ref` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind {
    /// `#/...` pointer into the current document. Never followed.
    Fragment,
    /// Absolute URL.
    Http(String),
    /// `org/name` artifact definition in the Massdriver registry.
    Registry { org: String, name: String },
    /// Relative or absolute filesystem path.
    File(PathBuf),
    /// Explicit `file://` URL. Only valid in documents read from disk.
    LocalFile(PathBuf),
}

fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("scheme pattern is valid")
    })
}

fn registry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_-]+)/([A-Za-z0-9_-]+)$").expect("registry pattern is valid")
    })
}

impl RefKind {
    /// Classify a `$ref` string.
    pub fn classify(reference: &str) -> Self {
        if reference.starts_with('#') {
            return Self::Fragment;
        }
        if let Some(path) = reference.strip_prefix("file://") {
            return Self::LocalFile(PathBuf::from(path));
        }
        if scheme_pattern().is_match(reference) {
            return Self::Http(reference.to_string());
        }
        if let Some(captures) = registry_pattern().captures(reference) {
            return Self::Registry {
                org: captures[1].to_string(),
                name: captures[2].to_string(),
            };
        }
        Self::File(PathBuf::from(reference))
    }
}

/// Lexically normalize a path, folding `.` and `..` components.
///
/// The filesystem is not consulted, so this works for in-memory filesystems and
/// for paths that do not exist yet.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match normalized.components().next_back() {
                    Some(Component::Normal(_)) => normalized.pop(),
                    _ => false,
                };
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Resolve a relative reference against the URL of the referencing document.
pub fn join_url(base: &str, reference: &str) -> String {
    let (origin, path) = split_origin(base);
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let mut segments: Vec<&str> = if reference.starts_with('/') {
        Vec::new()
    } else {
        let mut dir: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if !path.ends_with('/') {
            dir.pop();
        }
        dir
    };

    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("{origin}/{}", segments.join("/"))
}

fn split_origin(url: &str) -> (&str, &str) {
    let authority_start = url.find("://").map_or(0, |i| i + 3);
    match url[authority_start..].find('/') {
        Some(offset) => url.split_at(authority_start + offset),
        None => (url, ""),
    }
}
