//! Test helpers for unit tests
//!
//! Shared utilities for unit tests within the CLI crate. Both guards touch
//! process-wide state, so tests using them must be `#[serial]`.
//! For integration tests, see `tests/integration_test_helpers.rs`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Changes the current working directory and restores it when dropped.
pub struct DirGuard {
    original_dir: PathBuf,
}

impl DirGuard {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        let original_dir = std::env::current_dir()?;
        std::env::set_current_dir(path)?;
        Ok(DirGuard { original_dir })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original_dir);
    }
}

/// Sets an environment variable and restores its previous value when dropped.
pub struct EnvGuard {
    key: &'static str,
    previous: Option<OsString>,
}

impl EnvGuard {
    pub fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        let previous = std::env::var_os(key);
        std::env::set_var(key, value);
        EnvGuard { key, previous }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(value) => std::env::set_var(self.key, value),
            None => std::env::remove_var(self.key),
        }
    }
}
