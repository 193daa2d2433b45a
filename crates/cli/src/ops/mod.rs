//! Reusable operations behind the CLI commands
//!
//! Commands parse arguments and report results; the work itself lives here so
//! it can be exercised without going through the binary.

pub mod build;
