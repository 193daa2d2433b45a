//! CLI commands

pub mod bundle;
pub mod completion;
pub mod schema;
