//! Shared CLI utilities

pub mod config;
pub mod http;
