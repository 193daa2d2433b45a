//! Schema dereference command implementation

use crate::error::{CliError, CliResult};
use crate::utils::config::{load_config, Config};
use crate::utils::http::ReqwestHttpClient;
use massdriver_compiler::{
    dereference, parse_yaml_or_json, to_canonical_json, DereferenceOptions, HttpClient,
    OsFilesystem,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct Options {
    pub file: String,
    /// Write to this file instead of stdout
    pub output: Option<String>,
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("✗ Dereference failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<()> {
    let config = load_config()?;
    let http = ReqwestHttpClient::new(config.timeout)?;
    let bytes = dereference_file(Path::new(&options.file), &http, &config)?;

    match &options.output {
        Some(output) => {
            let output = PathBuf::from(output);
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output, bytes)?;
            eprintln!("✓ Wrote {}", output.display());
        }
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

/// Read a YAML or JSON schema and resolve its refs relative to the file's directory.
fn dereference_file(file: &Path, http: &dyn HttpClient, config: &Config) -> CliResult<Vec<u8>> {
    let content = fs::read_to_string(file)
        .map_err(|e| CliError::Message(format!("Failed to read {}: {e}", file.display())))?;
    let document = parse_yaml_or_json(&content, file.to_str())?;

    let base = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let options = DereferenceOptions::in_directory(http, &OsFilesystem, base)
        .with_registry_url(config.url.clone())
        .with_api_key(config.api_key.clone());

    let resolved = dereference(&document, &options)?;
    Ok(to_canonical_json(&resolved)?)
}
