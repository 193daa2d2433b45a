//! Bundle build operation
//!
//! Turns a bundle directory into the files its provisioners consume:
//! dereferenced `schema-*.json` files and, for every Terraform/OpenTofu step,
//! variable declarations plus reconciled `.auto.tfvars.json` files.

use crate::error::{CliError, CliResult};
use crate::utils::config::Config;
use massdriver_compiler::parser::MANIFEST_FILE;
use massdriver_compiler::{
    compile_schema_variables, dereference, md_metadata_variables, parse_manifest,
    reconcile_params, reconcile_variables, to_canonical_json, validate_bundle, Bundle,
    DereferenceOptions, HttpClient, OsFilesystem, SchemaKind,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const PARAMS_VARIABLES_FILE: &str = "_params_variables.tf.json";
pub const CONNECTIONS_VARIABLES_FILE: &str = "_connections_variables.tf.json";
pub const MD_VARIABLES_FILE: &str = "_md_variables.tf.json";
pub const PARAMS_TFVARS_FILE: &str = "_params.auto.tfvars.json";
pub const CONNECTIONS_TFVARS_FILE: &str = "_connections.auto.tfvars.json";

const OPERATOR_GUIDES: [&str; 2] = ["operator.md", "operator.mdx"];

/// Options for building a bundle
pub struct BuildOptions {
    /// Directory holding `massdriver.yaml`
    pub bundle_dir: PathBuf,
    /// Where `schema-*.json` files go (defaults to the bundle directory)
    pub output_dir: Option<PathBuf>,
}

/// What a build produced
#[derive(Debug)]
pub struct BuildReport {
    pub bundle_name: String,
    /// Every file written, in write order
    pub written: Vec<PathBuf>,
    pub operator_guide: Option<PathBuf>,
}

/// Build a bundle.
///
/// Every output is computed before the first file is written, so a bad ref
/// or malformed tfvars file leaves the bundle directory untouched.
pub fn build_bundle(
    options: &BuildOptions,
    config: &Config,
    http: &dyn HttpClient,
) -> CliResult<BuildReport> {
    let manifest_path = options.bundle_dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&manifest_path).map_err(|e| {
        CliError::Message(format!(
            "Failed to read bundle manifest {}: {e}",
            manifest_path.display()
        ))
    })?;

    let manifest = parse_manifest(&content)?;
    validate_bundle(&manifest_path.display().to_string(), &manifest)?;
    let bundle = Bundle::from_value(&manifest)?;

    let deref_options = DereferenceOptions::in_directory(http, &OsFilesystem, &options.bundle_dir)
        .with_registry_url(config.url.clone())
        .with_api_key(config.api_key.clone());

    let output_dir = options.output_dir.as_deref().unwrap_or(&options.bundle_dir);
    let mut outputs: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    let mut params = Value::Null;
    let mut connections = Value::Null;

    for kind in SchemaKind::ALL {
        tracing::debug!(schema = kind.as_str(), "dereferencing schema");
        let schema = dereference(bundle.schema(kind), &deref_options)?;
        outputs.push((output_dir.join(kind.file_name()), to_canonical_json(&schema)?));

        match kind {
            SchemaKind::Params => params = schema,
            SchemaKind::Connections => connections = schema,
            SchemaKind::Artifacts | SchemaKind::Ui => {}
        }
    }

    for step in bundle.terraform_steps() {
        let step_dir = options.bundle_dir.join(&step.path);
        if !step_dir.is_dir() {
            return Err(CliError::Message(format!(
                "Step directory not found for '{}': {}",
                step.path,
                step_dir.display()
            )));
        }
        outputs.extend(compile_step(&step_dir, &params, &connections)?);
    }

    let operator_guide = OPERATOR_GUIDES
        .iter()
        .map(|name| options.bundle_dir.join(name))
        .find(|path| path.is_file());
    match &operator_guide {
        Some(path) => tracing::info!(path = %path.display(), "found operator guide"),
        None => tracing::debug!("no operator guide in bundle"),
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (path, bytes) in outputs {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), "wrote file");
        written.push(path);
    }

    Ok(BuildReport {
        bundle_name: bundle.name,
        written,
        operator_guide,
    })
}

/// Variable declarations and reconciled tfvars for one step directory.
fn compile_step(
    step_dir: &Path,
    params: &Value,
    connections: &Value,
) -> CliResult<Vec<(PathBuf, Vec<u8>)>> {
    let existing_connections = read_optional_json(&step_dir.join(CONNECTIONS_TFVARS_FILE))?;
    let existing_params = read_optional_json(&step_dir.join(PARAMS_TFVARS_FILE))?;

    Ok(vec![
        (
            step_dir.join(PARAMS_VARIABLES_FILE),
            compile_schema_variables(params)?,
        ),
        (
            step_dir.join(CONNECTIONS_VARIABLES_FILE),
            compile_schema_variables(connections)?,
        ),
        (step_dir.join(MD_VARIABLES_FILE), md_metadata_variables()?),
        (
            step_dir.join(CONNECTIONS_TFVARS_FILE),
            to_canonical_json(&reconcile_variables(connections, &existing_connections)?)?,
        ),
        (
            step_dir.join(PARAMS_TFVARS_FILE),
            to_canonical_json(&reconcile_params(params, &existing_params)?)?,
        ),
    ])
}

/// Parse a JSON file, or `Value::Null` when it does not exist.
fn read_optional_json(path: &Path) -> CliResult<Value> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Value::Null),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| CliError::Message(format!("Failed to parse {}: {e}", path.display())))
}
