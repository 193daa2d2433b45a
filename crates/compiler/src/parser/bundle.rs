/*!
 * Copyright 2025 Massdriver, Inc.
 * Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
 * See the LICENSE file in the project root for details.
 *
 * Parser for the bundle manifest (`massdriver.yaml`).
 */

use serde::Deserialize;
use serde_json::Value;

use crate::parser::error::{kind_of, ParseError};
use crate::parser::utils::parse_yaml_or_json;

/// File name of the bundle manifest.
pub const MANIFEST_FILE: &str = "massdriver.yaml";

/// Provisioners whose steps receive generated Terraform/OpenTofu variables.
pub const TERRAFORM_PROVISIONERS: [&str; 2] = ["terraform", "opentofu"];

/// A parsed bundle manifest.
///
/// The four schema sections are kept as raw JSON so they can be dereferenced
/// and written back out untouched apart from `$ref` expansion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(rename = "type", default)]
    pub bundle_type: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub artifacts: Value,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub connections: Value,
    #[serde(default)]
    pub ui: Value,
}

/// A provisioning step: a directory and the tool that applies it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Step {
    pub path: String,
    pub provisioner: String,
}

impl Step {
    pub fn uses_terraform_variables(&self) -> bool {
        TERRAFORM_PROVISIONERS.contains(&self.provisioner.as_str())
    }
}

/// The schema sections of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Artifacts,
    Params,
    Connections,
    Ui,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 4] = [
        SchemaKind::Artifacts,
        SchemaKind::Params,
        SchemaKind::Connections,
        SchemaKind::Ui,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Artifacts => "artifacts",
            Self::Params => "params",
            Self::Connections => "connections",
            Self::Ui => "ui",
        }
    }

    /// Name of the generated schema file, e.g. `schema-params.json`.
    pub fn file_name(self) -> String {
        format!("schema-{}.json", self.as_str())
    }
}

impl Bundle {
    /// Build a bundle from an already parsed manifest.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the manifest is not an object, lacks a `name`,
    /// or has fields of the wrong type.
    pub fn from_value(manifest: &Value) -> Result<Self, ParseError> {
        let manifest_obj = manifest
            .as_object()
            .ok_or_else(|| ParseError::ManifestNotMapping(kind_of(manifest)))?;

        if !manifest_obj.contains_key("name") {
            return Err(ParseError::MissingField("name".to_string()));
        }

        serde_json::from_value(manifest.clone())
            .map_err(|e| ParseError::InvalidFieldType(e.to_string()))
    }

    pub fn schema(&self, kind: SchemaKind) -> &Value {
        match kind {
            SchemaKind::Artifacts => &self.artifacts,
            SchemaKind::Params => &self.params,
            SchemaKind::Connections => &self.connections,
            SchemaKind::Ui => &self.ui,
        }
    }

    /// Steps that get `*_variables.tf.json` and `.auto.tfvars.json` files.
    pub fn terraform_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| step.uses_terraform_variables())
    }
}

/// Parse a bundle manifest from YAML (or JSON) into a raw value.
///
/// Use [`Bundle::from_value`] for the typed view once the value has been
/// validated.
///
/// # Errors
///
/// Returns `ParseError` if the content is not valid YAML/JSON or not an object.
pub fn parse_manifest(content: &str) -> Result<Value, ParseError> {
    let parsed = parse_yaml_or_json(content, Some(MANIFEST_FILE))?;
    if !parsed.is_object() {
        return Err(ParseError::ManifestNotMapping(kind_of(&parsed)));
    }
    Ok(parsed)
}
