//! Dereference tests

use super::*;
use crate::error::TransportError;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

/// Canned HTTP responses keyed by URL. Unknown URLs fail at the transport level.
#[derive(Default)]
struct FakeHttp {
    responses: HashMap<String, (u16, String)>,
    requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeHttp {
    fn with(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    fn headers_for(&self, url: &str) -> Vec<(String, String)> {
        self.requests
            .borrow()
            .iter()
            .find(|(requested, _)| requested == url)
            .map(|(_, headers)| headers.clone())
            .unwrap_or_default()
    }
}

impl HttpClient for FakeHttp {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push((
            url.to_string(),
            headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        ));
        match self.responses.get(url) {
            Some((status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.as_bytes().to_vec(),
            }),
            None => Err("connection refused".into()),
        }
    }
}

/// In-memory filesystem keyed by normalized path.
#[derive(Default)]
struct MemoryFs {
    files: HashMap<PathBuf, String>,
}

impl MemoryFs {
    fn with(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }
}

impl Filesystem for MemoryFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .map(|content| content.as_bytes().to_vec())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not found"))
    }
}

fn testdata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn deref_in_crate(value: &Value) -> Result<Value, DereferenceError> {
    let http = FakeHttp::default();
    let options = DereferenceOptions::in_directory(&http, &OsFilesystem, testdata_dir());
    dereference(value, &options)
}

#[test]
fn test_document_without_refs_is_unchanged() {
    let document = json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"type": "string"},
            "tags": {"type": "array", "items": [{"type": "string"}, 1, null, true]}
        }
    });

    assert_eq!(deref_in_crate(&document).unwrap(), document);
}

#[test]
fn test_scalars_pass_through() {
    assert_eq!(deref_in_crate(&json!(42)).unwrap(), json!(42));
    assert_eq!(deref_in_crate(&json!("x")).unwrap(), json!("x"));
    assert_eq!(deref_in_crate(&Value::Null).unwrap(), Value::Null);
}

#[test]
fn test_ref_is_replaced_and_siblings_kept() {
    let document = json!({
        "foo": true,
        "bar": {},
        "$ref": "./testdata/artifacts/aws-example.json"
    });

    assert_eq!(
        deref_in_crate(&document).unwrap(),
        json!({"foo": true, "bar": {}, "id": "fake-schema-id"})
    );
}

#[test]
fn test_sibling_keys_win_over_ref_keys() {
    let document = json!({
        "conflictingKey": "not-from-ref",
        "$ref": "./testdata/conflicting-keys.json"
    });

    assert_eq!(
        deref_in_crate(&document).unwrap(),
        json!({"conflictingKey": "not-from-ref", "nonConflictKey": "from-ref"})
    );
}

#[test]
fn test_fragment_refs_are_untouched() {
    let document = json!({"$ref": "#/its-in-this-file"});
    assert_eq!(deref_in_crate(&document).unwrap(), document);

    // Siblings of a fragment are not followed either
    let nested = json!({
        "$ref": "#/definitions/thing",
        "extra": {"$ref": "./testdata/artifacts/aws-example.json"}
    });
    assert_eq!(deref_in_crate(&nested).unwrap(), nested);
}

#[test]
fn test_refs_inside_arrays_and_nested_objects() {
    let document = json!({
        "oneOf": [
            {"$ref": "./testdata/artifacts/aws-example.json"},
            {"type": "null"}
        ],
        "properties": {
            "artifact": {"$ref": "./testdata/artifacts/aws-example.json", "title": "Artifact"}
        }
    });

    assert_eq!(
        deref_in_crate(&document).unwrap(),
        json!({
            "oneOf": [{"id": "fake-schema-id"}, {"type": "null"}],
            "properties": {
                "artifact": {"id": "fake-schema-id", "title": "Artifact"}
            }
        })
    );
}

#[test]
fn test_recursive_refs_resolve_relative_to_referencing_file() {
    let document = json!({"$ref": "./testdata/recursive/root.json"});

    assert_eq!(
        deref_in_crate(&document).unwrap(),
        json!({
            "id": "terminal",
            "properties": {
                "region": {"type": "string", "enum": ["us-east-1", "us-west-2"]}
            },
            "deep": true,
            "title": "root"
        })
    );
}

#[test]
fn test_same_target_twice_is_not_a_cycle() {
    let document = json!({
        "a": {"$ref": "./testdata/artifacts/aws-example.json"},
        "b": {"$ref": "./testdata/artifacts/aws-example.json"}
    });

    let resolved = deref_in_crate(&document).unwrap();
    assert_eq!(resolved["a"], resolved["b"]);
}

#[test]
fn test_cycle_is_detected() {
    let document = json!({"$ref": "./testdata/cycle/a.json"});

    match deref_in_crate(&document) {
        Err(DereferenceError::CycleDetected { address }) => {
            assert!(address.ends_with("a.json"), "unexpected address {address}");
        }
        other => panic!("Expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn test_max_depth_is_enforced() {
    let http = FakeHttp::default();
    let options = DereferenceOptions::in_directory(&http, &OsFilesystem, testdata_dir())
        .with_max_depth(1);
    let document = json!({"$ref": "./testdata/recursive/root.json"});

    match dereference(&document, &options) {
        Err(DereferenceError::MaxDepthExceeded { max_depth, .. }) => assert_eq!(max_depth, 1),
        other => panic!("Expected MaxDepthExceeded, got {other:?}"),
    }
}

#[test]
fn test_missing_file_reports_path() {
    let document = json!({"$ref": "./testdata/does-not-exist.json"});

    let error = deref_in_crate(&document).unwrap_err();
    let expected = testdata_dir().join("testdata/does-not-exist.json");
    assert!(
        error
            .to_string()
            .ends_with(&format!("{}: file does not exist", expected.display())),
        "unexpected message: {error}"
    );
}

#[test]
fn test_malformed_json_is_a_decode_error() {
    let document = json!({"$ref": "./testdata/malformed.json"});

    match deref_in_crate(&document) {
        Err(DereferenceError::Decode { address, .. }) => {
            assert!(address.ends_with("malformed.json"));
        }
        other => panic!("Expected Decode, got {other:?}"),
    }
}

#[test]
fn test_nested_relative_refs_with_os_filesystem() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("schemas/connections")).unwrap();
    fs::write(
        root.join("schemas/connections/vpc.json"),
        r#"{"title": "VPC", "$ref": "../shared/network.json"}"#,
    )
    .unwrap();
    fs::create_dir_all(root.join("schemas/shared")).unwrap();
    fs::write(
        root.join("schemas/shared/network.json"),
        r#"{"type": "object", "title": "Network"}"#,
    )
    .unwrap();

    let http = FakeHttp::default();
    let options = DereferenceOptions::in_directory(&http, &OsFilesystem, root);
    let resolved = dereference(
        &json!({"$ref": "./schemas/connections/vpc.json"}),
        &options,
    )
    .unwrap();

    assert_eq!(resolved, json!({"type": "object", "title": "VPC"}));
}

#[test]
fn test_memory_filesystem_parent_refs() {
    let fs = MemoryFs::default()
        .with("/bundle/a/b/deep.json", r#"{"$ref": "../../top.json", "deep": 1}"#)
        .with("/bundle/top.json", r#"{"top": 1}"#);
    let http = FakeHttp::default();
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle");

    let resolved = dereference(&json!({"$ref": "a/b/deep.json"}), &options).unwrap();
    assert_eq!(resolved, json!({"top": 1, "deep": 1}));
}

#[test]
fn test_http_ref_is_fetched() {
    let http = FakeHttp::default().with(
        "https://schemas.example.com/aws/iam.json",
        200,
        r#"{"type": "object", "title": "IAM"}"#,
    );
    let fs = MemoryFs::default();
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle");

    let resolved = dereference(
        &json!({"$ref": "https://schemas.example.com/aws/iam.json", "title": "Role"}),
        &options,
    )
    .unwrap();

    assert_eq!(resolved, json!({"type": "object", "title": "Role"}));
    // API keys never go to arbitrary hosts
    assert!(http
        .headers_for("https://schemas.example.com/aws/iam.json")
        .iter()
        .all(|(name, _)| name != API_KEY_HEADER));
}

#[test]
fn test_relative_refs_inside_http_documents_stay_remote() {
    let http = FakeHttp::default()
        .with(
            "https://schemas.example.com/aws/iam.json",
            200,
            r#"{"properties": {"arn": {"$ref": "./common/arn.json"}}}"#,
        )
        .with(
            "https://schemas.example.com/aws/common/arn.json",
            200,
            r#"{"type": "string"}"#,
        );
    // Same relative path exists locally and must not be used
    let fs = MemoryFs::default().with("/bundle/common/arn.json", r#"{"type": "integer"}"#);
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle");

    let resolved = dereference(
        &json!({"$ref": "https://schemas.example.com/aws/iam.json"}),
        &options,
    )
    .unwrap();

    assert_eq!(resolved, json!({"properties": {"arn": {"type": "string"}}}));
}

#[test]
fn test_non_200_response_is_an_error() {
    let http = FakeHttp::default().with("https://schemas.example.com/gone.json", 404, "");
    let fs = MemoryFs::default();
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle");

    let error = dereference(
        &json!({"$ref": "https://schemas.example.com/gone.json"}),
        &options,
    )
    .unwrap_err();

    assert!(
        error
            .to_string()
            .starts_with("received non-200 response getting ref 404"),
        "unexpected message: {error}"
    );
}

#[test]
fn test_transport_failure_is_an_error() {
    let http = FakeHttp::default();
    let fs = MemoryFs::default();
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle");

    match dereference(&json!({"$ref": "https://unreachable.example.com/x.json"}), &options) {
        Err(DereferenceError::Transport { url, .. }) => {
            assert_eq!(url, "https://unreachable.example.com/x.json");
        }
        other => panic!("Expected Transport, got {other:?}"),
    }
}

#[test]
fn test_registry_ref_uses_artifact_definitions_endpoint() {
    let http = FakeHttp::default().with(
        "https://api.example.com/artifact-definitions/massdriver/aws-iam-role",
        200,
        r#"{"$md": {"name": "aws-iam-role"}, "type": "object"}"#,
    );
    let fs = MemoryFs::default();
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle")
        .with_registry_url("https://api.example.com/")
        .with_api_key(Some("secret".to_string()));

    let resolved = dereference(
        &json!({"connections": {"iam": {"$ref": "massdriver/aws-iam-role"}}}),
        &options,
    )
    .unwrap();

    assert_eq!(
        resolved,
        json!({"connections": {"iam": {"$md": {"name": "aws-iam-role"}, "type": "object"}}})
    );
    let headers =
        http.headers_for("https://api.example.com/artifact-definitions/massdriver/aws-iam-role");
    assert!(headers
        .iter()
        .any(|(name, value)| name == API_KEY_HEADER && value == "secret"));
}

#[test]
fn test_registry_ref_resolves_nested_refs_against_registry() {
    let http = FakeHttp::default()
        .with(
            "https://api.massdriver.cloud/artifact-definitions/massdriver/vpc",
            200,
            r#"{"properties": {"cidr": {"$ref": "./cidr.json"}}}"#,
        )
        .with(
            "https://api.massdriver.cloud/artifact-definitions/massdriver/cidr.json",
            200,
            r#"{"type": "string", "format": "cidr"}"#,
        );
    // Same name on disk must not be picked up
    let fs = MemoryFs::default().with("/bundle/cidr.json", r#"{"type": "integer"}"#);
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle")
        .with_api_key(Some("secret".to_string()));

    let resolved = dereference(&json!({"$ref": "massdriver/vpc"}), &options).unwrap();
    assert_eq!(
        resolved,
        json!({"properties": {"cidr": {"type": "string", "format": "cidr"}}})
    );
    let headers =
        http.headers_for("https://api.massdriver.cloud/artifact-definitions/massdriver/cidr.json");
    assert!(headers
        .iter()
        .any(|(name, value)| name == API_KEY_HEADER && value == "secret"));
}

#[test]
fn test_api_key_not_sent_outside_artifact_definitions() {
    let http = FakeHttp::default()
        .with(
            "https://api.massdriver.cloud/artifact-definitions/massdriver/vpc",
            200,
            r#"{"properties": {"cidr": {"$ref": "../../schemas/cidr.json"}}}"#,
        )
        .with(
            "https://api.massdriver.cloud/schemas/cidr.json",
            200,
            r#"{"type": "string"}"#,
        );
    let fs = MemoryFs::default();
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle")
        .with_api_key(Some("secret".to_string()));

    dereference(&json!({"$ref": "massdriver/vpc"}), &options).unwrap();

    let headers = http.headers_for("https://api.massdriver.cloud/schemas/cidr.json");
    assert!(!headers.is_empty());
    assert!(headers.iter().all(|(name, _)| name != API_KEY_HEADER));
}

#[test]
fn test_file_url_ref_reads_local_file() {
    let fs = MemoryFs::default().with("/shared/region.json", r#"{"type": "string"}"#);
    let http = FakeHttp::default();
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle");

    assert_eq!(
        dereference(&json!({"$ref": "file:///shared/region.json"}), &options).unwrap(),
        json!({"type": "string"})
    );
}

#[test]
fn test_file_url_ref_in_remote_document_is_rejected() {
    let http = FakeHttp::default().with(
        "https://schemas.example.com/network.json",
        200,
        r#"{"properties": {"secret": {"$ref": "file:///etc/local.json"}}}"#,
    );
    let fs = MemoryFs::default().with("/etc/local.json", r#"{"type": "string"}"#);
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle");

    match dereference(&json!({"$ref": "https://schemas.example.com/network.json"}), &options) {
        Err(DereferenceError::LocalRefFromRemote {
            reference,
            document,
        }) => {
            assert_eq!(reference, "file:///etc/local.json");
            assert_eq!(document, "https://schemas.example.com/network.json");
        }
        other => panic!("Expected LocalRefFromRemote, got {other:?}"),
    }
    // Never rewritten into a server path
    assert!(http.headers_for("https://schemas.example.com/etc/local.json").is_empty());
    assert_eq!(http.requests.borrow().len(), 1);
}

#[test]
fn test_non_object_target_with_siblings() {
    let fs = MemoryFs::default().with("/bundle/list.json", r#"["a", "b"]"#);
    let http = FakeHttp::default();
    let options = DereferenceOptions::in_directory(&http, &fs, "/bundle");

    assert_eq!(
        dereference(&json!({"$ref": "./list.json"}), &options).unwrap(),
        json!(["a", "b"])
    );
}
