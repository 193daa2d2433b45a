use std::env;
use std::fs;
use std::path::PathBuf;

/// Sets `MASS_VERSION` from the repo-root `VERSION` file (maintained by the
/// release tooling), falling back to the package version.
fn main() {
    let cargo_version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    let version_path = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .and_then(|dir| dir.parent().and_then(|p| p.parent()).map(|root| root.join("VERSION")));

    let mut version = cargo_version.clone();
    if let Some(path) = version_path {
        println!("cargo:rerun-if-changed={}", path.display());
        if let Ok(contents) = fs::read_to_string(&path) {
            let file_version = contents.trim();
            if file_version.starts_with(|c: char| c.is_ascii_digit()) {
                version = file_version.to_string();
            }
        }
    }

    println!("cargo:rustc-env=MASS_VERSION={version}");
    if version != cargo_version {
        println!("cargo:warning=Using version {version} from VERSION (Cargo.toml has {cargo_version})");
    }
}
