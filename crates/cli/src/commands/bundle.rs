//! Bundle build command implementation

use crate::error::CliResult;
use crate::ops::build::{build_bundle, BuildOptions, BuildReport};
use crate::utils::config::load_config;
use crate::utils::http::ReqwestHttpClient;
use std::path::PathBuf;

pub struct Options {
    pub path: String,
    pub output: Option<String>,
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(report) => {
            println!("✓ Built bundle {}", report.bundle_name);
            for path in &report.written {
                println!("  {}", path.display());
            }
            if let Some(guide) = &report.operator_guide {
                println!("  Operator guide: {}", guide.display());
            }
            0
        }
        Err(e) => {
            eprintln!("✗ Bundle build failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<BuildReport> {
    let config = load_config()?;
    let http = ReqwestHttpClient::new(config.timeout)?;

    let build_options = BuildOptions {
        bundle_dir: PathBuf::from(&options.path),
        output_dir: options.output.as_ref().map(PathBuf::from),
    };
    build_bundle(&build_options, &config, &http)
}
