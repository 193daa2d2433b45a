//! Shell completion command implementation

use crate::error::{CliError, CliResult};
use crate::get_cli_command;
use clap_complete::{generate, Shell};
use std::io;

const SUPPORTED: &str = "bash, zsh, fish, powershell, elvish";

pub struct Options {
    pub shell: String,
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options, &mut io::stdout()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("✗ Completion generation failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn parse_shell(name: &str) -> CliResult<Shell> {
    if name.trim().is_empty() {
        return Err(CliError::Message(format!(
            "Shell name is required. Supported shells: {SUPPORTED}"
        )));
    }
    name.to_lowercase().parse::<Shell>().map_err(|_| {
        CliError::Message(format!(
            "Unsupported shell: {name}. Supported shells: {SUPPORTED}"
        ))
    })
}

fn run_inner(options: &Options, out: &mut dyn io::Write) -> CliResult<()> {
    let shell = parse_shell(&options.shell)?;
    let mut cmd = get_cli_command();
    generate(shell, &mut cmd, "mass", out);
    Ok(())
}
