use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use hat_json_patch::json_cli::diff_json;

#[derive(Parser)]
#[command(name = "json-diff")]
#[command(about = "Print the JSON Patch that turns one document into another")]
struct Cli {
    /// Source document
    a: PathBuf,
    /// Target document
    b: PathBuf,
    /// Skip the `test` operations that make the patch invertible
    #[arg(long)]
    no_invertible: bool,
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))
}

fn run(cli: &Cli) -> Result<String, String> {
    let a = read(&cli.a)?;
    let b = read(&cli.b)?;
    diff_json(&a, &b, !cli.no_invertible).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    env_logger::init();
    match run(&Cli::parse()) {
        Ok(patch) => {
            println!("{patch}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("json-diff: {e}");
            ExitCode::FAILURE
        }
    }
}
