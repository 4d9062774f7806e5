use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use hat_json_patch::json_cli::{apply_json_patch, invert_json_patch};

#[derive(Parser)]
#[command(name = "json-patch")]
#[command(about = "Apply a JSON Patch to the document read from stdin")]
struct Cli {
    /// Patch as JSON text
    patch: String,
    /// Print the inverse of the patch instead of applying it
    #[arg(long)]
    inverse: bool,
}

fn run(cli: &Cli, mut stdin: impl Read) -> Result<String, String> {
    if cli.inverse {
        return invert_json_patch(&cli.patch).map_err(|e| e.to_string());
    }
    let mut doc = String::new();
    stdin.read_to_string(&mut doc).map_err(|e| format!("stdin: {e}"))?;
    log::debug!("read {} bytes from stdin", doc.len());
    apply_json_patch(&doc, &cli.patch).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    env_logger::init();
    match run(&Cli::parse(), io::stdin()) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("json-patch: {e}");
            ExitCode::FAILURE
        }
    }
}
