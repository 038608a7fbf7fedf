//! Tico CLI - run Tico scripts.
//!
//! Reads a script from a file, from stdin, or from an inline `-e`
//! argument, evaluates it, and reports errors with their line and
//! column.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Tico - a small embeddable command language
#[derive(Parser, Debug)]
#[command(name = "tico")]
#[command(author = "Tico Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run Tico scripts", long_about = None)]
struct Cli {
    /// Script file to run (stdin when omitted)
    script: Option<PathBuf>,

    /// Evaluate an inline script instead of reading a file
    #[arg(short = 'e', long = "eval", conflicts_with = "script", value_name = "SRC")]
    eval: Option<String>,

    /// Print the final result value on success
    #[arg(short = 'r', long = "result")]
    result: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, env = "TICO_VERBOSE")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TICO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_script(cli: &Cli) -> Result<Vec<u8>> {
    if let Some(src) = &cli.eval {
        return Ok(src.clone().into_bytes());
    }
    match &cli.script {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read script {}", path.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read script from stdin")?;
            Ok(buf)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let script = read_script(cli)?;
    tracing::debug!(bytes = script.len(), "evaluating script");

    let mut interp = tico_interp::Interp::new();
    match interp.eval(&script) {
        Ok(result) => {
            tracing::debug!(result = %result, "script finished");
            if cli.result {
                use std::io::Write;
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                out.write_all(result.bytes())?;
                out.write_all(b"\n")?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            match interp.error_position(&script) {
                Some((line, column)) => eprintln!("error: {} at {}:{}", err, line, column),
                None => eprintln!("error: {}", err),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
