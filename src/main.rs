// ABOUTME: Command-line entry point: read a blox program, evaluate it, render its layouts

use blox::run_program;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Interpreter for the blox box-layout language
#[derive(Parser, Debug)]
#[command(name = "blox")]
#[command(version)]
#[command(about = "Evaluate a blox program and render its layouts to HTML")]
struct CliArgs {
    /// Program file to execute
    #[arg(value_name = "FILE")]
    script: PathBuf,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let source = match std::fs::read_to_string(&args.script) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("cannot read {}: {}", args.script.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match run_program(&source) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
