//! Hack Assembler - Main Entry Point
//!
//! A two-pass assembler for the Hack assembly language (`Nand2Tetris` Project 6).
//!
//! # Architecture
//! - **Pass 1**: Builds the symbol table by recording label positions
//! - **Pass 2**: Generates machine code, resolving all symbols
//!
//! # Usage
//! ```bash
//! hack-assembler <INPUT.asm> [-o OUTPUT.hack]
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use assembler::AssembleError;
use clap::Parser;

/// Translates Hack assembly (`.asm`) into Hack binary machine code (`.hack`).
#[derive(Parser, Debug)]
#[command(name = "hack-assembler", version, about)]
struct Cli {
    /// Path to the `.asm` source file.
    input: PathBuf,

    /// Output path; defaults to the input path with its extension swapped to `.hack`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

fn read_lines(path: &PathBuf) -> Result<Vec<String>, AssembleError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// Determines the output file path
fn output_path(input: &PathBuf, explicit_output: Option<PathBuf>) -> PathBuf {
    explicit_output.unwrap_or_else(|| input.with_extension("hack"))
}

fn run(cli: &Cli) -> Result<(), AssembleError> {
    log::info!("assembling {}", cli.input.display());

    let lines = read_lines(&cli.input)?;
    log::debug!("read {} source lines", lines.len());

    let instructions = assembler::assemble(&lines)?;
    log::debug!("emitted {} instructions", instructions.len());

    let output = output_path(&cli.input, cli.output.clone());
    let mut writer = File::create(&output)?;
    for instruction in &instructions {
        writeln!(writer, "{instruction}")?;
    }

    log::info!("wrote {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
