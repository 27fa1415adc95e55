//! Jack Compiler - Main Entry Point
//!
//! Compiles Jack source (`.jack`) directly to Stack VM commands (`.vm`).
//!
//! # Usage
//! ```bash
//! hack-jack-compiler <input.jack | input_dir>
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jack_compiler::JackError;

/// Compiles Jack source directly to Stack VM commands.
#[derive(Parser, Debug)]
#[command(name = "hack-jack-compiler", version, about)]
struct Cli {
    /// Path to a `.jack` file, or a directory of `.jack` files.
    input: PathBuf,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> Result<(), JackError> {
    log::info!("compiling {}", cli.input.display());

    if cli.input.is_dir() {
        let report = jack_compiler::compile_directory(&cli.input)?;
        for (path, err) in &report.failed {
            log::error!("{}: {err}", path.display());
        }
        if !report.all_succeeded() {
            return Err(report
                .failed
                .into_iter()
                .next()
                .map(|(_, err)| err)
                .expect("all_succeeded() is false implies failed is non-empty"));
        }
    } else {
        let out_path = jack_compiler::compile_file(&cli.input)?;
        log::info!("wrote {}", out_path.display());
    }

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
