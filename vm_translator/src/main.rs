//! VM Translator - Main Entry Point
//!
//! Translates Stack VM bytecode (`.vm`) into Hack assembly (`.asm`).
//!
//! # Usage
//! ```bash
//! hack-vm-translator <input.vm | input_dir>
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use vm_translator::VmError;

/// Translates Stack VM bytecode into Hack assembly.
#[derive(ClapParser, Debug)]
#[command(name = "hack-vm-translator", version, about)]
struct Cli {
    /// Path to a `.vm` file, or a directory of `.vm` files.
    input: PathBuf,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Determines the output path per §6: single-file mode emits `<stem>.asm`;
/// directory mode emits `<dir>/<dir>.asm`.
fn output_path(input: &PathBuf) -> PathBuf {
    if input.is_dir() {
        let dir_name = input.file_name().unwrap_or_default();
        input.join(dir_name).with_extension("asm")
    } else {
        input.with_extension("asm")
    }
}

fn run(cli: &Cli) -> Result<(), VmError> {
    log::info!("translating {}", cli.input.display());

    let output = output_path(&cli.input);
    let mut buffer = Vec::new();

    if cli.input.is_dir() {
        vm_translator::translate_directory(&cli.input, &mut buffer)?;
    } else {
        vm_translator::translate_file(&cli.input, &mut buffer)?;
    }

    fs::write(&output, buffer)?;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_single_file() {
        assert_eq!(
            output_path(&PathBuf::from("Foo.vm")),
            PathBuf::from("Foo.asm")
        );
    }

    #[test]
    fn test_output_path_directory() {
        let dir = std::env::temp_dir().join("hack_vm_translator_main_test_dir");
        std::fs::create_dir_all(&dir).unwrap();
        let expected = dir.join(dir.file_name().unwrap()).with_extension("asm");
        assert_eq!(output_path(&dir), expected);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
