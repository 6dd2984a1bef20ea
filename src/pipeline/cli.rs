// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};

use crate::core::error::{BuildError, BuildErrorKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Compiles the C sources of a ROM-hack project with devkitARM, merges the \
long-call objects into one relocatable blob, finds a large-enough run of erased words in the \
target ROM, and assembles the project's main.asm with the located address bound to the \
`allocation` label and the blob size bound to `allocation_size`.

The ROM itself is never modified; armips writes its outputs next to a working copy (test.gba).";

#[derive(Parser, Debug)]
#[command(
    name = "romstitch",
    version = VERSION,
    about = "Compiles C code and stitches it into free space of a GBA ROM",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        value_name = "ROOT",
        default_value = ".",
        long_help = "The root directory of the project to compile and insert. Defaults to the current directory. All project paths resolve against it; the working directory is never changed."
    )]
    pub root: PathBuf,
    #[arg(
        long = "rom",
        value_name = "FILE",
        default_value = "rom.gba",
        long_help = "Target ROM image, relative to ROOT unless absolute."
    )]
    pub rom: PathBuf,
    #[arg(
        long = "asm",
        value_name = "FILE",
        default_value = "main.asm",
        long_help = "Assembly template the computed labels are appended to, relative to ROOT unless absolute."
    )]
    pub asm: PathBuf,
    #[arg(
        long = "config",
        value_name = "FILE",
        default_value = "config.ini",
        long_help = "Build configuration file, relative to ROOT unless absolute. A missing file uses the documented defaults."
    )]
    pub config: PathBuf,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select output format for the run summary. text is default; json emits one machine-readable object on stdout."
    )]
    pub format: OutputFormat,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress per-stage progress lines. Errors are still reported."
    )]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Validated CLI arguments with all paths resolved against the project root.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub root: PathBuf,
    pub rom_path: PathBuf,
    pub template_path: PathBuf,
    pub config_path: PathBuf,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Check the argument combination and resolve project-relative paths.
pub fn validate_cli(cli: &Cli) -> Result<CliConfig, BuildError> {
    if !cli.root.is_dir() {
        return Err(BuildError::new(
            BuildErrorKind::Config,
            "project root is not a directory",
            cli.root.to_str(),
        ));
    }
    Ok(CliConfig {
        root: cli.root.clone(),
        rom_path: resolve(&cli.root, &cli.rom),
        template_path: resolve(&cli.root, &cli.asm),
        config_path: resolve(&cli.root, &cli.config),
        format: cli.format,
        quiet: cli.quiet,
    })
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_resolve_against_the_root() {
        let cli = Cli::parse_from(["romstitch", "/tmp"]);
        let config = validate_cli(&cli).unwrap();
        assert_eq!(config.rom_path, Path::new("/tmp/rom.gba"));
        assert_eq!(config.template_path, Path::new("/tmp/main.asm"));
        assert_eq!(config.config_path, Path::new("/tmp/config.ini"));
        assert_eq!(config.format, OutputFormat::Text);
        assert!(!config.quiet);
    }

    #[test]
    fn absolute_overrides_are_kept_as_is() {
        let cli = Cli::parse_from(["romstitch", "/tmp", "--rom", "/images/base.gba"]);
        let config = validate_cli(&cli).unwrap();
        assert_eq!(config.rom_path, Path::new("/images/base.gba"));
    }

    #[test]
    fn a_missing_root_is_a_config_error() {
        let cli = Cli::parse_from(["romstitch", "/definitely/not/here"]);
        let err = validate_cli(&cli).unwrap_err();
        assert_eq!(err.kind(), BuildErrorKind::Config);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn json_format_is_selectable() {
        let cli = Cli::parse_from(["romstitch", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
