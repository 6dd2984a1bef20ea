// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for romstitch.

use clap::Parser;

use romstitch::core::toolchain::ToolchainEnv;
use romstitch::pipeline::{self, Cli, OutputFormat};

fn main() {
    let cli = Cli::parse();
    let config = match pipeline::validate_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    };

    let env = ToolchainEnv::from_process_env();
    match pipeline::run(&config, &env) {
        Ok(summary) => match config.format {
            OutputFormat::Json => println!("{}", summary.to_json()),
            OutputFormat::Text => {
                if !config.quiet {
                    println!(
                        "allocation {:#010X} ({} bytes), {} source file(s), blob {} bytes",
                        summary.allocation,
                        summary.allocation_size,
                        summary.sources.len(),
                        summary.blob_size
                    );
                }
            }
        },
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}
