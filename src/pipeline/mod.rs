// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Build-and-inject pipeline driver.
//!
//! Five strictly sequential stages: compile every source unit, merge the
//! long-call objects into one relocatable blob, locate a large-enough run of
//! erased words in the target ROM, patch the assembly template with the
//! computed labels, and run the external assembler. The first failing stage
//! terminates the run; external tool exit codes propagate unchanged.

pub mod cli;

mod assemble;
mod compile;
mod link;
mod patch;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use serde_json::json;

use crate::core::config::BuildConfig;
use crate::core::error::BuildError;
use crate::core::freespace;
use crate::core::toolchain::{Toolchain, ToolchainEnv};
use crate::core::workspace::Workspace;

pub use cli::{validate_cli, Cli, CliConfig, OutputFormat, VERSION};
pub use compile::{CompiledObject, SourceUnit};
pub use patch::AUTOGEN_MARKER;

const ROM_COPY_NAME: &str = "test.gba";

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// ROM-space address of the located allocation.
    pub allocation: u32,
    /// Allocation size in bytes (whole words).
    pub allocation_size: u32,
    /// Source units compiled, in compile order.
    pub sources: Vec<String>,
    /// Size of the merged relocatable blob in bytes.
    pub blob_size: u64,
    /// Working copy of the target image.
    pub rom_copy: PathBuf,
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "schema": "romstitch-run-v1",
            "allocation": format!("{:#010X}", self.allocation),
            "allocation_size": self.allocation_size,
            "blob_size": self.blob_size,
            "sources": self.sources,
            "rom_copy": self.rom_copy.to_string_lossy(),
        })
    }
}

/// Run the whole pipeline for one project.
pub fn run(config: &CliConfig, env: &ToolchainEnv) -> Result<RunSummary, BuildError> {
    let build_config = BuildConfig::load(&config.config_path)?;
    let toolchain = Toolchain::discover(env)?;
    let workspace = Workspace::new(&config.root);
    workspace.reset_build_dir()?;

    // Compiling, then Merging. Fail-fast on the first bad tool exit.
    let objects = compile::compile_all(&workspace, &toolchain, &build_config, config.quiet)?;
    let blob_size = link::merge_relocatable(&workspace, &toolchain, &objects, config.quiet)?;

    // Locating.
    let words = freespace::needed_words(blob_size, build_config.reserve_bytes);
    let allocation = {
        let rom = File::open(&config.rom_path)
            .map_err(|err| BuildError::io("cannot open ROM image", &err))?;
        let mut reader = BufReader::new(rom);
        // The locator normalizes the base into the ROM window itself.
        freespace::find_free_run(&mut reader, build_config.base_address, words)?
    };

    let rom_copy = workspace.copy_rom_for_testing(&config.rom_path, ROM_COPY_NAME)?;

    // Patching, then Assembling.
    patch::write_patched_source(
        &config.template_path,
        &workspace.patched_asm_path(),
        allocation,
        &build_config.defines,
    )?;
    let allocation_size = words * 4;
    assemble::assemble(&workspace, &toolchain, allocation_size, config.quiet)?;

    Ok(RunSummary {
        allocation,
        allocation_size,
        sources: objects
            .into_iter()
            .map(|object| object.source_name)
            .collect(),
        blob_size,
        rom_copy,
    })
}
