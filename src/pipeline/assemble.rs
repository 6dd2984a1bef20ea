// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Final assembly step.
//!
//! Runs the external assembler against the patched source, requesting a
//! symbol table and binding `allocation_size` to the allocation's byte count.
//! This is the terminal stage of the pipeline.

use std::path::PathBuf;
use std::process::Command;

use crate::core::error::{BuildError, BuildErrorKind};
use crate::core::toolchain::Toolchain;
use crate::core::workspace::{Workspace, BUILD_DIR};

pub const SYMBOL_TABLE_NAME: &str = "test.sym";
pub const ALLOCATION_SIZE_EQU: &str = "allocation_size";

/// Invoke the assembler on `build/main.asm`. A non-zero exit aborts the
/// pipeline with the assembler's own exit code.
pub fn assemble(
    workspace: &Workspace,
    toolchain: &Toolchain,
    allocation_size_bytes: u32,
    quiet: bool,
) -> Result<(), BuildError> {
    let source_rel = PathBuf::from(BUILD_DIR).join("main.asm");
    if !quiet {
        eprintln!("AS {}", source_rel.display());
    }
    let status = Command::new(&toolchain.asm)
        .arg("-sym")
        .arg(SYMBOL_TABLE_NAME)
        .arg(&source_rel)
        .arg("-equ")
        .arg(ALLOCATION_SIZE_EQU)
        .arg(allocation_size_bytes.to_string())
        .current_dir(workspace.root())
        .status()
        .map_err(|err| BuildError::io("cannot run the assembler", &err))?;

    if !status.success() {
        return Err(BuildError::tool_failure(
            BuildErrorKind::Assemble,
            "Assembly failed.",
            status.code(),
        ));
    }
    Ok(())
}
