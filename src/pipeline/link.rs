// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Relocatable merge of the long-call objects.
//!
//! The merged blob file always exists, even when no object qualifies, so the
//! downstream size computation never needs a special case.

use std::fs::{self, File};
use std::path::PathBuf;
use std::process::Command;

use crate::core::error::{BuildError, BuildErrorKind};
use crate::core::toolchain::Toolchain;
use crate::core::workspace::{Workspace, BUILD_DIR, SRC_DIR};

use super::compile::CompiledObject;

/// Path of the merged blob, relative to the project root.
pub fn relocatable_rel_path() -> PathBuf {
    PathBuf::from(BUILD_DIR).join(SRC_DIR).join("relocatable.o")
}

/// Merge all long-call objects into one position-independent blob and return
/// its size in bytes. With an empty long-call set the linker is not invoked
/// and the blob stays zero bytes.
pub fn merge_relocatable(
    workspace: &Workspace,
    toolchain: &Toolchain,
    objects: &[CompiledObject],
    quiet: bool,
) -> Result<u64, BuildError> {
    let blob_path = workspace.relocatable_path();
    File::create(&blob_path)
        .map_err(|err| BuildError::io("cannot create relocatable blob", &err))?;

    let long_calls: Vec<&CompiledObject> = objects
        .iter()
        .filter(|object| object.uses_long_calls)
        .collect();

    if !long_calls.is_empty() {
        let blob_rel = relocatable_rel_path();
        if !quiet {
            eprintln!("LD {}", blob_rel.display());
        }
        let status = Command::new(&toolchain.ld)
            .arg("--relocatable")
            .args(long_calls.iter().map(|object| &object.path))
            .arg("-o")
            .arg(&blob_rel)
            .current_dir(workspace.root())
            .status()
            .map_err(|err| BuildError::io("cannot run the linker", &err))?;

        if !status.success() {
            return Err(BuildError::tool_failure(
                BuildErrorKind::Link,
                "Linking failed.",
                status.code(),
            ));
        }
    }

    let size = fs::metadata(&blob_path)
        .map_err(|err| BuildError::io("cannot stat relocatable blob", &err))?
        .len();
    Ok(size)
}
