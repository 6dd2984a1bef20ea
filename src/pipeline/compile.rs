// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Per-file compiler invocation.
//!
//! Every `*.c` unit under the project's source directory is compiled with a
//! fixed flag set plus exactly one calling-convention flag. Units listed in
//! the config's short-calls section get `-mno-long-calls` and stay out of
//! the later relocatable merge; everything else gets `-mlong-calls`.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::core::config::BuildConfig;
use crate::core::error::{BuildError, BuildErrorKind};
use crate::core::toolchain::Toolchain;
use crate::core::workspace::{Workspace, BUILD_DIR, SRC_DIR};

/// A compilable source unit discovered under `src/`.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub name: String,
    pub uses_long_calls: bool,
}

/// One object file produced from a source unit. Owned by the pipeline run
/// and destroyed with the build directory.
#[derive(Debug, Clone)]
pub struct CompiledObject {
    pub source_name: String,
    /// Object path relative to the project root.
    pub path: PathBuf,
    pub uses_long_calls: bool,
}

/// List the `*.c` units in the source directory, sorted by name so compile
/// order and link argv stay reproducible. A missing directory means there is
/// nothing to compile.
pub fn collect_source_units(
    workspace: &Workspace,
    config: &BuildConfig,
) -> Result<Vec<SourceUnit>, BuildError> {
    let src_dir = workspace.src_dir();
    if !src_dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(&src_dir)
        .map_err(|err| BuildError::io("cannot read source directory", &err))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| BuildError::io("cannot read source directory", &err))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".c") && entry.path().is_file() {
            names.push(name);
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| {
            let uses_long_calls = !config.short_call_files.contains(&name);
            SourceUnit {
                name,
                uses_long_calls,
            }
        })
        .collect())
}

/// The fixed compiler flag set shared by every unit: optimization level,
/// warnings, ARM7TDMI thumb target, inlining/builtin suppression, and the
/// resolved `-D` list in config order.
pub fn base_cflags(config: &BuildConfig) -> Vec<String> {
    let mut flags = vec![
        config.optimization.flag().to_string(),
        "-Wall".to_string(),
        "-Wextra".to_string(),
        "-mthumb".to_string(),
        "-mno-thumb-interwork".to_string(),
        "-fno-inline".to_string(),
        "-fno-builtin".to_string(),
        "-std=c11".to_string(),
        "-mcpu=arm7tdmi".to_string(),
        "-march=armv4t".to_string(),
        "-mtune=arm7tdmi".to_string(),
        "-c".to_string(),
    ];
    for (name, value) in &config.defines {
        flags.push("-D".to_string());
        match value {
            Some(value) => flags.push(format!("{name}={value}")),
            None => flags.push(name.clone()),
        }
    }
    flags
}

/// Compile every source unit in turn. The first non-zero compiler exit
/// aborts the run; no remaining file is attempted.
pub fn compile_all(
    workspace: &Workspace,
    toolchain: &Toolchain,
    config: &BuildConfig,
    quiet: bool,
) -> Result<Vec<CompiledObject>, BuildError> {
    let units = collect_source_units(workspace, config)?;
    let cflags = base_cflags(config);
    let mut objects = Vec::with_capacity(units.len());

    for unit in units {
        let source_rel = PathBuf::from(SRC_DIR).join(&unit.name);
        let stem = unit.name.strip_suffix(".c").unwrap_or(&unit.name);
        let object_rel = PathBuf::from(BUILD_DIR)
            .join(SRC_DIR)
            .join(format!("{stem}.o"));

        if !quiet {
            eprintln!("CC {}", source_rel.display());
        }
        let status = Command::new(&toolchain.cc)
            .args(&cflags)
            .arg(if unit.uses_long_calls {
                "-mlong-calls"
            } else {
                "-mno-long-calls"
            })
            .arg(&source_rel)
            .arg("-o")
            .arg(&object_rel)
            .current_dir(workspace.root())
            .status()
            .map_err(|err| BuildError::io("cannot run the compiler", &err))?;

        if !status.success() {
            return Err(BuildError::tool_failure(
                BuildErrorKind::Compile,
                "Compilation failed.",
                status.code(),
            ));
        }

        objects.push(CompiledObject {
            source_name: unit.name,
            path: object_rel,
            uses_long_calls: unit.uses_long_calls,
        });
    }
    Ok(objects)
}
