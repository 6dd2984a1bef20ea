// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Build workspace layout under the project root.
//!
//! Every path the pipeline touches derives from the root passed on the
//! command line; the process working directory is never changed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::BuildError;

pub const SRC_DIR: &str = "src";
pub const BUILD_DIR: &str = "build";

/// Resolved paths for one pipeline run.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of C source units.
    pub fn src_dir(&self) -> PathBuf {
        self.root.join(SRC_DIR)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR)
    }

    /// Directory holding per-source object files and the merged blob.
    pub fn build_src_dir(&self) -> PathBuf {
        self.build_dir().join(SRC_DIR)
    }

    pub fn object_path(&self, source_name: &str) -> PathBuf {
        let stem = source_name.strip_suffix(".c").unwrap_or(source_name);
        self.build_src_dir().join(format!("{stem}.o"))
    }

    pub fn relocatable_path(&self) -> PathBuf {
        self.build_src_dir().join("relocatable.o")
    }

    pub fn patched_asm_path(&self) -> PathBuf {
        self.build_dir().join("main.asm")
    }

    /// Remove any previous build output and recreate the directory tree.
    pub fn reset_build_dir(&self) -> Result<(), BuildError> {
        let build = self.build_dir();
        if build.exists() {
            fs::remove_dir_all(&build)
                .map_err(|err| BuildError::io("cannot clean build directory", &err))?;
        }
        fs::create_dir_all(self.build_src_dir())
            .map_err(|err| BuildError::io("cannot create build directory", &err))?;
        Ok(())
    }

    /// Copy the target image to a working copy next to it for inspection.
    pub fn copy_rom_for_testing(&self, rom: &Path, copy_name: &str) -> Result<PathBuf, BuildError> {
        let dest = self.root.join(copy_name);
        fs::copy(rom, &dest)
            .map_err(|err| BuildError::io("cannot copy ROM image for testing", &err))?;
        Ok(dest)
    }
}
