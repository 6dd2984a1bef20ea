// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Discovery of the external compiler, linker, and assembler.
//!
//! Lookups run against an explicit environment snapshot captured once at
//! startup, so the pipeline itself never reads process-wide state.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::error::{BuildError, BuildErrorKind};

const CC_NAME: &str = "arm-none-eabi-gcc";
const LD_NAME: &str = "arm-none-eabi-ld";
const ASM_NAME: &str = "armips";

/// Snapshot of the environment variables driving tool discovery.
#[derive(Debug, Clone, Default)]
pub struct ToolchainEnv {
    /// `DEVKITARM`: root of a devkitARM install holding `bin/arm-none-eabi-*`.
    pub devkitarm_root: Option<PathBuf>,
    /// `ARMIPS`: explicit path to the armips executable.
    pub armips_override: Option<PathBuf>,
    /// `PATH` for fallback searches.
    pub search_path: Option<OsString>,
}

impl ToolchainEnv {
    /// Capture the relevant variables from the process environment.
    pub fn from_process_env() -> Self {
        Self {
            devkitarm_root: env::var_os("DEVKITARM").map(PathBuf::from),
            armips_override: env::var_os("ARMIPS").map(PathBuf::from),
            search_path: env::var_os("PATH"),
        }
    }
}

/// Resolved paths of the external tools.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub cc: PathBuf,
    pub ld: PathBuf,
    pub asm: PathBuf,
}

impl Toolchain {
    /// Resolve all three tools or fail with a tool-discovery error.
    ///
    /// A set devkitARM root is authoritative: if it is missing or lacks the
    /// compiler or linker, discovery fails outright rather than silently
    /// falling back to PATH. PATH is only searched when no root is set.
    pub fn discover(env: &ToolchainEnv) -> Result<Self, BuildError> {
        let (cc, ld) = match &env.devkitarm_root {
            Some(root) if root.exists() => {
                let cc = root.join("bin").join(CC_NAME);
                let ld = root.join("bin").join(LD_NAME);
                if !cc.is_file() || !ld.is_file() {
                    return Err(missing_tool("Can't find devkitARM", root.to_str()));
                }
                (cc, ld)
            }
            Some(root) => {
                return Err(missing_tool("Can't find devkitARM", root.to_str()));
            }
            None => {
                let cc = find_in_path(CC_NAME, env.search_path.as_deref());
                let ld = find_in_path(LD_NAME, env.search_path.as_deref());
                match (cc, ld) {
                    (Some(cc), Some(ld)) => (cc, ld),
                    _ => return Err(missing_tool("Can't find devkitARM", None)),
                }
            }
        };

        let asm = match &env.armips_override {
            Some(path) => path.clone(),
            None => find_in_path(ASM_NAME, env.search_path.as_deref())
                .ok_or_else(|| missing_tool("Can't find armips", None))?,
        };

        Ok(Self { cc, ld, asm })
    }
}

fn missing_tool(msg: &str, param: Option<&str>) -> BuildError {
    BuildError::new(BuildErrorKind::Toolchain, &format!("{msg}."), param)
}

/// Search a PATH-style variable for an executable file named `name`.
fn find_in_path(name: &str, search_path: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    let search_path = search_path?;
    for dir in env::split_paths(search_path) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && std::fs::metadata(path)
            .map(|meta| meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("romstitch-tc-{tag}-{now}"));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[cfg(unix)]
    fn touch_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::write(path, "#!/bin/sh\n").expect("write tool");
        let mut perms = fs::metadata(path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).expect("chmod");
    }

    #[cfg(unix)]
    #[test]
    fn discovers_tools_from_a_devkitarm_root_and_path() {
        let root = unique_temp_dir("dkarm");
        let bin = root.join("bin");
        fs::create_dir_all(&bin).unwrap();
        touch_executable(&bin.join(CC_NAME));
        touch_executable(&bin.join(LD_NAME));

        let path_dir = unique_temp_dir("path");
        touch_executable(&path_dir.join(ASM_NAME));

        let env = ToolchainEnv {
            devkitarm_root: Some(root.clone()),
            armips_override: None,
            search_path: Some(path_dir.clone().into_os_string()),
        };
        let tc = Toolchain::discover(&env).unwrap();
        assert_eq!(tc.cc, root.join("bin").join(CC_NAME));
        assert_eq!(tc.ld, root.join("bin").join(LD_NAME));
        assert_eq!(tc.asm, path_dir.join(ASM_NAME));

        let _ = fs::remove_dir_all(root);
        let _ = fs::remove_dir_all(path_dir);
    }

    #[test]
    fn missing_devkitarm_root_is_a_discovery_error() {
        let env = ToolchainEnv {
            devkitarm_root: Some(PathBuf::from("/nonexistent/devkitARM")),
            armips_override: None,
            search_path: None,
        };
        let err = Toolchain::discover(&env).unwrap_err();
        assert_eq!(err.kind(), BuildErrorKind::Toolchain);
        assert!(err.message().contains("Can't find devkitARM."));
        assert_eq!(err.exit_code(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn a_broken_devkitarm_root_never_falls_back_to_path() {
        // The tools exist on PATH, but the configured root wins and fails.
        let path_dir = unique_temp_dir("fallback");
        touch_executable(&path_dir.join(CC_NAME));
        touch_executable(&path_dir.join(LD_NAME));
        touch_executable(&path_dir.join(ASM_NAME));

        let env = ToolchainEnv {
            devkitarm_root: Some(PathBuf::from("/nonexistent/devkitARM")),
            armips_override: None,
            search_path: Some(path_dir.clone().into_os_string()),
        };
        let err = Toolchain::discover(&env).unwrap_err();
        assert_eq!(err.kind(), BuildErrorKind::Toolchain);
        assert!(err.message().contains("Can't find devkitARM."));

        let _ = fs::remove_dir_all(path_dir);
    }

    #[cfg(unix)]
    #[test]
    fn missing_armips_is_a_discovery_error() {
        let root = unique_temp_dir("dkarm2");
        let bin = root.join("bin");
        fs::create_dir_all(&bin).unwrap();
        touch_executable(&bin.join(CC_NAME));
        touch_executable(&bin.join(LD_NAME));

        let env = ToolchainEnv {
            devkitarm_root: Some(root.clone()),
            armips_override: None,
            search_path: None,
        };
        let err = Toolchain::discover(&env).unwrap_err();
        assert!(err.message().contains("Can't find armips."));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn armips_override_is_used_verbatim() {
        let env = ToolchainEnv {
            devkitarm_root: Some(PathBuf::from("/nonexistent")),
            armips_override: Some(PathBuf::from("/opt/armips")),
            search_path: None,
        };
        // devkitARM still fails first; the override only covers armips.
        assert!(Toolchain::discover(&env).is_err());
    }
}
