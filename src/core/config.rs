// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Build configuration loaded from `config.ini`.
//!
//! The file is an INI-style key/value format with three recognized sections:
//! `[main]` for scalar settings, `[short-calls]` listing source files that
//! must be compiled without long calls, and `[defines]` holding preprocessor
//! definitions with optional values. Keys are case-sensitive and values are
//! optional. The open-ended key/value shape is coerced into this closed
//! typed struct exactly once, at load time.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::core::error::{BuildError, BuildErrorKind};
use crate::core::freespace;

const DEFAULT_FREE_SPACE: &str = "0x08800000";
const DEFAULT_OPT_LEVEL: &str = "-O2";
const DEFAULT_RESERVE: &str = "0";

/// GCC optimization levels understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptLevel {
    O,
    O0,
    O1,
    #[default]
    O2,
    O3,
    Ofast,
    Og,
    Os,
}

impl OptLevel {
    /// Parse a `-O…` flag string. Returns `None` for anything outside the
    /// fixed set of levels.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "-O" => Some(Self::O),
            "-O0" => Some(Self::O0),
            "-O1" => Some(Self::O1),
            "-O2" => Some(Self::O2),
            "-O3" => Some(Self::O3),
            "-Ofast" => Some(Self::Ofast),
            "-Og" => Some(Self::Og),
            "-Os" => Some(Self::Os),
            _ => None,
        }
    }

    /// The compiler flag spelling for this level.
    pub fn flag(self) -> &'static str {
        match self {
            Self::O => "-O",
            Self::O0 => "-O0",
            Self::O1 => "-O1",
            Self::O2 => "-O2",
            Self::O3 => "-O3",
            Self::Ofast => "-Ofast",
            Self::Og => "-Og",
            Self::Os => "-Os",
        }
    }
}

/// Resolved, validated build parameters.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Hint address where the free-space search starts, in ROM address space.
    pub base_address: u32,
    pub optimization: OptLevel,
    /// Extra bytes reserved on top of the merged blob size.
    pub reserve_bytes: u32,
    /// Source files compiled with `-mno-long-calls` and excluded from the merge.
    pub short_call_files: HashSet<String>,
    /// Preprocessor defines in insertion order. A `None` value renders as a
    /// bare `-D name` and a label bound to 0.
    pub defines: Vec<(String, Option<String>)>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        // The string defaults round-trip through the same validation as
        // user-provided values.
        parse_fields(
            DEFAULT_FREE_SPACE,
            DEFAULT_OPT_LEVEL,
            DEFAULT_RESERVE,
            HashSet::new(),
            Vec::new(),
        )
        .unwrap_or(Self {
            base_address: 0x0880_0000,
            optimization: OptLevel::O2,
            reserve_bytes: 0,
            short_call_files: HashSet::new(),
            defines: Vec::new(),
        })
    }
}

impl BuildConfig {
    /// Load configuration from `path`. A missing file yields the defaults;
    /// any malformed value is a fatal configuration error.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(BuildError::io(
                    &format!("cannot read {}", path.display()),
                    &err,
                ))
            }
        };
        Self::parse_str(&text)
    }

    /// Parse configuration text. Validation happens here, before any tool
    /// invocation.
    pub fn parse_str(text: &str) -> Result<Self, BuildError> {
        let mut free_space = DEFAULT_FREE_SPACE.to_string();
        let mut opt_level = DEFAULT_OPT_LEVEL.to_string();
        let mut reserve = DEFAULT_RESERVE.to_string();
        let mut short_calls = HashSet::new();
        let mut defines: Vec<(String, Option<String>)> = Vec::new();

        let mut section = String::new();
        for (line_ix, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(rest) = line.strip_prefix('[') {
                let Some(name) = rest.strip_suffix(']') else {
                    return Err(BuildError::new(
                        BuildErrorKind::Config,
                        &format!("unterminated section header on line {}", line_ix + 1),
                        Some(line),
                    ));
                };
                section = name.trim().to_string();
                continue;
            }
            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim().to_string())),
                None => (line, None),
            };
            match section.as_str() {
                "main" => match key {
                    "free-space" => free_space = value.unwrap_or_default(),
                    "optimization-level" => opt_level = value.unwrap_or_default(),
                    "reserve" => reserve = value.unwrap_or_default(),
                    _ => {}
                },
                "short-calls" => {
                    short_calls.insert(key.to_string());
                }
                "defines" => {
                    if let Some(existing) = defines.iter_mut().find(|(name, _)| name == key) {
                        existing.1 = value;
                    } else {
                        defines.push((key.to_string(), value));
                    }
                }
                _ => {}
            }
        }

        parse_fields(&free_space, &opt_level, &reserve, short_calls, defines)
    }
}

fn parse_fields(
    free_space: &str,
    opt_level: &str,
    reserve: &str,
    short_call_files: HashSet<String>,
    defines: Vec<(String, Option<String>)>,
) -> Result<BuildConfig, BuildError> {
    let hex_digits = free_space
        .strip_prefix("0x")
        .or_else(|| free_space.strip_prefix("0X"))
        .unwrap_or(free_space);
    let base_address = u32::from_str_radix(hex_digits, 16).map_err(|_| {
        BuildError::new(
            BuildErrorKind::Config,
            &format!("{free_space} is not a hexadecimal integer."),
            None,
        )
    })?;

    if freespace::normalize_base_address(base_address).is_none() {
        return Err(BuildError::new(
            BuildErrorKind::Config,
            &format!("{free_space} is not inside the ROM address window."),
            None,
        ));
    }

    let reserve_bytes: u32 = reserve.parse().map_err(|_| {
        BuildError::new(
            BuildErrorKind::Config,
            &format!("{reserve} is not a decimal integer."),
            None,
        )
    })?;

    let optimization = OptLevel::parse(opt_level).ok_or_else(|| {
        BuildError::new(
            BuildErrorKind::Config,
            &format!("{opt_level} is not an understood optimization level."),
            None,
        )
    })?;

    Ok(BuildConfig {
        base_address,
        optimization,
        reserve_bytes,
        short_call_files,
        defines,
    })
}
