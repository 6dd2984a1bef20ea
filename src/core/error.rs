// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types and exit-code mapping for the build pipeline.

use std::fmt;
use std::io;

/// Categories of pipeline errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildErrorKind {
    Config,
    Toolchain,
    Io,
    Compile,
    Link,
    Assemble,
    FreeSpace,
}

/// A pipeline error with a kind, a message, and for external-tool failures
/// the child's own exit code.
#[derive(Debug, Clone)]
pub struct BuildError {
    kind: BuildErrorKind,
    message: String,
    tool_exit_code: Option<i32>,
}

impl BuildError {
    pub fn new(kind: BuildErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
            tool_exit_code: None,
        }
    }

    /// An external tool exited non-zero. `code` is `None` when the child was
    /// terminated by a signal.
    pub fn tool_failure(kind: BuildErrorKind, msg: &str, code: Option<i32>) -> Self {
        let message = match code {
            Some(code) => format!("{msg} (exit code {code})"),
            None => format!("{msg} (terminated by signal)"),
        };
        Self {
            kind,
            message,
            tool_exit_code: code,
        }
    }

    pub fn io(msg: &str, err: &io::Error) -> Self {
        Self {
            kind: BuildErrorKind::Io,
            message: format!("{msg}: {err}"),
            tool_exit_code: None,
        }
    }

    pub fn kind(&self) -> BuildErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Process exit code for this error. External tool failures propagate the
    /// tool's code verbatim; everything else is a validation-class failure.
    pub fn exit_code(&self) -> i32 {
        match self.tool_exit_code {
            Some(code) if code != 0 => code,
            _ => 1,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error :: {}", self.message)
    }
}

impl std::error::Error for BuildError {}

/// Format an error message with an optional parameter.
pub fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(p) => format!("{msg}: {p}"),
        None => msg.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_exit_code_one() {
        let err = BuildError::new(BuildErrorKind::Config, "not a hexadecimal integer", Some("zz"));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.message(), "not a hexadecimal integer: zz");
    }

    #[test]
    fn tool_failures_propagate_the_child_exit_code() {
        let err = BuildError::tool_failure(BuildErrorKind::Compile, "Compilation failed.", Some(42));
        assert_eq!(err.exit_code(), 42);
        assert!(err.message().contains("exit code 42"));
    }

    #[test]
    fn signal_terminated_children_map_to_exit_code_one() {
        let err = BuildError::tool_failure(BuildErrorKind::Link, "Linking failed.", None);
        assert_eq!(err.exit_code(), 1);
        assert!(err.message().contains("signal"));
    }

    #[test]
    fn display_uses_the_error_prefix() {
        let err = BuildError::new(BuildErrorKind::Toolchain, "Can't find devkitARM.", None);
        assert_eq!(err.to_string(), "Error :: Can't find devkitARM.");
    }
}
