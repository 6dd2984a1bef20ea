// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Symbol-injecting source patcher.
//!
//! Copies the user's assembly template verbatim and appends the computed
//! `allocation` label plus one label per configured define. The derived file
//! is written once and only ever read by the assembler stage.

use std::fs;
use std::path::Path;

use crate::core::error::BuildError;

pub const AUTOGEN_MARKER: &str = "// Beyond this point is autogenerated.";

/// Render the patched source text. `allocation` is a ROM-space address; the
/// label is emitted as a decimal literal, matching what armips sources in the
/// wild expect. Defines without a value bind to 0.
pub fn render_patched_source(
    template: &str,
    allocation: u32,
    defines: &[(String, Option<String>)],
) -> String {
    let mut out = String::with_capacity(template.len() + 128);
    out.push_str(template);
    if !out.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(AUTOGEN_MARKER);
    out.push('\n');
    out.push_str(&format!(".definelabel allocation, {allocation}\n"));
    for (name, value) in defines {
        let value = value.as_deref().unwrap_or("0");
        out.push_str(&format!(".definelabel {name}, {value}\n"));
    }
    out
}

/// Read the template, render, and write the derived source.
pub fn write_patched_source(
    template_path: &Path,
    out_path: &Path,
    allocation: u32,
    defines: &[(String, Option<String>)],
) -> Result<(), BuildError> {
    let template = fs::read_to_string(template_path)
        .map_err(|err| BuildError::io("cannot read assembly template", &err))?;
    let rendered = render_patched_source(&template, allocation, defines);
    fs::write(out_path, rendered)
        .map_err(|err| BuildError::io("cannot write patched assembly source", &err))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defines(pairs: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
            .collect()
    }

    #[test]
    fn template_text_is_kept_verbatim_before_the_marker() {
        let template = ".gba\n.open \"test.gba\", 0x08000000\n.close\n";
        let rendered = render_patched_source(template, 0x0880_0000, &[]);
        assert!(rendered.starts_with(template));
        let marker_ix = rendered.find(AUTOGEN_MARKER).unwrap();
        assert_eq!(&rendered[..marker_ix - 1], template);
    }

    #[test]
    fn allocation_label_binds_the_located_address() {
        let rendered = render_patched_source("", 0x0880_0010, &[]);
        assert!(rendered.contains(&format!(".definelabel allocation, {}", 0x0880_0010u32)));
    }

    #[test]
    fn defines_render_in_insertion_order_with_zero_fallback() {
        let rendered = render_patched_source(
            "",
            0,
            &defines(&[("DEBUG", None), ("MAX_PARTY", Some("6"))]),
        );
        let debug_ix = rendered.find(".definelabel DEBUG, 0\n").unwrap();
        let party_ix = rendered.find(".definelabel MAX_PARTY, 6\n").unwrap();
        assert!(debug_ix < party_ix);
    }

    #[test]
    fn a_template_without_trailing_newline_still_separates_the_marker() {
        let rendered = render_patched_source("lastline", 0, &[]);
        assert!(rendered.contains(&format!("lastline\n\n{AUTOGEN_MARKER}\n")));
    }
}
