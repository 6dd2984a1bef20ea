// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Free-space search over a ROM image.
//!
//! The ROM is treated as an opaque byte stream. Regions never written by the
//! original data keep their erased-flash value, so a contiguous run of
//! 4-byte-aligned words of `0xFF` bytes is safe to overwrite with new
//! word-aligned code. The scan walks strictly forward from a hint address
//! and returns the first run long enough for the requested word count.

use std::io::{self, Read, Seek, SeekFrom};

use crate::core::error::{BuildError, BuildErrorKind};

/// Mapping bit carried by addresses in the ROM's address window.
pub const ROM_ADDR_MASK: u32 = 0x0800_0000;

const ERASED_WORD: [u8; 4] = [0xFF; 4];

/// File offset for a ROM-space address.
pub fn rom_offset(addr: u32) -> u32 {
    addr & !ROM_ADDR_MASK
}

/// ROM-space address for a file offset.
pub fn rom_address(offset: u32) -> u32 {
    offset | ROM_ADDR_MASK
}

/// Next multiple of 4 at or above `addr`. Idempotent on aligned input.
/// `None` when no aligned address at or above `addr` exists.
pub fn align_up_to_word(addr: u32) -> Option<u32> {
    addr.checked_add(3).map(|value| value & !3)
}

/// Word count needed to hold `blob_size_bytes` plus the reserve, one word
/// being 4 bytes. An exactly divisible total yields no extra word.
pub fn needed_words(blob_size_bytes: u64, reserve_bytes: u32) -> u32 {
    (blob_size_bytes + u64::from(reserve_bytes)).div_ceil(4) as u32
}

/// Map a hint address into the ROM window and word-align it. `None` for
/// values too close to the top of the address space to align.
pub fn normalize_base_address(addr: u32) -> Option<u32> {
    align_up_to_word(addr | ROM_ADDR_MASK)
}

/// Find the first run of at least `needed` erased words at or after
/// `start_addr`, scanning word by word.
///
/// Returns the ROM-space address of the run's first word. When `needed` is 0
/// there is nothing to place and the normalized start address is returned
/// without reading the image. Exhausting the image before a long-enough run
/// is found is a fatal error; the search never wraps around.
pub fn find_free_run<R: Read + Seek>(
    image: &mut R,
    start_addr: u32,
    needed: u32,
) -> Result<u32, BuildError> {
    let start = normalize_base_address(start_addr).ok_or_else(|| {
        BuildError::new(
            BuildErrorKind::FreeSpace,
            &format!("{start_addr:#010X} is not inside the ROM address window."),
            None,
        )
    })?;
    if needed == 0 {
        return Ok(start);
    }

    image
        .seek(SeekFrom::Start(u64::from(rom_offset(start))))
        .map_err(|err| BuildError::io("cannot seek in ROM image", &err))?;

    let mut offset = rom_offset(start);
    let mut run_start: Option<u32> = None;
    let mut count: u32 = 0;
    let mut word = [0u8; 4];

    loop {
        match image.read_exact(&mut word) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(BuildError::new(
                    BuildErrorKind::FreeSpace,
                    &format!(
                        "No free region of {needed} words found at or after {:#010X}.",
                        start
                    ),
                    None,
                ));
            }
            Err(err) => return Err(BuildError::io("cannot read ROM image", &err)),
        }

        if word == ERASED_WORD {
            if run_start.is_none() {
                run_start = Some(offset);
                count = 0;
            }
            count += 1;
            if count >= needed {
                // run_start is set on the first erased word of the run
                return Ok(rom_address(run_start.unwrap_or(offset)));
            }
        } else {
            run_start = None;
            count = 0;
        }
        offset += 4;
    }
}
