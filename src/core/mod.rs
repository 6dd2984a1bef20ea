// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Leaf building blocks of the pipeline: configuration, errors, toolchain
//! discovery, workspace paths, and the free-space search.

pub mod config;
pub mod error;
pub mod freespace;
pub mod toolchain;
pub mod workspace;
