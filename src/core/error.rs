// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Emulator error types
//!
//! All fallible operations in the core crate return [`Result`], whose error
//! variant is [`EmulatorError`]. Bus, CPU, DMA, and loader errors are unified
//! here so callers at the top of the call stack (the CLI, tests) can match on
//! a single type instead of threading module-specific errors through.

use thiserror::Error;

/// Convenience alias used throughout the core modules.
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Errors that can occur during emulation.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// BIOS file could not be opened at the given path.
    #[error("BIOS file not found: {0}")]
    BiosNotFound(String),

    /// BIOS file was found but is not exactly [`crate::core::memory::Bus::BIOS_SIZE`] bytes.
    #[error("invalid BIOS size: expected {expected} bytes, got {got}")]
    InvalidBiosSize { expected: usize, got: usize },

    /// Generic BIOS load failure that isn't a missing file or wrong size.
    #[error("BIOS error: {0}")]
    BiosError(String),

    /// Access to an address with no backing device (open bus).
    #[error("invalid memory access at address 0x{address:08X}")]
    InvalidMemoryAccess { address: u32 },

    /// Access to an address that is mapped but outside the bounds of its device.
    #[error("invalid address 0x{0:08X}")]
    InvalidAddress(u32),

    /// A 16-bit or 32-bit access was not naturally aligned.
    #[error("unaligned access at address 0x{address:08X} (size {size})")]
    UnalignedAccess { address: u32, size: u8 },

    /// A register index outside 0..32 was requested (e.g. from a tracer or debugger).
    #[error("invalid register index: {index}")]
    InvalidRegister { index: u8 },

    /// Disc image / executable loading failure (SYSTEM.CNF parsing, PSX-EXE headers, ...).
    #[error("loader error: {0}")]
    LoaderError(String),

    /// Wrapped I/O error, e.g. from reading a BIOS or trace file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
