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

//! Core emulation components.
//!
//! Everything that models the PSX hardware itself lives here: the CPU,
//! the memory bus and address map, the DMA controller, the GPU command
//! front end, the root counters, the interrupt controller, and the
//! top-level [`system::System`] that wires them together one tick at a
//! time. [`stubs`] holds the unemulated-device placeholders (GTE, CD-ROM,
//! SPU, controller ports) that keep the bus map complete without
//! implementing those subsystems.

pub mod cpu;
pub mod dma;
pub mod error;
pub mod gpu;
pub mod interrupt;
pub mod memory;
pub mod stubs;
pub mod system;
pub mod timer;
