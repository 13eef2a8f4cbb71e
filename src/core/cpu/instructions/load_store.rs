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

//! Load and store instructions.
//!
//! All of these are I-type: `op rt, imm(rs)`. Loads write their result
//! through [`CPU::set_reg_delayed`] since every PSX load has a one
//! instruction load delay slot; the unaligned loads (`LWL`/`LWR`) additionally
//! merge with whatever value is still pending in that delay slot rather than
//! the committed register contents, matching real R3000A behavior where the
//! two halves of an `LWL`/`LWR` pair can straddle the delay slot of an
//! earlier load to the same register.

use super::super::decode::decode_i_type;
use super::super::CPU;
use super::data_exception_cause;
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    fn sign_extend_imm(imm: u16) -> u32 {
        (imm as i16) as i32 as u32
    }

    fn effective_address(&self, rs: u8, imm: u16) -> u32 {
        self.reg(rs).wrapping_add(Self::sign_extend_imm(imm))
    }

    /// Raise the appropriate address/bus exception for a failed data access.
    fn raise_data_exception(&mut self, addr: u32, err: &EmulatorError, is_store: bool) {
        self.set_bad_vaddr(addr);
        self.exception(data_exception_cause(err, is_store));
    }

    /// LB: Load Byte (sign-extended)
    pub(crate) fn op_lb(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        match bus.read8(addr) {
            Ok(byte) => {
                self.set_reg_delayed(rt, (byte as i8) as i32 as u32);
            }
            Err(e) => self.raise_data_exception(addr, &e, false),
        }
        Ok(())
    }

    /// LBU: Load Byte Unsigned (zero-extended)
    pub(crate) fn op_lbu(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        match bus.read8(addr) {
            Ok(byte) => {
                self.set_reg_delayed(rt, byte as u32);
            }
            Err(e) => self.raise_data_exception(addr, &e, false),
        }
        Ok(())
    }

    /// LH: Load Halfword (sign-extended). Must be 2-byte aligned.
    pub(crate) fn op_lh(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        match bus.read16(addr) {
            Ok(half) => {
                self.set_reg_delayed(rt, (half as i16) as i32 as u32);
            }
            Err(e) => self.raise_data_exception(addr, &e, false),
        }
        Ok(())
    }

    /// LHU: Load Halfword Unsigned (zero-extended). Must be 2-byte aligned.
    pub(crate) fn op_lhu(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        match bus.read16(addr) {
            Ok(half) => {
                self.set_reg_delayed(rt, half as u32);
            }
            Err(e) => self.raise_data_exception(addr, &e, false),
        }
        Ok(())
    }

    /// LW: Load Word. Must be 4-byte aligned.
    pub(crate) fn op_lw(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        match bus.read32(addr) {
            Ok(word) => {
                self.set_reg_delayed(rt, word);
            }
            Err(e) => self.raise_data_exception(addr, &e, false),
        }
        Ok(())
    }

    /// The value LWL/LWR merge with: a load still sitting in the delay slot
    /// for this same register takes priority over the committed register
    /// value, since on real hardware that load hasn't reached the register
    /// file yet either.
    fn unaligned_load_base(&self, rt: u8) -> u32 {
        self.load_delay_for(rt).unwrap_or_else(|| self.reg(rt))
    }

    /// LWL: Load Word Left. Merges the most-significant bytes of the
    /// addressed word into rt, never faults on alignment.
    pub(crate) fn op_lwl(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        let aligned = addr & !0x3;
        let word = match bus.read32(aligned) {
            Ok(word) => word,
            Err(e) => {
                self.raise_data_exception(addr, &e, false);
                return Ok(());
            }
        };
        let reg = self.unaligned_load_base(rt);
        let merged = match addr & 0x3 {
            0 => (reg & 0x00FF_FFFF) | (word << 24),
            1 => (reg & 0x0000_FFFF) | (word << 16),
            2 => (reg & 0x0000_00FF) | (word << 8),
            3 => word,
            _ => unreachable!(),
        };
        self.set_reg_delayed(rt, merged);
        Ok(())
    }

    /// LWR: Load Word Right. Merges the least-significant bytes of the
    /// addressed word into rt, never faults on alignment.
    pub(crate) fn op_lwr(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        let aligned = addr & !0x3;
        let word = match bus.read32(aligned) {
            Ok(word) => word,
            Err(e) => {
                self.raise_data_exception(addr, &e, false);
                return Ok(());
            }
        };
        let reg = self.unaligned_load_base(rt);
        let merged = match addr & 0x3 {
            0 => word,
            1 => (reg & 0xFF00_0000) | (word >> 8),
            2 => (reg & 0xFFFF_0000) | (word >> 16),
            3 => (reg & 0xFFFF_FF00) | (word >> 24),
            _ => unreachable!(),
        };
        self.set_reg_delayed(rt, merged);
        Ok(())
    }

    /// SB: Store Byte
    pub(crate) fn op_sb(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        let value = self.reg(rt) as u8;
        if let Err(e) = bus.write8(addr, value) {
            self.raise_data_exception(addr, &e, true);
        } else {
            self.invalidate_icache(addr);
        }
        Ok(())
    }

    /// SH: Store Halfword. Must be 2-byte aligned.
    pub(crate) fn op_sh(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        let value = self.reg(rt) as u16;
        if let Err(e) = bus.write16(addr, value) {
            self.raise_data_exception(addr, &e, true);
        } else {
            self.invalidate_icache(addr);
        }
        Ok(())
    }

    /// SW: Store Word. Must be 4-byte aligned.
    pub(crate) fn op_sw(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        let value = self.reg(rt);
        if let Err(e) = bus.write32(addr, value) {
            self.raise_data_exception(addr, &e, true);
        } else {
            self.invalidate_icache(addr);
        }
        Ok(())
    }

    /// SWL: Store Word Left. Writes the most-significant bytes of rt into
    /// the addressed word, never faults on alignment.
    pub(crate) fn op_swl(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        let aligned = addr & !0x3;
        let existing = match bus.read32(aligned) {
            Ok(word) => word,
            Err(e) => {
                self.raise_data_exception(addr, &e, true);
                return Ok(());
            }
        };
        let reg = self.reg(rt);
        let merged = match addr & 0x3 {
            0 => (existing & 0xFFFF_FF00) | (reg >> 24),
            1 => (existing & 0xFFFF_0000) | (reg >> 16),
            2 => (existing & 0xFF00_0000) | (reg >> 8),
            3 => reg,
            _ => unreachable!(),
        };
        if let Err(e) = bus.write32(aligned, merged) {
            self.raise_data_exception(addr, &e, true);
        } else {
            self.invalidate_icache(aligned);
        }
        Ok(())
    }

    /// SWR: Store Word Right. Writes the least-significant bytes of rt into
    /// the addressed word, never faults on alignment.
    pub(crate) fn op_swr(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.effective_address(rs, imm);
        let aligned = addr & !0x3;
        let existing = match bus.read32(aligned) {
            Ok(word) => word,
            Err(e) => {
                self.raise_data_exception(addr, &e, true);
                return Ok(());
            }
        };
        let reg = self.reg(rt);
        let merged = match addr & 0x3 {
            0 => reg,
            1 => (existing & 0x0000_00FF) | (reg << 8),
            2 => (existing & 0x0000_FFFF) | (reg << 16),
            3 => (existing & 0x00FF_FFFF) | (reg << 24),
            _ => unreachable!(),
        };
        if let Err(e) = bus.write32(aligned, merged) {
            self.raise_data_exception(addr, &e, true);
        } else {
            self.invalidate_icache(aligned);
        }
        Ok(())
    }
}
