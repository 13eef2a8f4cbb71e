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

//! Instruction decode and dispatch.
//!
//! [`CPU::execute_instruction`] is the single entry point `step()` calls
//! once the instruction word has been fetched into `self.current_instruction`
//! and the PC has been advanced. It decodes the primary opcode and routes to
//! the `op_*` handlers implemented across the sibling modules, or to the
//! load/store handlers implemented directly below.

use super::decode::{decode_i_type, decode_r_type};
use super::{ExceptionCause, CPU};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::Bus;

mod arithmetic;
mod branch;
mod cop0;
mod exception;
mod jump;
mod load_store;
mod logical;
mod multiply;
mod shift;

/// Translate a bus error into the COP0 exception it represents for a data
/// access. Unaligned accesses are address errors; everything else the bus
/// can still fail on (e.g. an out-of-range expansion offset) is a bus
/// error. Unmapped addresses never reach here: the bus resolves them
/// silently (zero on read, dropped on write).
fn data_exception_cause(err: &EmulatorError, is_store: bool) -> ExceptionCause {
    match err {
        EmulatorError::UnalignedAccess { .. } => {
            if is_store {
                ExceptionCause::AddressErrorStore
            } else {
                ExceptionCause::AddressErrorLoad
            }
        }
        _ => ExceptionCause::BusErrorData,
    }
}

impl CPU {
    /// Decode `self.current_instruction` and dispatch to the matching
    /// handler.
    ///
    /// Unknown or unimplemented primary opcodes raise a `ReservedInstruction`
    /// exception rather than being silently skipped, matching how real
    /// hardware (and the BIOS's own exception handler) reacts to bad code.
    pub(crate) fn execute_instruction(&mut self, bus: &mut Bus) -> Result<()> {
        let instruction = self.current_instruction;
        let (op, rs, rt, _imm) = decode_i_type(instruction);

        match op {
            0x00 => self.execute_special(instruction),
            0x01 => self.execute_bcondz(instruction),
            0x02 => self.op_j(instruction),
            0x03 => self.op_jal(instruction),
            0x04 => self.op_beq(instruction),
            0x05 => self.op_bne(instruction),
            0x06 => self.op_blez(instruction),
            0x07 => self.op_bgtz(instruction),
            0x08 => self.op_addi(instruction),
            0x09 => self.op_addiu(instruction),
            0x0A => self.op_slti(instruction),
            0x0B => self.op_sltiu(instruction),
            0x0C => self.op_andi(instruction),
            0x0D => self.op_ori(instruction),
            0x0E => self.op_xori(instruction),
            0x0F => self.op_lui(instruction),
            0x10 => self.execute_cop0(instruction),
            0x11 => {
                self.exception(ExceptionCause::CoprocessorUnusable);
                Ok(())
            }
            0x12 => self.execute_cop2(instruction),
            0x13 => {
                self.exception(ExceptionCause::CoprocessorUnusable);
                Ok(())
            }
            0x20 => self.op_lb(bus, instruction),
            0x21 => self.op_lh(bus, instruction),
            0x22 => self.op_lwl(bus, instruction),
            0x23 => self.op_lw(bus, instruction),
            0x24 => self.op_lbu(bus, instruction),
            0x25 => self.op_lhu(bus, instruction),
            0x26 => self.op_lwr(bus, instruction),
            0x28 => self.op_sb(bus, instruction),
            0x29 => self.op_sh(bus, instruction),
            0x2A => self.op_swl(bus, instruction),
            0x2B => self.op_sw(bus, instruction),
            0x2E => self.op_swr(bus, instruction),
            0x30 | 0x31 | 0x33..=0x37 | 0x39 | 0x3B..=0x3F => {
                // LWC0/LWC1/LWC3/SWC0/SWC1/SWC3: coprocessors 0, 1 and 3 do
                // not support memory-to-register transfers on this CPU.
                self.exception(ExceptionCause::CoprocessorUnusable);
                Ok(())
            }
            0x32 => self.op_lwc2(bus, instruction),
            0x3A => self.op_swc2(bus, instruction),
            _ => {
                log::warn!(
                    "reserved instruction: opcode=0x{op:02X} rs={rs} rt={rt} word=0x{instruction:08X}"
                );
                self.exception(ExceptionCause::ReservedInstruction);
                Ok(())
            }
        }
    }

    /// Dispatch opcode 0x00 (SPECIAL) by funct field.
    fn execute_special(&mut self, instruction: u32) -> Result<()> {
        let (rs, rt, rd, shamt, funct) = decode_r_type(instruction);

        match funct {
            0x00 => self.op_sll(rt, rd, shamt),
            0x02 => self.op_srl(rt, rd, shamt),
            0x03 => self.op_sra(rt, rd, shamt),
            0x04 => self.op_sllv(rs, rt, rd),
            0x06 => self.op_srlv(rs, rt, rd),
            0x07 => self.op_srav(rs, rt, rd),
            0x08 => self.op_jr(rs),
            0x09 => self.op_jalr(rs, rd),
            0x0C => self.op_syscall(instruction),
            0x0D => self.op_break(instruction),
            0x10 => self.op_mfhi(rd),
            0x11 => self.op_mthi(rs),
            0x12 => self.op_mflo(rd),
            0x13 => self.op_mtlo(rs),
            0x18 => self.op_mult(rs, rt),
            0x19 => self.op_multu(rs, rt),
            0x1A => self.op_div(rs, rt),
            0x1B => self.op_divu(rs, rt),
            0x20 => self.op_add(rs, rt, rd),
            0x21 => self.op_addu(rs, rt, rd),
            0x22 => self.op_sub(rs, rt, rd),
            0x23 => self.op_subu(rs, rt, rd),
            0x24 => self.op_and(rs, rt, rd),
            0x25 => self.op_or(rs, rt, rd),
            0x26 => self.op_xor(rs, rt, rd),
            0x27 => self.op_nor(rs, rt, rd),
            0x2A => self.op_slt(rs, rt, rd),
            0x2B => self.op_sltu(rs, rt, rd),
            _ => {
                log::warn!("reserved SPECIAL funct=0x{funct:02X} word=0x{instruction:08X}");
                self.exception(ExceptionCause::ReservedInstruction);
                Ok(())
            }
        }
    }

    /// Dispatch opcode 0x10 (COP0) by the rs field, which on this CPU
    /// distinguishes MFC0/MTC0 (rs < 0x10) from the COP0 "CO" instructions
    /// (rs == 0x10, funct selects RFE/TLB ops, only RFE is implemented on
    /// the R3000A since it has no TLB).
    fn execute_cop0(&mut self, instruction: u32) -> Result<()> {
        let (rs, _rt, _rd, _shamt, funct) = decode_r_type(instruction);

        match rs {
            0x00 => self.op_mfc0(instruction),
            0x04 => self.op_mtc0(instruction),
            0x10 => {
                if funct == 0x10 {
                    self.op_rfe(instruction)
                } else {
                    log::warn!("unhandled COP0 CO funct=0x{funct:02X}");
                    self.exception(ExceptionCause::ReservedInstruction);
                    Ok(())
                }
            }
            _ => {
                self.exception(ExceptionCause::ReservedInstruction);
                Ok(())
            }
        }
    }

    /// Dispatch opcode 0x12 (COP2/GTE) by the rs field: MFC2/CFC2/MTC2/CTC2
    /// move data to or from the GPR file, anything else is a GTE command.
    fn execute_cop2(&mut self, instruction: u32) -> Result<()> {
        let (rs, rt, rd, _shamt, _funct) = decode_r_type(instruction);

        match rs {
            0x00 => {
                let value = self.gte.read_data(rd);
                self.set_reg_delayed(rt, value);
                Ok(())
            }
            0x02 => {
                let value = self.gte.read_control(rd);
                self.set_reg_delayed(rt, value);
                Ok(())
            }
            0x04 => {
                let value = self.reg(rt);
                self.gte.write_data(rd, value);
                Ok(())
            }
            0x06 => {
                let value = self.reg(rt);
                self.gte.write_control(rd, value);
                Ok(())
            }
            _ => {
                // rs bit 4 set: this is a GTE execute-form command, not a
                // register transfer. The low 25 bits are the command.
                self.gte.execute_command(instruction & 0x01FF_FFFF);
                Ok(())
            }
        }
    }

    /// LWC2: load word to a GTE data register.
    pub(crate) fn op_lwc2(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);
        match bus.read32(addr) {
            Ok(value) => {
                self.gte.write_data(rt, value);
                Ok(())
            }
            Err(e) => {
                self.set_bad_vaddr(addr);
                self.exception(data_exception_cause(&e, false));
                Ok(())
            }
        }
    }

    /// SWC2: store a GTE data register to memory.
    pub(crate) fn op_swc2(&mut self, bus: &mut Bus, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);
        let value = self.gte.read_data(rt);
        if let Err(e) = bus.write32(addr, value) {
            self.set_bad_vaddr(addr);
            self.exception(data_exception_cause(&e, true));
        }
        Ok(())
    }
}
