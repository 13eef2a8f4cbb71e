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

//! System integration module
//!
//! Ties together the CPU, memory bus and the memory-mapped peripherals
//! (GPU, DMA, timers, interrupt controller) and drives the cooperative,
//! single-threaded step loop that advances them in lockstep.

use super::cpu::{CpuTracer, CPU};
use super::dma::DMA;
use super::error::Result;
use super::gpu::GPU;
use super::interrupt::{interrupts, InterruptController};
use super::memory::Bus;
use super::timer::Timers;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// PlayStation System
///
/// Integrates the CPU, memory bus and shared peripherals and drives the
/// step loop that advances them all by one CPU instruction at a time.
///
/// # Components
/// - CPU: MIPS R3000A processor
/// - Bus: Memory bus for RAM, BIOS, and I/O
/// - GPU: Graphics processing unit
/// - DMA: Direct Memory Access controller
/// - Timers: 3 timer/counter channels
/// - InterruptController: Interrupt status/mask registers
///
/// # Example
/// ```no_run
/// use psrx::core::system::System;
///
/// let mut system = System::new();
/// system.load_bios("path/to/bios.bin").unwrap();
/// system.reset();
/// system.step().unwrap();
/// ```
pub struct System {
    /// CPU instance
    cpu: CPU,
    /// Memory bus
    bus: Bus,
    /// GPU instance (shared via Rc<RefCell> for memory-mapped access)
    gpu: Rc<RefCell<GPU>>,
    /// DMA controller (shared via Rc<RefCell> for memory-mapped access)
    dma: Rc<RefCell<DMA>>,
    /// Timers (shared via Rc<RefCell> for memory-mapped access)
    timers: Rc<RefCell<Timers>>,
    /// Interrupt controller (shared via Rc<RefCell> for memory-mapped access)
    interrupt_controller: Rc<RefCell<InterruptController>>,
    /// Total cycles executed
    cycles: u64,
    /// Whether the system is paused (no-op for `step`, used by callers that
    /// drive the loop themselves, e.g. a debugger REPL)
    paused: bool,
    /// True for the single instruction immediately after a debugger-style
    /// single-step request; reserved for callers that want to distinguish a
    /// deliberate single step from free-running execution
    step_instr: bool,
    /// CPU tracer for debugging (optional)
    tracer: Option<CpuTracer>,
    /// Maximum instructions to trace (0 = unlimited)
    trace_limit: usize,
    /// Number of instructions traced so far
    trace_count: usize,
}

impl System {
    /// PSX CPU runs at ~33.8688 MHz. At 60 fps, one frame is ~564,480 cycles.
    pub const CYCLES_PER_FRAME: u64 = 564_480;

    /// Create a new System instance
    ///
    /// Initializes all hardware components to their reset state and wires
    /// them onto the shared memory bus.
    pub fn new() -> Self {
        let gpu = Rc::new(RefCell::new(GPU::new()));
        let dma = Rc::new(RefCell::new(DMA::new()));
        let timers = Rc::new(RefCell::new(Timers::new()));
        let interrupt_controller = Rc::new(RefCell::new(InterruptController::new()));

        let mut bus = Bus::new();
        bus.set_gpu(gpu.clone());
        bus.set_dma(dma.clone());
        bus.set_timers(timers.clone());
        bus.set_interrupt_controller(interrupt_controller.clone());

        log::info!("System: all components initialized");

        Self {
            cpu: CPU::new(),
            bus,
            gpu,
            dma,
            timers,
            interrupt_controller,
            cycles: 0,
            paused: false,
            step_instr: false,
            tracer: None,
            trace_limit: 0,
            trace_count: 0,
        }
    }

    /// Load BIOS from file
    ///
    /// Loads a BIOS ROM file into the system. The BIOS must be 512KB in size.
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Reset the system to initial state
    ///
    /// Resets every component as if the console was power-cycled. This
    /// clears RAM/scratchpad but preserves a loaded BIOS.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.gpu.borrow_mut().reset();
        self.dma.borrow_mut().reset();
        self.timers.borrow_mut().reset();
        self.interrupt_controller.borrow_mut().reset();
        self.cycles = 0;
        self.paused = false;
        self.step_instr = false;
        self.trace_count = 0;
    }

    /// Execute one CPU instruction and advance every peripheral by the
    /// cycles it consumed.
    ///
    /// Components are stepped in a fixed order each call: `cpu`, `gpu`,
    /// `dma`, `timers`, then the interrupt controller. There is no separate
    /// event-scheduling subsystem; every peripheral is driven purely by the
    /// cycle count the CPU instruction took.
    ///
    /// # Returns
    /// `true` if the GPU signalled VBlank (a frame is ready to present)
    /// during this step.
    pub fn step(&mut self) -> Result<bool> {
        if let Some(ref mut tracer) = self.tracer {
            if self.trace_limit == 0 || self.trace_count < self.trace_limit {
                if let Err(e) = tracer.trace(&self.cpu, &self.bus) {
                    log::warn!("Failed to write trace: {}", e);
                }
                self.trace_count += 1;

                if self.trace_count.is_multiple_of(100) {
                    log::debug!("Flushed trace at {} instructions", self.trace_count);
                    let _ = tracer.flush();
                }
            } else if self.trace_count == self.trace_limit {
                log::info!(
                    "Trace limit reached ({} instructions), disabling tracer",
                    self.trace_limit
                );
                let _ = tracer.flush();
                self.trace_count += 1;
            }
        }

        let cpu_cycles = self.cpu.step(&mut self.bus)?;

        // Apply icache invalidation/prefill from memory writes made by this
        // instruction, so self-modifying code and bulk loads stay coherent.
        for addr in self.bus.drain_icache_invalidate_queue() {
            self.cpu.invalidate_icache(addr);
        }
        for (start, end) in self.bus.drain_icache_invalidate_range_queue() {
            self.cpu.invalidate_icache_range(start, end);
        }
        for (addr, instruction) in self.bus.drain_icache_prefill_queue() {
            self.cpu.prefill_icache(addr, instruction);
        }

        let frame_complete = self.gpu.borrow_mut().step(cpu_cycles);
        if frame_complete {
            self.interrupt_controller
                .borrow_mut()
                .signal(interrupts::VBLANK);
        }

        let dma_irq = {
            let ram = self.bus.ram_mut();
            let mut gpu = self.gpu.borrow_mut();
            self.dma.borrow_mut().step(ram, &mut gpu)?
        };
        if dma_irq {
            self.interrupt_controller
                .borrow_mut()
                .signal(interrupts::DMA);
        }

        // Timer 1's sync source is VBlank, which this core treats as firing
        // exactly on the cycle the GPU reports frame completion; HBlank is
        // not separately modelled.
        let timer_irqs = self
            .timers
            .borrow_mut()
            .tick(cpu_cycles, false, frame_complete);
        if timer_irqs[0] {
            self.interrupt_controller
                .borrow_mut()
                .signal(interrupts::TIMER0);
        }
        if timer_irqs[1] {
            self.interrupt_controller
                .borrow_mut()
                .signal(interrupts::TIMER1);
        }
        if timer_irqs[2] {
            self.interrupt_controller
                .borrow_mut()
                .signal(interrupts::TIMER2);
        }

        self.interrupt_controller.borrow_mut().step();

        self.cycles += cpu_cycles as u64;

        Ok(frame_complete)
    }

    /// Execute exactly `n` instructions unless an error occurs.
    pub fn step_n(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// Execute until the GPU reports a completed frame.
    ///
    /// Repeatedly calls [`System::step`] until it reports VBlank, or until
    /// [`System::CYCLES_PER_FRAME`] cycles have elapsed without one
    /// (guards against a hung CPU spinning forever with interrupts masked).
    pub fn run_frame(&mut self) -> Result<()> {
        let target_cycles = self.cycles + Self::CYCLES_PER_FRAME;

        loop {
            let frame_complete = self.step()?;
            if frame_complete || self.cycles >= target_cycles {
                break;
            }
        }

        Ok(())
    }

    /// Run until `paused` is set or a step returns an error.
    ///
    /// There is no windowing or presentation layer in this core (see
    /// [`crate::core::stubs`] and the binary entry point), so "update the
    /// external view" is a no-op here; once per wall-clock second this logs
    /// an estimate of emulated clock speed in place of the title-bar
    /// refresh a windowed frontend would do.
    pub fn run(&mut self) -> Result<()> {
        let mut last_report = Instant::now();
        let mut cycles_at_last_report = self.cycles;

        while !self.paused {
            self.step()?;

            let elapsed = last_report.elapsed();
            if elapsed.as_secs() >= 1 {
                let delta_cycles = self.cycles - cycles_at_last_report;
                let mhz = delta_cycles as f64 / elapsed.as_secs_f64() / 1_000_000.0;
                log::info!("emulated clock: {:.2} MHz", mhz);
                last_report = Instant::now();
                cycles_at_last_report = self.cycles;
            }
        }

        Ok(())
    }

    /// Execute exactly one instruction regardless of the `paused` flag, for
    /// callers (e.g. a debugger REPL) that want to single-step a paused
    /// system. Marks `step_instr` for the duration of the call.
    pub fn step_once(&mut self) -> Result<bool> {
        self.step_instr = true;
        let result = self.step();
        self.step_instr = false;
        result
    }

    /// True while a [`System::step_once`] call is in progress.
    pub fn is_single_stepping(&self) -> bool {
        self.step_instr
    }

    /// Get current PC value
    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    /// Get total cycles executed since reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether the system is currently paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume the system. A paused system is still safe to
    /// [`System::step`] explicitly (e.g. from a debugger), this flag exists
    /// for callers driving their own run loop around `step`/`run_frame`.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Get reference to CPU
    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    /// Get mutable reference to CPU
    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    /// Get reference to memory bus
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Get mutable reference to memory bus
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Get reference to GPU
    pub fn gpu(&self) -> Rc<RefCell<GPU>> {
        Rc::clone(&self.gpu)
    }

    /// Get reference to DMA controller
    pub fn dma(&self) -> Rc<RefCell<DMA>> {
        Rc::clone(&self.dma)
    }

    /// Get reference to timers
    pub fn timers(&self) -> Rc<RefCell<Timers>> {
        Rc::clone(&self.timers)
    }

    /// Get reference to the interrupt controller
    pub fn interrupt_controller(&self) -> Rc<RefCell<InterruptController>> {
        Rc::clone(&self.interrupt_controller)
    }

    /// Enable CPU execution tracing to a file
    pub fn enable_tracing(&mut self, path: &str, limit: usize) -> Result<()> {
        self.tracer = Some(CpuTracer::new(path)?);
        self.trace_limit = limit;
        self.trace_count = 0;
        log::info!(
            "CPU tracing enabled: {} (limit: {})",
            path,
            if limit == 0 {
                "unlimited".to_string()
            } else {
                limit.to_string()
            }
        );
        Ok(())
    }

    /// Disable CPU execution tracing
    pub fn disable_tracing(&mut self) {
        if self.tracer.is_some() {
            log::info!(
                "CPU tracing disabled (traced {} instructions)",
                self.trace_count
            );
            self.tracer = None;
            self.trace_limit = 0;
            self.trace_count = 0;
        }
    }

    /// Check if tracing is currently enabled
    pub fn is_tracing(&self) -> bool {
        self.tracer.is_some()
    }

    /// Get the number of instructions traced so far
    pub fn trace_count(&self) -> usize {
        self.trace_count
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_creation() {
        let system = System::new();

        assert_eq!(system.cycles, 0);
        assert!(!system.paused);
        assert_eq!(system.pc(), 0xBFC00000); // BIOS entry point
        assert!(system.tracer.is_none());
        assert_eq!(system.trace_limit, 0);
        assert_eq!(system.trace_count, 0);
    }

    #[test]
    fn test_system_default() {
        let system1 = System::new();
        let system2 = System::default();

        assert_eq!(system1.cycles, system2.cycles);
        assert_eq!(system1.pc(), system2.pc());
    }

    #[test]
    fn test_system_reset() {
        let mut system = System::new();

        system.cycles = 1000;
        system.trace_count = 50;

        system.reset();

        assert_eq!(system.cycles, 0);
        assert_eq!(system.pc(), 0xBFC00000);
        assert_eq!(system.trace_count, 0);
    }

    #[test]
    fn test_system_initial_pc() {
        let system = System::new();
        assert_eq!(system.pc(), 0xBFC00000);
    }

    #[test]
    fn test_system_initial_cycles() {
        let system = System::new();
        assert_eq!(system.cycles(), 0);
    }

    #[test]
    fn test_system_cpu_access() {
        let system = System::new();
        let cpu = system.cpu();

        assert_eq!(cpu.pc(), 0xBFC00000);
    }

    #[test]
    fn test_system_cpu_mut_access() {
        let mut system = System::new();
        let cpu = system.cpu_mut();

        assert_eq!(cpu.pc(), 0xBFC00000);
    }

    #[test]
    fn test_system_bus_access() {
        let system = System::new();
        let _bus = system.bus();
    }

    #[test]
    fn test_system_bus_mut_access() {
        let mut system = System::new();
        let _bus = system.bus_mut();
    }

    #[test]
    fn test_system_gpu_access() {
        let system = System::new();
        let gpu = system.gpu();

        assert!(gpu.try_borrow().is_ok());
    }

    #[test]
    fn test_system_dma_access() {
        let system = System::new();
        let dma = system.dma();

        assert!(dma.try_borrow().is_ok());
    }

    #[test]
    fn test_system_timers_access() {
        let system = System::new();
        let timers = system.timers();

        assert!(timers.try_borrow().is_ok());
    }

    #[test]
    fn test_system_interrupt_controller_access() {
        let system = System::new();
        let ic = system.interrupt_controller();

        assert!(ic.try_borrow().is_ok());
    }

    #[test]
    fn test_tracing_disabled_by_default() {
        let system = System::new();
        assert!(!system.is_tracing());
        assert_eq!(system.trace_count(), 0);
    }

    #[test]
    fn test_disable_tracing_when_not_enabled() {
        let mut system = System::new();

        system.disable_tracing();

        assert!(!system.is_tracing());
    }

    #[test]
    fn test_system_components_share_connections() {
        let system = System::new();

        let gpu1 = system.gpu();
        let gpu2 = system.gpu();

        assert!(Rc::ptr_eq(&gpu1, &gpu2));
    }

    #[test]
    fn test_system_reset_preserves_bios() {
        let mut system = System::new();

        // We can't easily load a BIOS in tests without a file, but reset
        // should not panic and PC should land at the BIOS entry vector.
        system.reset();

        assert_eq!(system.pc(), 0xBFC00000);
    }

    #[test]
    fn test_system_step_n_zero() {
        let mut system = System::new();
        system.reset();

        let result = system.step_n(0);
        assert!(result.is_ok());
    }

    #[test]
    fn test_system_cycles_increment() {
        let mut system = System::new();
        system.reset();

        let initial_cycles = system.cycles();

        // Execute one instruction (may fail without BIOS, but that's ok for this test)
        let _ = system.step();

        assert!(system.cycles() >= initial_cycles);
    }

    #[test]
    fn test_system_multiple_resets() {
        let mut system = System::new();

        for _ in 0..5 {
            system.reset();
            assert_eq!(system.pc(), 0xBFC00000);
            assert_eq!(system.cycles(), 0);
        }
    }

    #[test]
    fn test_system_components_independent_borrowing() {
        let system = System::new();

        let gpu_rc = system.gpu();
        let dma_rc = system.dma();
        let timers_rc = system.timers();

        let _gpu = gpu_rc.borrow();
        let _dma = dma_rc.borrow();
        let _timers = timers_rc.borrow();

        // Should not panic - all are independent Rc<RefCell<>>
    }

    #[test]
    fn test_system_cycles_per_frame_constant() {
        // PSX CPU: ~33.8688 MHz / 60 fps ≈ 564,480 cycles
        assert_eq!(System::CYCLES_PER_FRAME, 564_480);
    }

    #[test]
    fn test_system_reset_clears_cycles() {
        let mut system = System::new();

        system.cycles = 1_000_000;
        system.reset();

        assert_eq!(system.cycles, 0);
    }

    #[test]
    fn test_system_pause_resume() {
        let mut system = System::new();

        assert!(!system.is_paused());
        system.set_paused(true);
        assert!(system.is_paused());
        system.set_paused(false);
        assert!(!system.is_paused());
    }

    #[test]
    fn test_system_reset_clears_pause_flag() {
        let mut system = System::new();

        system.set_paused(true);
        system.reset();

        assert!(!system.is_paused());
    }

    #[test]
    fn test_system_run_returns_immediately_when_paused() {
        let mut system = System::new();
        system.reset();
        system.set_paused(true);

        let cycles_before = system.cycles();
        let result = system.run();

        assert!(result.is_ok());
        assert_eq!(system.cycles(), cycles_before);
    }

    #[test]
    fn test_system_step_once_advances_cycles() {
        let mut system = System::new();
        system.reset();

        let cycles_before = system.cycles();
        let _ = system.step_once();

        assert!(!system.is_single_stepping());
        assert!(system.cycles() >= cycles_before);
    }
}
