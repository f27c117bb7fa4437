/*!
cpu/mod.rs - Public façade over the 8080 core: construction, `reset()`,
`tick()`, and the read-only accessors a collaborator uses between ticks.

The actual step machine lives in `dispatch`; this module only owns the
`Cpu` value and re-exports the pieces a caller needs.
*/

pub mod decode;
pub mod dispatch;
pub mod pins;
pub mod regs;

use pins::Pins;
use regs::Registers;

/// A complete Intel 8080 core. `tick()` is the sole mutation entry point;
/// everything else is either construction, `reset()`, or a read-only
/// accessor over the pin word / register file.
#[derive(Debug, Clone)]
pub struct Cpu {
    pub(crate) pins: Pins,
    pub(crate) regs: Registers,
    pub(crate) status: u8,
    /// Global step counter. 0-2 are the fixed fetch states; from 3 onward
    /// it is `KERNEL_BASE[kernel] + local_step` for the kernel currently
    /// executing.
    pub(crate) step: u16,
    pub(crate) kernel: u8,
    pub(crate) halted: bool,
    /// Set when an interrupt has been latched and the upcoming fetch must
    /// emit an acknowledge cycle instead of a normal instruction fetch.
    pub(crate) int_pending: bool,
    /// Set alongside `int_pending` when the core was halted at the moment
    /// the interrupt was accepted; selects the halted acknowledge variant.
    pub(crate) int_while_halt: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu {
            pins: Pins::powered_on(),
            regs: Registers::default(),
            status: 0,
            step: 0,
            kernel: 0,
            halted: false,
            int_pending: false,
            int_while_halt: false,
        }
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores PC and the step counter to zero and clears the
    /// stopped/interrupt latches. Does not alter A, F, the register pairs,
    /// or flags. The pin word is cleared except READY, which is raised.
    pub fn reset(&mut self) {
        self.regs.pc = 0;
        self.step = 0;
        self.kernel = 0;
        self.halted = false;
        self.int_pending = false;
        self.int_while_halt = false;
        self.pins = Pins::powered_on();
    }

    /// Advance the core by exactly one T-state.
    pub fn tick(&mut self) {
        dispatch::tick(self);
    }

    // -----------------------------------------------------------------
    // Pin word accessors (spec §4.1)
    // -----------------------------------------------------------------

    pub fn address(&self) -> u16 {
        self.pins.address()
    }

    pub fn data(&self) -> u8 {
        self.pins.data()
    }

    pub fn set_data(&mut self, byte: u8) {
        self.pins.set_data(byte);
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn sync(&self) -> bool {
        self.pins.sync()
    }
    pub fn dbin(&self) -> bool {
        self.pins.dbin()
    }
    pub fn wr(&self) -> bool {
        self.pins.wr()
    }
    pub fn wait(&self) -> bool {
        self.pins.wait()
    }
    pub fn inte(&self) -> bool {
        self.pins.inte()
    }

    /// Raise or lower the INT input pin. Driven by the collaborator.
    pub fn set_int(&mut self, v: bool) {
        self.pins.set_int(v);
    }

    /// Raise or lower the READY input pin. Driven by the collaborator.
    pub fn set_ready(&mut self, v: bool) {
        self.pins.set_ready(v);
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    // -----------------------------------------------------------------
    // Register accessors
    // -----------------------------------------------------------------

    pub fn get_reg(&self, code: u8) -> u8 {
        self.regs.get_r(code)
    }

    pub fn get_pair(&self, rp: u8) -> u16 {
        self.regs.pair(rp)
    }

    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn sp(&self) -> u16 {
        self.regs.sp
    }

    pub fn a(&self) -> u8 {
        self.regs.a
    }

    pub fn f(&self) -> u8 {
        self.regs.f
    }

    pub fn z(&self) -> bool {
        self.regs.zero()
    }
    pub fn s(&self) -> bool {
        self.regs.sign()
    }
    pub fn p(&self) -> bool {
        self.regs.parity()
    }
    pub fn cy(&self) -> bool {
        self.regs.carry()
    }
    pub fn ac(&self) -> bool {
        self.regs.aux_carry()
    }

    /// Test-only: seed arbitrary register state without going through the
    /// bus protocol. Not part of the pin-level contract.
    #[cfg(test)]
    pub(crate) fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_preserves_a_f_pairs_but_zeroes_pc() {
        let mut cpu = Cpu::new();
        cpu.regs_mut().a = 0x42;
        cpu.regs_mut().set_f(0x05);
        cpu.regs_mut().set_bc(0x1234);
        cpu.regs_mut().pc = 0x8000;
        cpu.reset();
        assert_eq!(cpu.pc(), 0);
        assert_eq!(cpu.a(), 0x42);
        assert_eq!(cpu.get_pair(0), 0x1234);
        assert!(cpu.pins.ready());
    }

    #[test]
    fn default_cpu_is_not_halted_and_at_step_zero() {
        let cpu = Cpu::new();
        assert!(!cpu.halted());
        assert_eq!(cpu.step, 0);
    }
}
