//! EI, DI, HLT, NOP.

use crate::cpu::Cpu;
use crate::cpu::pins::status;

use super::{StepOutcome, idle_then_done, step_read};

pub(super) fn k_ei(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        cpu.pins.set_inte(true);
    }
    idle_then_done(local, 1)
}

pub(super) fn k_di(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        cpu.pins.set_inte(false);
    }
    idle_then_done(local, 1)
}

/// HLT still emits a machine cycle, carrying halt-acknowledge status, whose
/// fetched byte is discarded; the core then stops advancing `step` and
/// `pc` until an interrupt or `reset()` releases it.
pub(super) fn k_hlt(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        return StepOutcome::Advance;
    }
    let local = local - 1;
    let pc = cpu.regs.pc;
    step_read(cpu, local as u8, pc, status::HALT_ACK, |cpu, _b| {
        cpu.halted = true;
        StepOutcome::Done
    })
}

pub(super) fn k_nop(_cpu: &mut Cpu, local: u16) -> StepOutcome {
    idle_then_done(local, 1)
}
