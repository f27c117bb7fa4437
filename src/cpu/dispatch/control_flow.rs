//! Control-transfer kernels: JMP/Jcond, CALL/Ccond, RET/Rcond, RST, PCHL.
//!
//! `Ccond`/`Rcond` do *not* keep a fixed step count: the reference part
//! itself takes fewer T-states on the untaken path (11 vs. 17 for Ccond, 5
//! vs. 11 for Rcond), so these kernels evaluate the condition on their
//! first local step and return `Done` early on the untaken path rather than
//! idling out to match the taken path's length. `decode::KERNEL_BASE`
//! records the longer, taken-path size for bookkeeping purposes only.
//!
//! `CALL`/`Ccond`(both branches)/`RST`/`PUSH` each carry two compensating
//! idle states rather than one: real silicon spends one extra internal
//! state beyond a naive 3-states-per-machine-cycle count on every
//! instruction whose last machine cycle is a stack write, on top of the
//! usual one-state fetch-shortfall compensation every kernel needs.

use crate::cpu::Cpu;
use crate::cpu::decode;
use crate::cpu::pins::status;

use super::{StepOutcome, idle_then_done, step_read, step_write};

fn read_target_address(cpu: &mut Cpu, local: u16) -> StepOutcome {
    let cycle = local / 3;
    let phase = (local % 3) as u8;
    let pc = cpu.regs.pc;
    if cycle == 0 {
        step_read(cpu, phase, pc, status::MEM_READ, |cpu, b| {
            cpu.regs.pc = cpu.regs.pc.wrapping_add(1);
            cpu.regs.wz = (cpu.regs.wz & 0xFF00) | b as u16;
            StepOutcome::Advance
        })
    } else {
        step_read(cpu, phase, pc, status::MEM_READ, |cpu, b| {
            cpu.regs.pc = cpu.regs.pc.wrapping_add(1);
            let lo = (cpu.regs.wz & 0x00FF) as u8;
            cpu.regs.wz = u16::from_le_bytes([lo, b]);
            StepOutcome::Done
        })
    }
}

pub(super) fn k_jmp(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        return StepOutcome::Advance;
    }
    let local = local - 1;
    match read_target_address(cpu, local) {
        StepOutcome::Done => {
            cpu.regs.pc = cpu.regs.wz;
            StepOutcome::Done
        }
        other => other,
    }
}

pub(super) fn k_jcond(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        return StepOutcome::Advance;
    }
    let local = local - 1;
    match read_target_address(cpu, local) {
        StepOutcome::Done => {
            if decode::eval_condition(decode::ccc(cpu.regs.ir), &cpu.regs) {
                cpu.regs.pc = cpu.regs.wz;
            }
            StepOutcome::Done
        }
        other => other,
    }
}

fn push_return_address(cpu: &mut Cpu, local: u16) -> StepOutcome {
    let cycle = local / 3;
    let phase = (local % 3) as u8;
    let pc = cpu.regs.pc;
    if cycle == 0 {
        let addr = cpu.regs.sp.wrapping_sub(1);
        let hi = (pc >> 8) as u8;
        step_write(cpu, phase, addr, status::STACK_WRITE, hi, |cpu| {
            cpu.regs.sp = cpu.regs.sp.wrapping_sub(1);
            StepOutcome::Advance
        })
    } else {
        let addr = cpu.regs.sp.wrapping_sub(1);
        let lo = (pc & 0x00FF) as u8;
        step_write(cpu, phase, addr, status::STACK_WRITE, lo, |cpu| {
            cpu.regs.sp = cpu.regs.sp.wrapping_sub(1);
            StepOutcome::Done
        })
    }
}

pub(super) fn k_call(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local < 2 {
        return StepOutcome::Advance;
    }
    let local = local - 2;
    if local < 6 {
        return read_target_address(cpu, local).then_advance();
    }
    match push_return_address(cpu, local - 6) {
        StepOutcome::Done => {
            cpu.regs.pc = cpu.regs.wz;
            StepOutcome::Done
        }
        other => other,
    }
}

pub(super) fn k_ccond(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        let taken = decode::eval_condition(decode::ccc(cpu.regs.ir), &cpu.regs);
        cpu.regs.tmp = taken as u8;
    }
    if local < 2 {
        return StepOutcome::Advance;
    }
    let local = local - 2;
    if local < 6 {
        return match read_target_address(cpu, local) {
            StepOutcome::Done if cpu.regs.tmp == 0 => StepOutcome::Done,
            other => other.then_advance(),
        };
    }
    match push_return_address(cpu, local - 6) {
        StepOutcome::Done => {
            cpu.regs.pc = cpu.regs.wz;
            StepOutcome::Done
        }
        other => other,
    }
}

fn pop_into_wz(cpu: &mut Cpu, local: u16) -> StepOutcome {
    let cycle = local / 3;
    let phase = (local % 3) as u8;
    let sp = cpu.regs.sp;
    if cycle == 0 {
        step_read(cpu, phase, sp, status::STACK_READ, |cpu, b| {
            cpu.regs.sp = cpu.regs.sp.wrapping_add(1);
            cpu.regs.wz = (cpu.regs.wz & 0xFF00) | b as u16;
            StepOutcome::Advance
        })
    } else {
        let sp = cpu.regs.sp;
        step_read(cpu, phase, sp, status::STACK_READ, |cpu, b| {
            cpu.regs.sp = cpu.regs.sp.wrapping_add(1);
            let lo = (cpu.regs.wz & 0x00FF) as u8;
            cpu.regs.wz = u16::from_le_bytes([lo, b]);
            StepOutcome::Done
        })
    }
}

pub(super) fn k_ret(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        return StepOutcome::Advance;
    }
    let local = local - 1;
    match pop_into_wz(cpu, local) {
        StepOutcome::Done => {
            cpu.regs.pc = cpu.regs.wz;
            StepOutcome::Done
        }
        other => other,
    }
}

pub(super) fn k_rcond(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        let taken = decode::eval_condition(decode::ccc(cpu.regs.ir), &cpu.regs);
        cpu.regs.tmp = taken as u8;
        return StepOutcome::Advance;
    }
    if local == 1 {
        return if cpu.regs.tmp == 0 { StepOutcome::Done } else { StepOutcome::Advance };
    }
    match pop_into_wz(cpu, local - 2) {
        StepOutcome::Done => {
            cpu.regs.pc = cpu.regs.wz;
            StepOutcome::Done
        }
        other => other,
    }
}

pub(super) fn k_rst(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local < 2 {
        return StepOutcome::Advance;
    }
    let local = local - 2;
    match push_return_address(cpu, local) {
        StepOutcome::Done => {
            cpu.regs.pc = (decode::nnn(cpu.regs.ir) as u16) * 8;
            StepOutcome::Done
        }
        other => other,
    }
}

pub(super) fn k_pchl(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        cpu.regs.pc = cpu.regs.hl();
    }
    idle_then_done(local, 2)
}

trait ThenAdvance {
    fn then_advance(self) -> StepOutcome;
}

impl ThenAdvance for StepOutcome {
    /// Used where a helper's own `Done` must not end the kernel because
    /// more local steps follow it in the caller.
    fn then_advance(self) -> StepOutcome {
        match self {
            StepOutcome::Done => StepOutcome::Advance,
            other => other,
        }
    }
}
