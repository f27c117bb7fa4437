//! Port I/O kernels: IN and OUT. The port number is broadcast on both
//! halves of the address bus, matching the reference part's practice of
//! duplicating A0-A7 onto A8-A15 during input/output cycles.

use crate::cpu::Cpu;
use crate::cpu::pins::status;

use super::{StepOutcome, step_read, step_write};

fn port_address(port: u8) -> u16 {
    u16::from_be_bytes([port, port])
}

pub(super) fn k_in(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        return StepOutcome::Advance;
    }
    let local = local - 1;
    match local / 3 {
        0 => {
            let pc = cpu.regs.pc;
            step_read(cpu, (local % 3) as u8, pc, status::MEM_READ, |cpu, b| {
                cpu.regs.pc = cpu.regs.pc.wrapping_add(1);
                cpu.regs.tmp = b;
                StepOutcome::Advance
            })
        }
        _ => {
            let addr = port_address(cpu.regs.tmp);
            step_read(cpu, (local % 3) as u8, addr, status::INPUT_READ, |cpu, b| {
                cpu.regs.a = b;
                StepOutcome::Done
            })
        }
    }
}

pub(super) fn k_out(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        return StepOutcome::Advance;
    }
    let local = local - 1;
    match local / 3 {
        0 => {
            let pc = cpu.regs.pc;
            step_read(cpu, (local % 3) as u8, pc, status::MEM_READ, |cpu, b| {
                cpu.regs.pc = cpu.regs.pc.wrapping_add(1);
                cpu.regs.tmp = b;
                StepOutcome::Advance
            })
        }
        _ => {
            let addr = port_address(cpu.regs.tmp);
            let a = cpu.regs.a;
            step_write(cpu, (local % 3) as u8, addr, status::OUTPUT_WRITE, a, |_| StepOutcome::Done)
        }
    }
}
