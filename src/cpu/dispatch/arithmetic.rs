//! Arithmetic kernels: the additive ALU family, INR/DCR, 16-bit INX/DCX/DAD,
//! and DAA.

use crate::cpu::Cpu;
use crate::cpu::decode;
use crate::cpu::pins::status;

use super::{StepOutcome, idle_then_done, step_read, step_write};

macro_rules! alu_r_kernel {
    ($name:ident, $op:ident) => {
        pub(super) fn $name(cpu: &mut Cpu, local: u16) -> StepOutcome {
            if local == 0 {
                let v = cpu.regs.get_r(decode::src(cpu.regs.ir));
                cpu.regs.$op(v);
            }
            idle_then_done(local, 1)
        }
    };
}

macro_rules! alu_m_kernel {
    ($name:ident, $op:ident) => {
        pub(super) fn $name(cpu: &mut Cpu, local: u16) -> StepOutcome {
            if local == 0 {
                return StepOutcome::Advance;
            }
            let local = local - 1;
            let addr = cpu.regs.hl();
            step_read(cpu, local as u8, addr, status::MEM_READ, |cpu, b| {
                cpu.regs.$op(b);
                StepOutcome::Done
            })
        }
    };
}

macro_rules! alu_i_kernel {
    ($name:ident, $op:ident) => {
        pub(super) fn $name(cpu: &mut Cpu, local: u16) -> StepOutcome {
            if local == 0 {
                return StepOutcome::Advance;
            }
            let local = local - 1;
            let pc = cpu.regs.pc;
            step_read(cpu, local as u8, pc, status::MEM_READ, |cpu, b| {
                cpu.regs.pc = cpu.regs.pc.wrapping_add(1);
                cpu.regs.$op(b);
                StepOutcome::Done
            })
        }
    };
}

alu_r_kernel!(k_add_r, add);
alu_m_kernel!(k_add_m, add);
alu_i_kernel!(k_adi, add);
alu_r_kernel!(k_adc_r, adc);
alu_m_kernel!(k_adc_m, adc);
alu_i_kernel!(k_aci, adc);
alu_r_kernel!(k_sub_r, sub);
alu_m_kernel!(k_sub_m, sub);
alu_i_kernel!(k_sui, sub);
alu_r_kernel!(k_sbb_r, sbb);
alu_m_kernel!(k_sbb_m, sbb);
alu_i_kernel!(k_sbi, sbb);

pub(super) fn k_inr_r(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        let code = decode::dst(cpu.regs.ir);
        let v = cpu.regs.get_r(code);
        let r = cpu.regs.inr(v);
        cpu.regs.set_r(code, r);
    }
    idle_then_done(local, 2)
}

pub(super) fn k_dcr_r(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        let code = decode::dst(cpu.regs.ir);
        let v = cpu.regs.get_r(code);
        let r = cpu.regs.dcr(v);
        cpu.regs.set_r(code, r);
    }
    idle_then_done(local, 2)
}

pub(super) fn k_inr_m(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        return StepOutcome::Advance;
    }
    let local = local - 1;
    match local / 3 {
        0 => {
            let addr = cpu.regs.hl();
            step_read(cpu, (local % 3) as u8, addr, status::MEM_READ, |cpu, b| {
                cpu.regs.tmp = cpu.regs.inr(b);
                StepOutcome::Advance
            })
        }
        _ => {
            let addr = cpu.regs.hl();
            let v = cpu.regs.tmp;
            step_write(cpu, (local % 3) as u8, addr, status::MEM_WRITE, v, |_| StepOutcome::Done)
        }
    }
}

pub(super) fn k_dcr_m(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        return StepOutcome::Advance;
    }
    let local = local - 1;
    match local / 3 {
        0 => {
            let addr = cpu.regs.hl();
            step_read(cpu, (local % 3) as u8, addr, status::MEM_READ, |cpu, b| {
                cpu.regs.tmp = cpu.regs.dcr(b);
                StepOutcome::Advance
            })
        }
        _ => {
            let addr = cpu.regs.hl();
            let v = cpu.regs.tmp;
            step_write(cpu, (local % 3) as u8, addr, status::MEM_WRITE, v, |_| StepOutcome::Done)
        }
    }
}

pub(super) fn k_inx(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        let rp = decode::rp(cpu.regs.ir);
        cpu.regs.inx(rp);
    }
    idle_then_done(local, 2)
}

pub(super) fn k_dcx(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        let rp = decode::rp(cpu.regs.ir);
        cpu.regs.dcx(rp);
    }
    idle_then_done(local, 2)
}

pub(super) fn k_dad(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        let rp = decode::rp(cpu.regs.ir);
        cpu.regs.dad(rp);
    }
    idle_then_done(local, 7)
}

pub(super) fn k_daa(cpu: &mut Cpu, local: u16) -> StepOutcome {
    if local == 0 {
        cpu.regs.daa();
    }
    idle_then_done(local, 1)
}
