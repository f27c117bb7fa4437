//! Logical kernels: ANA/XRA/ORA/CMP family, rotates, and the single-bit
//! flag instructions CMA/CMC/STC.

use crate::cpu::Cpu;
use crate::cpu::decode;
use crate::cpu::pins::status;

use super::{StepOutcome, idle_then_done, step_read};

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

alu_r_kernel!(k_ana_r, ana);
alu_m_kernel!(k_ana_m, ana);
alu_i_kernel!(k_ani, ana);
alu_r_kernel!(k_xra_r, xra);
alu_m_kernel!(k_xra_m, xra);
alu_i_kernel!(k_xri, xra);
alu_r_kernel!(k_ora_r, ora);
alu_m_kernel!(k_ora_m, ora);
alu_i_kernel!(k_ori, ora);
alu_r_kernel!(k_cmp_r, cmp);
alu_m_kernel!(k_cmp_m, cmp);
alu_i_kernel!(k_cpi, cmp);

macro_rules! unary_a_kernel {
    ($name:ident, $op:ident) => {
        pub(super) fn $name(cpu: &mut Cpu, local: u16) -> StepOutcome {
            if local == 0 {
                cpu.regs.$op();
            }
            idle_then_done(local, 1)
        }
    };
}

unary_a_kernel!(k_rlc, rlc);
unary_a_kernel!(k_rrc, rrc);
unary_a_kernel!(k_ral, ral);
unary_a_kernel!(k_rar, rar);
unary_a_kernel!(k_cma, cma);
unary_a_kernel!(k_cmc, cmc);
unary_a_kernel!(k_stc, stc);
