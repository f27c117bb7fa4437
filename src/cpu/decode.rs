/*!
decode.rs - The two-level instruction decode table (spec §4.4) plus the
instruction-field decoders (dst/src/rp/nnn/ccc).

`OPCODE_TO_KERNEL` maps every opcode byte to a dense **kernel id** (0..71);
opcodes that differ only in register selector or condition share a kernel.
`KERNEL_BASE` records each kernel's starting step number purely for
bookkeeping and the invariant tests in `tests/`; the actual dispatch target
is the function table in `cpu::dispatch` (see that module's doc comment for
why a function-pointer table replaces a single flat match over the global
step number).

The kernel ids below and their grouping are taken directly from the
original reference implementation's `mnemonic`/`opcode` tables (a 72-entry
kernel list and a 256-entry opcode-to-kernel map), which is the authoritative
source for how real silicon groups opcodes into shared micro-sequences.
*/

#![allow(dead_code)]

/// Kernel ids, in the order the reference source enumerates them. Kept as
/// plain constants (rather than an enum) because they are used purely as
/// array indices into `KERNEL_BASE` / `dispatch::KERNEL_FNS`.
pub mod kernel {
    pub const MOV_R_R: u8 = 0;
    pub const MOV_R_M: u8 = 1;
    pub const MOV_M_R: u8 = 2;
    pub const SPHL: u8 = 3;
    pub const MVI_R: u8 = 4;
    pub const MVI_M: u8 = 5;
    pub const LXI: u8 = 6;
    pub const LDA: u8 = 7;
    pub const STA: u8 = 8;
    pub const LHLD: u8 = 9;
    pub const SHLD: u8 = 10;
    pub const LDAX: u8 = 11;
    pub const STAX: u8 = 12;
    pub const XCHG: u8 = 13;
    pub const ADD_R: u8 = 14;
    pub const ADD_M: u8 = 15;
    pub const ADI: u8 = 16;
    pub const ADC_R: u8 = 17;
    pub const ADC_M: u8 = 18;
    pub const ACI: u8 = 19;
    pub const SUB_R: u8 = 20;
    pub const SUB_M: u8 = 21;
    pub const SUI: u8 = 22;
    pub const SBB_R: u8 = 23;
    pub const SBB_M: u8 = 24;
    pub const SBI: u8 = 25;
    pub const INR_R: u8 = 26;
    pub const INR_M: u8 = 27;
    pub const DCR_R: u8 = 28;
    pub const DCR_M: u8 = 29;
    pub const INX: u8 = 30;
    pub const DCX: u8 = 31;
    pub const DAD: u8 = 32;
    pub const DAA: u8 = 33;
    pub const ANA_R: u8 = 34;
    pub const ANA_M: u8 = 35;
    pub const ANI: u8 = 36;
    pub const XRA_R: u8 = 37;
    pub const XRA_M: u8 = 38;
    pub const XRI: u8 = 39;
    pub const ORA_R: u8 = 40;
    pub const ORA_M: u8 = 41;
    pub const ORI: u8 = 42;
    pub const CMP_R: u8 = 43;
    pub const CMP_M: u8 = 44;
    pub const CPI: u8 = 45;
    pub const RLC: u8 = 46;
    pub const RRC: u8 = 47;
    pub const RAL: u8 = 48;
    pub const RAR: u8 = 49;
    pub const CMA: u8 = 50;
    pub const CMC: u8 = 51;
    pub const STC: u8 = 52;
    pub const JMP: u8 = 53;
    pub const JCOND: u8 = 54;
    pub const CALL: u8 = 55;
    pub const CCOND: u8 = 56;
    pub const RET: u8 = 57;
    pub const RCOND: u8 = 58;
    pub const RST: u8 = 59;
    pub const PCHL: u8 = 60;
    pub const PUSH: u8 = 61;
    pub const PUSH_PSW: u8 = 62;
    pub const POP: u8 = 63;
    pub const POP_PSW: u8 = 64;
    pub const XTHL: u8 = 65;
    pub const IN: u8 = 66;
    pub const OUT: u8 = 67;
    pub const EI: u8 = 68;
    pub const DI: u8 = 69;
    pub const HLT: u8 = 70;
    pub const NOP: u8 = 71;

    pub const COUNT: usize = 72;
}

/// Opcode (0x00-0xFF) -> kernel id. Sixteen opcodes per row to match the
/// conventional 8080 opcode-map layout (row = high nibble).
#[rustfmt::skip]
pub static OPCODE_TO_KERNEL: [u8; 256] = [
    71, 6, 12, 30, 26, 28, 4, 46, 71, 32, 11, 31, 26, 28, 4, 47,
    71, 6, 12, 30, 26, 28, 4, 48, 71, 32, 11, 31, 26, 28, 4, 49,
    71, 6, 10, 30, 26, 28, 4, 33, 71, 32, 9, 31, 26, 28, 4, 50,
    71, 6, 8, 30, 27, 29, 5, 52, 71, 32, 7, 31, 26, 28, 4, 51,
    0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0,
    0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0,
    0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0,
    2, 2, 2, 2, 2, 2, 70, 2, 0, 0, 0, 0, 0, 0, 1, 0,
    14, 14, 14, 14, 14, 14, 15, 14, 17, 17, 17, 17, 17, 17, 18, 17,
    20, 20, 20, 20, 20, 20, 21, 20, 23, 23, 23, 23, 23, 23, 24, 23,
    34, 34, 34, 34, 34, 34, 35, 34, 37, 37, 37, 37, 37, 37, 38, 37,
    40, 40, 40, 40, 40, 40, 41, 40, 43, 43, 43, 43, 43, 43, 44, 43,
    58, 63, 54, 53, 56, 61, 16, 59, 58, 57, 54, 53, 56, 55, 19, 59,
    58, 63, 54, 67, 56, 61, 22, 59, 58, 57, 54, 66, 56, 55, 25, 59,
    58, 63, 54, 65, 56, 61, 36, 59, 58, 60, 54, 13, 56, 55, 39, 59,
    58, 64, 54, 69, 56, 62, 42, 59, 58, 3, 54, 68, 56, 55, 45, 59,
];

/// Each kernel's starting step number (kernels begin immediately after
/// fetch's three states, steps 0-2). Sizes below are each kernel's real
/// published T-state total minus the 3-state fetch modeled here (spec §1's
/// accepted "compatible cycle-count adjustment"), so every kernel carries
/// whatever compensating idle states it needs to land on that total,
/// including the handful (`CALL`/`CCOND`/`RST`/`PUSH`/`PUSH_PSW`/`XTHL`)
/// whose real machine cycles cost more than a naive 3-states-per-cycle
/// count would predict. `CCOND`/`RCOND` use their taken-branch (longer)
/// total here; the untaken path returns `Done` earlier, at its own shorter
/// published total, from inside the kernel function itself.
#[rustfmt::skip]
pub static KERNEL_BASE: [u16; kernel::COUNT] = [
    3,   5,   9,   13,  15,  19,  26,  33,  43,  53,
    66,  79,  83,  87,  88,  89,  93,  97,  98,  102,
    106, 107, 111, 115, 116, 120, 124, 126, 133, 135,
    142, 144, 146, 153, 154, 155, 159, 163, 164, 168,
    172, 173, 177, 181, 182, 186, 190, 191, 192, 193,
    194, 195, 196, 197, 204, 211, 225, 239, 246, 254,
    262, 264, 272, 280, 287, 294, 309, 316, 323, 324,
    325, 329,
];

/// Destination register field, bits 5:3 of the opcode.
#[inline]
pub fn dst(ir: u8) -> u8 {
    (ir >> 3) & 0b111
}

/// Source register field, bits 2:0 of the opcode.
#[inline]
pub fn src(ir: u8) -> u8 {
    ir & 0b111
}

/// Register-pair field, bits 5:4 of the opcode.
#[inline]
pub fn rp(ir: u8) -> u8 {
    (ir >> 4) & 0b11
}

/// RST restart number, bits 5:3 of the opcode (same position as `dst`).
#[inline]
pub fn nnn(ir: u8) -> u8 {
    (ir >> 3) & 0b111
}

/// Condition-code field, bits 5:3 of the opcode (same position as `dst`).
#[inline]
pub fn ccc(ir: u8) -> u8 {
    (ir >> 3) & 0b111
}

/// Evaluates the condition named by a `ccc` field against the current
/// flags: 0=NZ, 1=Z, 2=NC, 3=C, 4=PO, 5=PE, 6=P (sign clear), 7=M (sign
/// set).
pub fn eval_condition(ccc: u8, regs: &super::regs::Registers) -> bool {
    match ccc & 0b111 {
        0 => !regs.zero(),
        1 => regs.zero(),
        2 => !regs.carry(),
        3 => regs.carry(),
        4 => !regs.parity(),
        5 => regs.parity(),
        6 => !regs.sign(),
        _ => regs.sign(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::regs::Registers;

    #[test]
    fn field_decode_matches_known_opcodes() {
        // MOV B,C = 0x41 -> dst=B(0), src=C(1)
        assert_eq!(dst(0x41), 0);
        assert_eq!(src(0x41), 1);
        // LXI D,data = 0x11 -> rp=DE(1)
        assert_eq!(rp(0x11), 1);
        // RST 3 = 0xDF -> nnn=3
        assert_eq!(nnn(0xDF), 3);
        // JNZ = 0xC2 -> ccc=NZ(0)
        assert_eq!(ccc(0xC2), 0);
    }

    #[test]
    fn opcode_table_matches_known_mnemonics() {
        assert_eq!(OPCODE_TO_KERNEL[0x00], kernel::NOP);
        assert_eq!(OPCODE_TO_KERNEL[0x76], kernel::HLT);
        assert_eq!(OPCODE_TO_KERNEL[0x80], kernel::ADD_R);
        assert_eq!(OPCODE_TO_KERNEL[0xC3], kernel::JMP);
        assert_eq!(OPCODE_TO_KERNEL[0xCD], kernel::CALL);
        assert_eq!(OPCODE_TO_KERNEL[0xC9], kernel::RET);
        assert_eq!(OPCODE_TO_KERNEL[0xE3], kernel::XTHL);
        assert_eq!(OPCODE_TO_KERNEL[0xF9], kernel::SPHL);
        assert_eq!(OPCODE_TO_KERNEL[0x22], kernel::SHLD);
        assert_eq!(OPCODE_TO_KERNEL[0x2A], kernel::LHLD);
    }

    #[test]
    fn kernel_base_is_strictly_increasing_past_fetch() {
        let mut prev = 2u16;
        for &base in KERNEL_BASE.iter() {
            assert!(base > prev, "kernel starts must not overlap");
            prev = base;
        }
    }

    #[test]
    fn condition_codes_match_flag_polarity() {
        let mut r = Registers::default();
        r.set_zero(true);
        assert!(eval_condition(1, &r)); // Z
        assert!(!eval_condition(0, &r)); // NZ
        r.set_carry(true);
        assert!(eval_condition(3, &r)); // C
        assert!(!eval_condition(2, &r)); // NC
    }
}
