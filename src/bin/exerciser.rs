/*!
exerciser - a CP/M-style collaborator for `i8080::Cpu`.

Loads a flat `.COM` image at `0x0100`, wires the two best-known CP/M BDOS
print functions through a trapped `OUT` at address `0x0005`, and runs the
core to completion by pattern-matching `cpu.status()` against the ten
status words every tick.

    exerciser [--debug|-v] <path-to-com-file> [expected-cycles]

`expected-cycles`, if given, is compared against the observed tick count at
the end of the run and the signed difference is printed; a mismatch is
reported, not treated as a fatal error (see SPEC_FULL.md §6A).
*/

use std::env;
use std::fs;
use std::io;
use std::process::ExitCode;

use i8080::Cpu;
use i8080::cpu::pins::status;

const MEM_SIZE: usize = 0x1_0000;
const LOAD_ADDR: u16 = 0x0100;

fn main() -> ExitCode {
    let mut debug = false;
    let mut path = None;
    let mut expected_cycles = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--debug" | "-v" => debug = true,
            other if path.is_none() => path = Some(other.to_string()),
            other => match other.parse::<u64>() {
                Ok(n) => expected_cycles = Some(n),
                Err(_) => {
                    eprintln!("exerciser: not a valid cycle count: {other}");
                    return ExitCode::FAILURE;
                }
            },
        }
    }

    let Some(path) = path else {
        eprintln!("usage: exerciser [--debug|-v] <path-to-com-file> [expected-cycles]");
        return ExitCode::FAILURE;
    };

    match run(&path, debug, expected_cycles) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("exerciser: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str, debug: bool, expected_cycles: Option<u64>) -> io::Result<()> {
    let image = fs::read(path)?;
    if image.len() > MEM_SIZE - LOAD_ADDR as usize {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "image too large for a 64 KiB address space"));
    }

    let mut mem = [0u8; MEM_SIZE];
    mem[LOAD_ADDR as usize..LOAD_ADDR as usize + image.len()].copy_from_slice(&image);

    // The termination sentinel: OUT 0,A. Port 0 is never used by real BDOS
    // calls, so any write there ends the run.
    mem[0x0000] = 0xD3; // OUT d8
    mem[0x0001] = 0x00;

    // The BDOS print shim: OUT 1,A ; RET. Port 1 carries the function
    // number in C at call time (read directly off `cpu` below); the shim
    // itself is just a trap that returns control immediately afterward.
    mem[0x0005] = 0xD3; // OUT d8
    mem[0x0006] = 0x01;
    mem[0x0007] = 0xC9; // RET

    let mut cpu = Cpu::new();
    cpu.set_ready(true);

    // There is no public "set PC" entry point — the bus protocol is the
    // only sanctioned way to change core state — so the loader bootstraps
    // into the program the way a real CP/M BIOS does: a one-shot `JMP
    // 0x0100` sits at address 0 until the core has fetched it, then the
    // loader patches the permanent OUT-0 termination sentinel back in so a
    // later `JMP 0`/`RET` to address 0 is caught instead of looping.
    mem[0x0000] = 0xC3; // JMP $0100
    mem[0x0001] = 0x00;
    mem[0x0002] = 0x01;

    let mut ticks: u64 = 0;
    let mut instructions: u64 = 0;
    let mut sentinel_armed = false;
    let mut prev_sync = cpu.sync();

    loop {
        cpu.tick();
        ticks += 1;

        // The status word is already on the data port the instant SYNC
        // rises (T1), ahead of any bus transfer and ahead of PC's own
        // increment (T2) — so a new opcode fetch is recognized here,
        // before it has touched any visible state.
        if !prev_sync && cpu.sync() && cpu.data() == status::FETCH {
            instructions += 1;
            if debug {
                trace(&cpu, &mem);
            }
        }
        prev_sync = cpu.sync();

        if cpu.dbin() {
            let addr = cpu.address();
            cpu.set_data(mem[addr as usize]);
        } else if cpu.wr() {
            let addr = cpu.address();
            let status_word = cpu.status();
            mem[addr as usize] = cpu.data();

            if status_word == status::OUTPUT_WRITE && addr & 0xFF == 1 {
                bdos_print(&cpu, &mem);
            } else if status_word == status::OUTPUT_WRITE && addr & 0xFF == 0 {
                break;
            }
        }

        if !sentinel_armed && cpu.pc() >= LOAD_ADDR {
            mem[0x0000] = 0xD3; // OUT 0,A
            mem[0x0001] = 0x00;
            sentinel_armed = true;
        }

        if cpu.halted() {
            break;
        }

        if ticks > 500_000_000 {
            eprintln!("exerciser: tick budget exceeded, aborting");
            break;
        }
    }

    println!("{instructions} instructions, {ticks} cycles");
    if let Some(expected) = expected_cycles {
        let diff = ticks as i64 - expected as i64;
        if diff == 0 {
            println!("cycle count matches expected {expected}");
        } else {
            println!("cycle count mismatch: expected {expected}, got {ticks} (diff {diff:+})");
        }
    }
    Ok(())
}

/// Emulates CP/M BDOS functions 2, 5, and 9 against the register state the
/// trapped `OUT 1,A` call left behind. Function number arrives in C.
fn bdos_print(cpu: &Cpu, mem: &[u8; MEM_SIZE]) {
    match cpu.get_reg(1) {
        // C (register code 1)
        2 | 5 => {
            let ch = cpu.get_reg(3) as char; // E
            print!("{ch}");
        }
        9 => {
            let mut addr = cpu.get_pair(1); // DE
            loop {
                let b = mem[addr as usize];
                if b == b'$' {
                    break;
                }
                print!("{}", b as char);
                addr = addr.wrapping_add(1);
            }
        }
        _ => {}
    }
}

fn trace(cpu: &Cpu, mem: &[u8; MEM_SIZE]) {
    let pc = cpu.pc();
    let opcode = mem[pc as usize];
    let mnemonic = disasm::MNEMONICS[opcode as usize];
    eprintln!(
        "{:04X}: {:02X} {:<10} a={:02X} bc={:04X} de={:04X} hl={:04X} sp={:04X} f={:02X}",
        pc,
        opcode,
        mnemonic,
        cpu.a(),
        cpu.get_pair(0),
        cpu.get_pair(1),
        cpu.get_pair(2),
        cpu.sp(),
        cpu.f(),
    );
}

/// The flat opcode-indexed mnemonic table, ported from the original
/// reference exerciser's own disassembly table. `#` marks an 8-bit
/// immediate operand, `$` a 16-bit address operand, `p` a port number;
/// this harness does not append the operand bytes to the trace line, only
/// the mnemonic and the raw register file.
mod disasm {
    #[rustfmt::skip]
    pub static MNEMONICS: [&str; 256] = [
        "nop", "lxi b,#", "stax b", "inx b", "inr b", "dcr b", "mvi b,#", "rlc", "ill", "dad b", "ldax b", "dcx b", "inr c", "dcr c", "mvi c,#", "rrc",
        "ill", "lxi d,#", "stax d", "inx d", "inr d", "dcr d", "mvi d,#", "ral", "ill", "dad d", "ldax d", "dcx d", "inr e", "dcr e", "mvi e,#", "rar",
        "ill", "lxi h,#", "shld", "inx h", "inr h", "dcr h", "mvi h,#", "daa", "ill", "dad h", "lhld", "dcx h", "inr l", "dcr l", "mvi l,#", "cma",
        "ill", "lxi sp,#", "sta $", "inx sp", "inr M", "dcr M", "mvi M,#", "stc", "ill", "dad sp", "lda $", "dcx sp", "inr a", "dcr a", "mvi a,#", "cmc",
        "mov b,b", "mov b,c", "mov b,d", "mov b,e", "mov b,h", "mov b,l", "mov b,M", "mov b,a", "mov c,b", "mov c,c", "mov c,d", "mov c,e", "mov c,h", "mov c,l", "mov c,M", "mov c,a",
        "mov d,b", "mov d,c", "mov d,d", "mov d,e", "mov d,h", "mov d,l", "mov d,M", "mov d,a", "mov e,b", "mov e,c", "mov e,d", "mov e,e", "mov e,h", "mov e,l", "mov e,M", "mov e,a",
        "mov h,b", "mov h,c", "mov h,d", "mov h,e", "mov h,h", "mov h,l", "mov h,M", "mov h,a", "mov l,b", "mov l,c", "mov l,d", "mov l,e", "mov l,h", "mov l,l", "mov l,M", "mov l,a",
        "mov M,b", "mov M,c", "mov M,d", "mov M,e", "mov M,h", "mov M,l", "hlt", "mov M,a", "mov a,b", "mov a,c", "mov a,d", "mov a,e", "mov a,h", "mov a,l", "mov a,M", "mov a,a",
        "add b", "add c", "add d", "add e", "add h", "add l", "add M", "add a", "adc b", "adc c", "adc d", "adc e", "adc h", "adc l", "adc M", "adc a",
        "sub b", "sub c", "sub d", "sub e", "sub h", "sub l", "sub M", "sub a", "sbb b", "sbb c", "sbb d", "sbb e", "sbb h", "sbb l", "sbb M", "sbb a",
        "ana b", "ana c", "ana d", "ana e", "ana h", "ana l", "ana M", "ana a", "xra b", "xra c", "xra d", "xra e", "xra h", "xra l", "xra M", "xra a",
        "ora b", "ora c", "ora d", "ora e", "ora h", "ora l", "ora M", "ora a", "cmp b", "cmp c", "cmp d", "cmp e", "cmp h", "cmp l", "cmp M", "cmp a",
        "rnz", "pop b", "jnz $", "jmp $", "cnz $", "push b", "adi #", "rst 0", "rz", "ret", "jz $", "ill", "cz $", "call $", "aci #", "rst 1",
        "rnc", "pop d", "jnc $", "out p", "cnc $", "push d", "sui #", "rst 2", "rc", "ill", "jc $", "in p", "cc $", "ill", "sbi #", "rst 3",
        "rpo", "pop h", "jpo $", "xthl", "cpo $", "push h", "ani #", "rst 4", "rpe", "pchl", "jpe $", "xchg", "cpe $", "ill", "xri #", "rst 5",
        "rp", "pop psw", "jp $", "di", "cp $", "push psw", "ori #", "rst 6", "rm", "sphl", "jm $", "ei", "cm $", "ill", "cpi #", "rst 7",
    ];
}
