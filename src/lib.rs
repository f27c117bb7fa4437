/*!
A cycle-stepped, pin-accurate emulation of the Intel 8080 microprocessor.

`Cpu::tick()` advances the core by exactly one T-state and exposes the same
address bus, data port, and control/status lines the real part exposes on
its forty pins. Memory and I/O devices are not modeled here: a collaborator
drives `set_data`/`set_ready`/`set_int` and reads `address`/`data`/`sync`/
`dbin`/`wr`/`status` between ticks, the same way a backplane would.

See [`cpu::dispatch`] for the fetch/execute state machine and
[`cpu::decode`] for the opcode-to-kernel table that drives it.
*/

pub mod cpu;

pub use cpu::Cpu;
