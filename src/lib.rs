#![doc = r#"
MOS 6502 decompile-and-JIT pipeline.

This crate turns a flat 6502 memory image into native-closure "compiled
methods" on demand: disassemble from a set of entry points, partition the
result into functions, lower each function's instructions to a small
IR, then generate a host closure per function that a `jit::Dispatcher`
caches and calls by address (§2 Overview).

Modules:
- error: shared `CoreError`/`Result`
- bus: 16-bit address-space multiplexer and attachable devices
- cpu: register/flag/stack HAL the generated closures run against
- disasm: decoder from bytes to `DecodedInstruction`
- partition: groups decoded instructions into `Function`s by call topology
- lower: `DecodedInstruction` -> IR translation, one family module per
  instruction group
- ir: the IR vocabulary shared by `lower` and `codegen`
- codegen: IR -> `CompiledArtifact` (a cached, callable closure)
- jit: `JitCache` and `Dispatcher`, the runtime entry point
- customize: host hooks into lowering and code generation

`test_utils` provides a minimal in-memory program/bus builder used by
this crate's own tests and by the conformance suite under `tests/`.
"#]

pub mod bus;
pub mod codegen;
pub mod cpu;
pub mod customize;
pub mod disasm;
pub mod error;
pub mod ir;
pub mod jit;
pub mod lower;
pub mod partition;

pub use bus::Bus;
pub use cpu::Hal;
pub use error::{CoreError, Result};
pub use jit::{Dispatcher, JitCache, JitCacheConfig};

pub mod test_utils;
