/*!
cpu: Processor State / HAL (§4.B).

The legacy stepping-interpreter layout this module used to host (separate
`regs`/`execute`/`addressing`/`table`/`dispatch` files implementing a
match-based fetch-decode-execute loop) has been superseded: this crate
executes 6502 code by compiling it to host closures (see `lower`,
`codegen`, `jit`) rather than interpreting it opcode-by-opcode. Only the
architectural state those closures operate on - `Hal` - lives here now.
*/

mod state;

pub use state::{Hal, InterruptPoll, Register, SoftwareInterruptHook};
pub use state::{BREAK, CARRY, DECIMAL, IRQ_DISABLE, NEGATIVE, OVERFLOW, UNUSED, ZERO};
