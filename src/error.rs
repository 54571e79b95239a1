/*!
error.rs - Core error type for the decompile-and-JIT pipeline.

Overview
========
Every fallible operation in this crate - addressing, lowering, code
generation, dispatch - returns `Result<T, CoreError>`. There is a single
flat enum rather than one error type per component: the pipeline stages
are tightly coupled (a lowering failure and a dispatch failure are both
"this compile cannot proceed") and callers generally just want to know
which of the documented failure kinds occurred (see spec §7).

Non-goals
=========
No `From` conversions from foreign error types are provided: nothing in
this crate talks to the filesystem, network, or a parser that would
produce its own error type to wrap.
*/

use thiserror::Error;

use crate::disasm::AddressingMode;

/// Fatal error raised by the decompile-and-JIT pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A mnemonic or addressing mode has no lowering rule.
    #[error("unsupported instruction: {mnemonic} ({mode:?}) at {address:#06x}")]
    UnsupportedInstruction {
        mnemonic: &'static str,
        mode: AddressingMode,
        address: u16,
    },

    /// A branch or jump IR node references a label with no matching `Label`.
    #[error("unresolved branch target: {0}")]
    UnresolvedBranch(String),

    /// The dispatcher was asked to run an address with no known function.
    #[error("no function known at entry address {0:#06x}")]
    UnknownFunction(u16),

    /// A stack pop underflowed past 0xFF.
    #[error("stack underflow")]
    StackUnderflow,

    /// A stack push overflowed past 0x00.
    #[error("stack overflow")]
    StackOverflow,

    /// Bus device attachment was malformed (e.g. overlapping address ranges).
    #[error("bus configuration error: {0}")]
    ConfigurationError(String),

    /// The cancellation token was tripped while compiled code was running.
    #[error("execution cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, CoreError>;
