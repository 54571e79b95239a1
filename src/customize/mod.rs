/*!
customize: host hooks into lowering and code generation (§4.I).

Overview
========
A `Customizer` lets a host reach into the pipeline at two points without
forking it:

- `custom_ir_emitters`: a mnemonic -> emitter map consulted *before* the
  built-in family handlers in `lower` (§4.F "first matching rule" now
  starts with the customizer). Use this to change what an instruction
  means - e.g. treat an otherwise-ordinary `STA` to a specific address as
  a host-defined side-effecting operation instead of a plain store.
- `mutate_instructions`: called once per already-lowered
  `ConvertedInstruction`, in address order, so a host can wrap or extend
  the default IR (e.g. insert a `StoreDebugString` trace point) without
  losing track of which 6502 instruction it came from - the pairing
  `ConvertedInstruction` preserves is exactly what keeps this safe to do
  after the fact (§3 "ConvertedInstruction"). Every `ir` list handed to
  `mutate_instructions` starts with the `Instruction::Label` naming that
  instruction's own address; an implementation that reorders the list is
  responsible for keeping that `Label` as the first item (§4.I contract
  (c)) since `codegen`'s label-collection pass expects it there.

No example in the pack implements anything like this - it's new
vocabulary this crate needs that none of the teacher's opcode-stepping
design had a reason to. It's still expressed as a plain trait object
(`Box<dyn Customizer>` at the call site), the same shape the teacher
uses for `Device` and the bus observer.
*/

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::disasm::DecodedInstruction;
use crate::ir::{ConvertedInstruction, Instruction};

/// A lowering rule override: given the decoded instruction, produce its
/// IR directly, bypassing the built-in family handlers.
pub type IrEmitter = fn(&DecodedInstruction) -> Vec<Instruction>;

fn empty_emitter_map() -> &'static HashMap<&'static str, IrEmitter> {
    static EMPTY: OnceLock<HashMap<&'static str, IrEmitter>> = OnceLock::new();
    EMPTY.get_or_init(HashMap::new)
}

/// Host hook consulted during lowering and after codegen-visible
/// lowering completes (§4.I).
pub trait Customizer {
    /// Mnemonic -> emitter overrides, checked first during lowering.
    /// Default: no overrides.
    fn custom_ir_emitters(&self) -> &HashMap<&'static str, IrEmitter> {
        empty_emitter_map()
    }

    /// Rewrite a single already-lowered instruction in place. Default:
    /// no-op.
    fn mutate_instructions(&self, _instr: &mut ConvertedInstruction) {}
}
