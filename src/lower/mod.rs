/*!
lower: 6502 instruction -> IR (§4.E, §4.F).

Overview
========
Each decoded instruction becomes a `ConvertedInstruction`: the originating
address/mnemonic paired with the ordered `ir::Instruction`s that
reproduce its architectural effect. Lowering is purely a translation -
it never touches a `Hal` or a `Bus`; the values it emits describe
*where* an operand lives, and `codegen` is what turns that description
into a closure that actually reads or writes it.

Family breakdown mirrors the teacher's `cpu::dispatch` split
(`arithmetic`, `branches`, `compare`, `control_flow`, `load_store`,
`logical`, `misc`, plus a `shifts`/`incdec` split standing in for the
teacher's `rmw`): each submodule owns one `handle` function tried in
turn, and the first one whose mnemonic matches wins (§4.F "first
matching rule"). Family handlers never emit their own `Label` - that's
`lower_instruction`'s job, applied uniformly after a family (or a
customizer emitter) produces the rest of the instruction's IR, so every
instruction's IR always starts with a `Label` naming its own address
(§3 contract (a)). A `Customizer::mutate_instructions` implementation
that reorders an instruction's IR is responsible for keeping that
`Label` first (§4.I contract (c)).

Call/return linkage (§4.F, §4.G, §9)
=====================================
`JSR` lowers to a lone `CallFunction`; `RTS` lowers to a lone `Return`.
Neither touches the 6502 stack: `CallFunction`'s host semantics are a
nested dispatch into the compiled callee, and `Return` is simply the
artifact's closure returning - the host-language call/return supplies
the linkage a real 6502 gets from pushing/popping PC. This means the
guest-visible stack is untouched by JSR/RTS pairs entirely, which is a
deliberate divergence from hardware (no return address ever appears at
`0x0100+SP`): code that calls and returns normally can't observe it;
code that inspects its own return address on the stack would, and the
spec scopes that out (§1 Non-goals exclude cycle/timing-level
fidelity).

`BRK`/`RTI` push/pop only the status byte, for the same reason: the
resume point after the handler completes is, again, handled by host
recursion through `InvokeSoftwareInterrupt`, not a pushed address.
*/

mod addressing;
mod arithmetic;
mod branches;
mod compare;
mod control_flow;
mod flagops;
mod flags;
mod incdec;
mod load_store;
mod logical;
mod misc;
mod shifts;
mod stack;
mod transfers;

use crate::customize::Customizer;
use crate::disasm::DecodedInstruction;
use crate::error::{CoreError, Result};
use crate::ir::{label_name, ConvertedInstruction, Instruction};
use crate::partition::Function;

/// Lower every instruction of a partitioned function, in address order.
pub fn lower_function(
    function: &Function,
    customizer: Option<&dyn Customizer>,
) -> Result<Vec<ConvertedInstruction>> {
    function
        .instructions
        .iter()
        .map(|instr| lower_instruction(instr, function, customizer))
        .collect()
}

/// Lower a single decoded instruction to its IR form (§4.F, §4.I).
///
/// `owner` is the function this instruction belongs to; it's consulted
/// only by `control_flow` to decide whether an absolute `JMP` stays
/// inside the function (a label jump) or leaves it (a tail call).
pub fn lower_instruction(
    instr: &DecodedInstruction,
    owner: &Function,
    customizer: Option<&dyn Customizer>,
) -> Result<ConvertedInstruction> {
    let mut ir = if let Some(emitter) = customizer.and_then(|c| c.custom_ir_emitters().get(instr.mnemonic)) {
        emitter(instr)
    } else {
        try_families(instr, owner)?
    };
    // Every instruction's address is a potential branch target, so it
    // gets exactly one `Label` marking it, unconditionally, as the first
    // IR item (§3 contract (a), §4.G label-collection pass). `codegen`
    // consumes this to assign the host-side jump target; it never
    // invents a label itself.
    ir.insert(0, Instruction::Label(label_name(instr.address)));

    let mut converted = ConvertedInstruction {
        address: instr.address,
        mnemonic: instr.mnemonic,
        ir,
    };
    if let Some(customizer) = customizer {
        customizer.mutate_instructions(&mut converted);
    }
    Ok(converted)
}

fn try_families(instr: &DecodedInstruction, owner: &Function) -> Result<Vec<Instruction>> {
    if let Some(ir) = load_store::handle(instr)? {
        return Ok(ir);
    }
    if let Some(ir) = logical::handle(instr)? {
        return Ok(ir);
    }
    if let Some(ir) = arithmetic::handle(instr)? {
        return Ok(ir);
    }
    if let Some(ir) = compare::handle(instr)? {
        return Ok(ir);
    }
    if let Some(ir) = incdec::handle(instr)? {
        return Ok(ir);
    }
    if let Some(ir) = shifts::handle(instr)? {
        return Ok(ir);
    }
    if let Some(ir) = transfers::handle(instr) {
        return Ok(ir);
    }
    if let Some(ir) = stack::handle(instr) {
        return Ok(ir);
    }
    if let Some(ir) = flagops::handle(instr) {
        return Ok(ir);
    }
    if let Some(ir) = branches::handle(instr) {
        return Ok(ir);
    }
    if let Some(ir) = control_flow::handle(instr, owner) {
        return Ok(ir);
    }
    if let Some(ir) = misc::handle(instr) {
        return Ok(ir);
    }
    Err(CoreError::UnsupportedInstruction {
        mnemonic: instr.mnemonic,
        mode: instr.mode,
        address: instr.address,
    })
}
