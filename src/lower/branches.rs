//! BCC/BCS/BEQ/BMI/BNE/BPL/BVC/BVS (§4.F). The IR has no conditional-
//! branch node that reads a flag directly, so each becomes a
//! `JumpIfZero`/`JumpIfNotZero` over the relevant `Flag` value - taking
//! the branch falls out of whether that flag reads as 0 or nonzero.
//! Grounded on the teacher's `cpu::dispatch::branches`, which likewise
//! dispatches branch opcodes in pairs keyed by a single flag.

use crate::disasm::DecodedInstruction;
use crate::ir::{label_name, Flag, Instruction, Value};

pub(super) fn handle(instr: &DecodedInstruction) -> Option<Vec<Instruction>> {
    let target = instr.target?;
    let label = label_name(target);

    let (flag, take_when_set) = match instr.mnemonic {
        "BCC" => (Flag::Carry, false),
        "BCS" => (Flag::Carry, true),
        "BEQ" => (Flag::Zero, true),
        "BNE" => (Flag::Zero, false),
        "BMI" => (Flag::Negative, true),
        "BPL" => (Flag::Negative, false),
        "BVS" => (Flag::Overflow, true),
        "BVC" => (Flag::Overflow, false),
        _ => return None,
    };

    let cond = Value::Flag(flag);
    let node = if take_when_set {
        Instruction::JumpIfNotZero { cond, label }
    } else {
        Instruction::JumpIfZero { cond, label }
    };
    Some(vec![node])
}
