//! JMP/JSR/RTS/RTI/BRK (§4.F). Grounded on the teacher's
//! `cpu::dispatch::control_flow`; the indirect-JMP page-wrap quirk it
//! preserves is kept here too (§9 Open Question, resolved: preserved).
//!
//! See the module doc on `lower` for the JSR/RTS-vs-BRK/RTI stack
//! convention this lowering relies on.

use crate::disasm::{AddressingMode, DecodedInstruction};
use crate::ir::{Instruction, TargetAddress, Value};
use crate::partition::Function;

pub(super) fn handle(instr: &DecodedInstruction, owner: &Function) -> Option<Vec<Instruction>> {
    match instr.mnemonic {
        "JSR" => {
            let target = instr.target?;
            Some(vec![Instruction::CallFunction(TargetAddress {
                address: target,
                is_indirect: false,
            })])
        }
        "RTS" => Some(vec![Instruction::Return]),
        "RTI" => Some(vec![
            Instruction::PopStackValue(Value::AllFlags),
            Instruction::Return,
        ]),
        "BRK" => Some(vec![Instruction::InvokeSoftwareInterrupt]),
        "JMP" if instr.mode == AddressingMode::Absolute => {
            let target = instr.target?;
            if owner.contains(target) {
                Some(vec![Instruction::Jump(crate::ir::label_name(target))])
            } else {
                // Target belongs to another function: a tail call.
                Some(vec![
                    Instruction::CallFunction(TargetAddress {
                        address: target,
                        is_indirect: false,
                    }),
                    Instruction::Return,
                ])
            }
        }
        "JMP" => {
            // Indirect: the pointer address itself is "address"; codegen
            // dereferences it (with the page-wrap quirk) at call time.
            let pointer = u16::from_le_bytes([instr.bytes[1], instr.bytes[2]]);
            Some(vec![
                Instruction::CallFunction(TargetAddress {
                    address: pointer,
                    is_indirect: true,
                }),
                Instruction::Return,
            ])
        }
        _ => None,
    }
}
