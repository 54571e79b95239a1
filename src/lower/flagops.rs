//! CLC/SEC/CLI/SEI/CLD/SED/CLV (§4.F): set or clear a single flag to a
//! fixed value.

use crate::disasm::DecodedInstruction;
use crate::ir::{Flag, Instruction, Value};

pub(super) fn handle(instr: &DecodedInstruction) -> Option<Vec<Instruction>> {
    let (flag, value) = match instr.mnemonic {
        "CLC" => (Flag::Carry, false),
        "SEC" => (Flag::Carry, true),
        "CLI" => (Flag::InterruptDisable, false),
        "SEI" => (Flag::InterruptDisable, true),
        "CLD" => (Flag::Decimal, false),
        "SED" => (Flag::Decimal, true),
        "CLV" => (Flag::Overflow, false),
        _ => return None,
    };
    Some(vec![Instruction::Copy {
        src: Value::Constant(value as u16),
        dst: Value::Flag(flag),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disasm::AddressingMode;

    #[test]
    fn sec_sets_carry_to_one() {
        let i = DecodedInstruction {
            address: 0,
            opcode: 0x38,
            mnemonic: "SEC",
            mode: AddressingMode::Implied,
            bytes: vec![0x38],
            target: None,
        };
        let ir = handle(&i).unwrap();
        assert_eq!(
            ir,
            vec![Instruction::Copy {
                src: Value::Constant(1),
                dst: Value::Flag(Flag::Carry),
            }]
        );
    }
}
