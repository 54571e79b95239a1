//! AND/ORA/EOR/BIT (§4.F).

use crate::disasm::DecodedInstruction;
use crate::error::Result;
use crate::ir::{BinaryOp, Flag, Instruction, Reg, Value};

use super::addressing::operand_value;
use super::flags::zero_negative;

pub(super) fn handle(instr: &DecodedInstruction) -> Result<Option<Vec<Instruction>>> {
    let op = match instr.mnemonic {
        "AND" => Some(BinaryOp::And),
        "ORA" => Some(BinaryOp::Or),
        "EOR" => Some(BinaryOp::Xor),
        _ => None,
    };
    if let Some(op) = op {
        let operand = operand_value(instr)?;
        let a = Value::Register(Reg::A);
        let mut ir = vec![Instruction::Binary {
            op,
            left: a.clone(),
            right: operand,
            dst: a.clone(),
        }];
        ir.extend(zero_negative(a, Value::Variable(0)));
        return Ok(Some(ir));
    }

    if instr.mnemonic == "BIT" {
        let operand = operand_value(instr)?;
        let a = Value::Register(Reg::A);
        let scratch = Value::Variable(0);
        let ir = vec![
            // Zero = (A & M) == 0
            Instruction::Binary {
                op: BinaryOp::And,
                left: a,
                right: operand.clone(),
                dst: scratch.clone(),
            },
            Instruction::Binary {
                op: BinaryOp::Equals,
                left: scratch,
                right: Value::Constant(0),
                dst: Value::Flag(Flag::Zero),
            },
            // Negative/Overflow come straight from the memory operand's
            // bits 7 and 6, not from A.
            Instruction::Binary {
                op: BinaryOp::And,
                left: operand.clone(),
                right: Value::Constant(0x80),
                dst: Value::Variable(1),
            },
            Instruction::Binary {
                op: BinaryOp::NotEquals,
                left: Value::Variable(1),
                right: Value::Constant(0),
                dst: Value::Flag(Flag::Negative),
            },
            Instruction::Binary {
                op: BinaryOp::And,
                left: operand,
                right: Value::Constant(0x40),
                dst: Value::Variable(1),
            },
            Instruction::Binary {
                op: BinaryOp::NotEquals,
                left: Value::Variable(1),
                right: Value::Constant(0),
                dst: Value::Flag(Flag::Overflow),
            },
        ];
        return Ok(Some(ir));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disasm::AddressingMode;

    #[test]
    fn and_immediate_lowers_to_binary_and_flags() {
        let i = DecodedInstruction {
            address: 0,
            opcode: 0x29,
            mnemonic: "AND",
            mode: AddressingMode::Immediate,
            bytes: vec![0x29, 0x0F],
            target: None,
        };
        let ir = handle(&i).unwrap().unwrap();
        assert!(matches!(
            ir[0],
            Instruction::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn bit_does_not_touch_accumulator() {
        let i = DecodedInstruction {
            address: 0,
            opcode: 0x24,
            mnemonic: "BIT",
            mode: AddressingMode::ZeroPage,
            bytes: vec![0x24, 0x10],
            target: None,
        };
        let ir = handle(&i).unwrap().unwrap();
        assert!(ir
            .iter()
            .all(|node| !matches!(node, Instruction::Copy { dst: Value::Register(Reg::A), .. })));
    }
}
