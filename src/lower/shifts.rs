//! ASL/LSR/ROL/ROR (§4.F), targeting either the accumulator or a memory
//! operand depending on addressing mode (mirrors the teacher's RMW
//! family, minus cycle bookkeeping - see spec §1 Non-goals).

use crate::disasm::{AddressingMode, DecodedInstruction};
use crate::error::Result;
use crate::ir::{BinaryOp, Flag, Instruction, Reg, Value};

use super::addressing::operand_value;
use super::flags::zero_negative;

pub(super) fn handle(instr: &DecodedInstruction) -> Result<Option<Vec<Instruction>>> {
    if !matches!(instr.mnemonic, "ASL" | "LSR" | "ROL" | "ROR") {
        return Ok(None);
    }

    let target = if instr.mode == AddressingMode::Accumulator {
        Value::Register(Reg::A)
    } else {
        operand_value(instr)?
    };

    let scratch = Value::Variable(0);
    let bit = Value::Variable(1);
    let old_carry = Value::Variable(2);

    let mut ir = vec![Instruction::Copy {
        src: target.clone(),
        dst: scratch.clone(),
    }];

    let rotates_in_carry = matches!(instr.mnemonic, "ROL" | "ROR");
    if rotates_in_carry {
        ir.push(Instruction::Copy {
            src: Value::Flag(Flag::Carry),
            dst: old_carry.clone(),
        });
    }

    let carry_mask = if matches!(instr.mnemonic, "ASL" | "ROL") {
        0x80
    } else {
        0x01
    };
    ir.push(Instruction::Binary {
        op: BinaryOp::And,
        left: scratch.clone(),
        right: Value::Constant(carry_mask),
        dst: bit.clone(),
    });
    ir.push(Instruction::Binary {
        op: BinaryOp::NotEquals,
        left: bit,
        right: Value::Constant(0),
        dst: Value::Flag(Flag::Carry),
    });

    let shift_op = if matches!(instr.mnemonic, "ASL" | "ROL") {
        BinaryOp::ShiftLeft
    } else {
        BinaryOp::ShiftRight
    };
    ir.push(Instruction::Binary {
        op: shift_op,
        left: scratch.clone(),
        right: Value::Constant(1),
        dst: scratch.clone(),
    });

    match instr.mnemonic {
        "ROL" => {
            ir.push(Instruction::Binary {
                op: BinaryOp::Or,
                left: scratch.clone(),
                right: old_carry,
                dst: scratch.clone(),
            });
        }
        "ROR" => {
            ir.push(Instruction::Binary {
                op: BinaryOp::ShiftLeft,
                left: old_carry.clone(),
                right: Value::Constant(7),
                dst: old_carry.clone(),
            });
            ir.push(Instruction::Binary {
                op: BinaryOp::Or,
                left: scratch.clone(),
                right: old_carry,
                dst: scratch.clone(),
            });
        }
        _ => {}
    }

    ir.push(Instruction::ConvertVariableToByte(scratch.clone()));
    ir.push(Instruction::Copy {
        src: scratch.clone(),
        dst: target,
    });
    ir.extend(zero_negative(scratch, Value::Variable(3)));

    Ok(Some(ir))
}
