//! ADC/SBC (§4.F). Grounded on the teacher's `cpu::dispatch::arithmetic`
//! (one handler for both, since SBC is ADC with the operand inverted).
//!
//! Binary mode only - the teacher's own CPU target (the NES's 2A03)
//! has decimal mode permanently disabled in hardware, so its `execute::adc`
//! never implemented BCD either; this crate keeps that omission rather
//! than inventing BCD semantics with nothing in the corpus to ground them
//! on (see DESIGN.md).

use crate::disasm::DecodedInstruction;
use crate::error::Result;
use crate::ir::{BinaryOp, Flag, Instruction, Reg, UnaryOp, Value};

use super::addressing::operand_value;
use super::flags::zero_negative;

pub(super) fn handle(instr: &DecodedInstruction) -> Result<Option<Vec<Instruction>>> {
    let is_sub = match instr.mnemonic {
        "ADC" => false,
        "SBC" => true,
        _ => return Ok(None),
    };

    let operand = operand_value(instr)?;
    let a = Value::Register(Reg::A);
    let effective = Value::Variable(0);
    let sum = Value::Variable(1);
    let xor_a_operand = Value::Variable(2);
    let xor_a_result = Value::Variable(3);

    let mut ir = Vec::new();

    if is_sub {
        ir.push(Instruction::Unary {
            op: UnaryOp::BitwiseNot,
            src: operand,
            dst: effective.clone(),
        });
    } else {
        ir.push(Instruction::Copy {
            src: operand,
            dst: effective.clone(),
        });
    }

    // sum = A + effective + Carry, kept wide until truncated below.
    ir.push(Instruction::Binary {
        op: BinaryOp::Add,
        left: a.clone(),
        right: effective.clone(),
        dst: sum.clone(),
    });
    ir.push(Instruction::Binary {
        op: BinaryOp::Add,
        left: sum.clone(),
        right: Value::Flag(Flag::Carry),
        dst: sum.clone(),
    });

    // Carry = sum > 0xFF, computed before truncation.
    ir.push(Instruction::Binary {
        op: BinaryOp::GreaterThan,
        left: sum.clone(),
        right: Value::Constant(0x00FF),
        dst: Value::Flag(Flag::Carry),
    });

    // Overflow = sign(A) == sign(effective) but sign(result) differs,
    // i.e. (~(A ^ effective) & (A ^ result) & 0x80) != 0.
    ir.push(Instruction::Binary {
        op: BinaryOp::Xor,
        left: a.clone(),
        right: effective,
        dst: xor_a_operand.clone(),
    });

    ir.push(Instruction::ConvertVariableToByte(sum.clone()));

    ir.push(Instruction::Binary {
        op: BinaryOp::Xor,
        left: a,
        right: sum.clone(),
        dst: xor_a_result.clone(),
    });
    ir.push(Instruction::Unary {
        op: UnaryOp::BitwiseNot,
        src: xor_a_operand,
        dst: xor_a_operand.clone(),
    });
    ir.push(Instruction::Binary {
        op: BinaryOp::And,
        left: xor_a_operand.clone(),
        right: xor_a_result,
        dst: xor_a_operand.clone(),
    });
    ir.push(Instruction::Binary {
        op: BinaryOp::And,
        left: xor_a_operand.clone(),
        right: Value::Constant(0x80),
        dst: xor_a_operand.clone(),
    });
    ir.push(Instruction::Binary {
        op: BinaryOp::NotEquals,
        left: xor_a_operand,
        right: Value::Constant(0),
        dst: Value::Flag(Flag::Overflow),
    });

    ir.push(Instruction::Copy {
        src: sum.clone(),
        dst: Value::Register(Reg::A),
    });
    ir.extend(zero_negative(sum, Value::Variable(2)));

    Ok(Some(ir))
}
