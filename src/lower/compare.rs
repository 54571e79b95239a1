//! CMP/CPX/CPY (§4.F). A compare is a subtract that discards the result
//! except for the flags it sets.

use crate::disasm::DecodedInstruction;
use crate::error::Result;
use crate::ir::{BinaryOp, Flag, Instruction, Reg, Value};

use super::addressing::operand_value;
use super::flags::zero_negative;

pub(super) fn handle(instr: &DecodedInstruction) -> Result<Option<Vec<Instruction>>> {
    let reg = match instr.mnemonic {
        "CMP" => Reg::A,
        "CPX" => Reg::X,
        "CPY" => Reg::Y,
        _ => return Ok(None),
    };

    let operand = operand_value(instr)?;
    let reg_val = Value::Register(reg);
    let diff = Value::Variable(0);

    let ir = vec![
        Instruction::Binary {
            op: BinaryOp::GreaterThanOrEqualTo,
            left: reg_val.clone(),
            right: operand.clone(),
            dst: Value::Flag(Flag::Carry),
        },
        Instruction::Binary {
            op: BinaryOp::Sub,
            left: reg_val,
            right: operand,
            dst: diff.clone(),
        },
        Instruction::ConvertVariableToByte(diff.clone()),
    ]
    .into_iter()
    .chain(zero_negative(diff, Value::Variable(1)))
    .collect();

    Ok(Some(ir))
}
