//! INC/DEC (memory read-modify-write) and INX/INY/DEX/DEY (register) (§4.F).

use crate::disasm::DecodedInstruction;
use crate::error::Result;
use crate::ir::{BinaryOp, Instruction, Reg, Value};

use super::addressing::operand_value;
use super::flags::zero_negative;

pub(super) fn handle(instr: &DecodedInstruction) -> Result<Option<Vec<Instruction>>> {
    let op = match instr.mnemonic {
        "INC" | "INX" | "INY" => BinaryOp::Add,
        "DEC" | "DEX" | "DEY" => BinaryOp::Sub,
        _ => return Ok(None),
    };

    let target = match instr.mnemonic {
        "INX" | "DEX" => Value::Register(Reg::X),
        "INY" | "DEY" => Value::Register(Reg::Y),
        _ => operand_value(instr)?,
    };

    let scratch = Value::Variable(0);
    let ir = vec![
        Instruction::Copy {
            src: target.clone(),
            dst: scratch.clone(),
        },
        Instruction::Binary {
            op,
            left: scratch.clone(),
            right: Value::Constant(1),
            dst: scratch.clone(),
        },
        Instruction::ConvertVariableToByte(scratch.clone()),
        Instruction::Copy {
            src: scratch.clone(),
            dst: target,
        },
    ]
    .into_iter()
    .chain(zero_negative(scratch, Value::Variable(1)))
    .collect();

    Ok(Some(ir))
}
