//! LDA/LDX/LDY/STA/STX/STY (§4.F). Grounded on the teacher's
//! `cpu::dispatch::load_store`: one handler per direction (load vs
//! store), dispatching on mnemonic rather than raw opcode since
//! `disasm` has already resolved addressing mode.

use crate::disasm::DecodedInstruction;
use crate::error::Result;
use crate::ir::{Instruction, Reg, Value};

use super::addressing::operand_value;
use super::flags::zero_negative;

pub(super) fn handle(instr: &DecodedInstruction) -> Result<Option<Vec<Instruction>>> {
    let reg = match instr.mnemonic {
        "LDA" => Some(Reg::A),
        "LDX" => Some(Reg::X),
        "LDY" => Some(Reg::Y),
        _ => None,
    };
    if let Some(reg) = reg {
        let src = operand_value(instr)?;
        let dst = Value::Register(reg);
        let mut ir = vec![Instruction::Copy {
            src,
            dst: dst.clone(),
        }];
        ir.extend(zero_negative(dst, Value::Variable(0)));
        return Ok(Some(ir));
    }

    let reg = match instr.mnemonic {
        "STA" => Some(Reg::A),
        "STX" => Some(Reg::X),
        "STY" => Some(Reg::Y),
        _ => None,
    };
    if let Some(reg) = reg {
        let dst = operand_value(instr)?;
        return Ok(Some(vec![Instruction::Copy {
            src: Value::Register(reg),
            dst,
        }]));
    }

    Ok(None)
}
