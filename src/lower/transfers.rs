//! TAX/TAY/TXA/TYA/TSX/TXS (§4.F). All transfers update Zero/Negative
//! except TXS, which leaves flags untouched (§8 "TXS neutrality").

use crate::disasm::DecodedInstruction;
use crate::ir::{Instruction, Reg, Value};

use super::flags::zero_negative;

pub(super) fn handle(instr: &DecodedInstruction) -> Option<Vec<Instruction>> {
    let (src, dst) = match instr.mnemonic {
        "TAX" => (Value::Register(Reg::A), Value::Register(Reg::X)),
        "TAY" => (Value::Register(Reg::A), Value::Register(Reg::Y)),
        "TXA" => (Value::Register(Reg::X), Value::Register(Reg::A)),
        "TYA" => (Value::Register(Reg::Y), Value::Register(Reg::A)),
        "TSX" => (Value::StackPointer, Value::Register(Reg::X)),
        "TXS" => (Value::Register(Reg::X), Value::StackPointer),
        _ => return None,
    };

    let mut ir = vec![Instruction::Copy {
        src,
        dst: dst.clone(),
    }];
    if instr.mnemonic != "TXS" {
        ir.extend(zero_negative(dst, Value::Variable(0)));
    }
    Some(ir)
}
