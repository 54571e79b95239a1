//! PHA/PLA/PHP/PLP (§4.F). PLA updates Zero/Negative; PHA/PHP/PLP don't
//! touch flags beyond what PLP itself restores wholesale.

use crate::disasm::DecodedInstruction;
use crate::ir::{Instruction, Reg, Value};

use super::flags::zero_negative;

pub(super) fn handle(instr: &DecodedInstruction) -> Option<Vec<Instruction>> {
    match instr.mnemonic {
        "PHA" => Some(vec![Instruction::PushStackValue(Value::Register(Reg::A))]),
        "PHP" => Some(vec![Instruction::PushStackValue(Value::StatusForPush)]),
        "PLP" => Some(vec![Instruction::PopStackValue(Value::AllFlags)]),
        "PLA" => {
            let a = Value::Register(Reg::A);
            let mut ir = vec![Instruction::PopStackValue(a.clone())];
            ir.extend(zero_negative(a, Value::Variable(0)));
            Some(ir)
        }
        _ => None,
    }
}
