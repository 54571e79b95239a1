//! Catch-all for opcodes with no architectural effect worth modeling.
//! Mirrors the teacher's `cpu::dispatch::fallback`, minus the cycle
//! bookkeeping it existed to provide.

use crate::disasm::DecodedInstruction;
use crate::ir::Instruction;

pub(super) fn handle(instr: &DecodedInstruction) -> Option<Vec<Instruction>> {
    match instr.mnemonic {
        "NOP" => Some(vec![]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disasm::AddressingMode;

    #[test]
    fn nop_lowers_to_nothing() {
        let i = DecodedInstruction {
            address: 0,
            opcode: 0xEA,
            mnemonic: "NOP",
            mode: AddressingMode::Implied,
            bytes: vec![0xEA],
            target: None,
        };
        assert_eq!(handle(&i).unwrap(), Vec::<Instruction>::new());
    }
}
