/*!
addressing.rs - decoded-instruction operand resolution, shared by every
lowering family (mirrors the teacher's `cpu::addressing`: one place that
turns an addressing mode and operand bytes into an effective operand,
used by every opcode-family handler).

Unlike the teacher's version, resolution here never touches a bus -
everything needed to describe the operand (base address, which index
register, indirection scheme) is known at decode time and folded into an
`ir::Value`. Only the *runtime* effective-address arithmetic (adding the
live index register, chasing an indirect pointer) is deferred, and that's
`codegen`'s job when it interprets the `Value`.
*/

use crate::disasm::{AddressingMode, DecodedInstruction};
use crate::error::{CoreError, Result};
use crate::ir::{IndexReg, Indirection, Value};

/// Resolve the operand `Value` a non-branch instruction reads or writes
/// (§4.E). Implied/Relative instructions have no such operand and are
/// handled entirely by their own family.
pub(super) fn operand_value(instr: &DecodedInstruction) -> Result<Value> {
    let operand_u8 = || instr.bytes[1];
    let operand_u16 = || u16::from_le_bytes([instr.bytes[1], instr.bytes[2]]);

    let value = match instr.mode {
        AddressingMode::Immediate => Value::Constant(operand_u8() as u16),
        AddressingMode::Accumulator => Value::Register(crate::ir::Reg::A),
        AddressingMode::ZeroPage => Value::zero_page(operand_u8(), None),
        AddressingMode::ZeroPageX => Value::zero_page(operand_u8(), Some(IndexReg::X)),
        AddressingMode::ZeroPageY => Value::zero_page(operand_u8(), Some(IndexReg::Y)),
        AddressingMode::Absolute => Value::absolute(operand_u16(), None),
        AddressingMode::AbsoluteX => Value::absolute(operand_u16(), Some(IndexReg::X)),
        AddressingMode::AbsoluteY => Value::absolute(operand_u16(), Some(IndexReg::Y)),
        AddressingMode::IndirectX => Value::IndirectMemory {
            base: operand_u8(),
            mode: Indirection::PreIndexedX,
        },
        AddressingMode::IndirectY => Value::IndirectMemory {
            base: operand_u8(),
            mode: Indirection::PostIndexedY,
        },
        AddressingMode::Implied | AddressingMode::Relative | AddressingMode::Indirect => {
            return Err(CoreError::UnsupportedInstruction {
                mnemonic: instr.mnemonic,
                mode: instr.mode,
                address: instr.address,
            });
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(mode: AddressingMode, bytes: Vec<u8>) -> DecodedInstruction {
        DecodedInstruction {
            address: 0x1000,
            opcode: bytes[0],
            mnemonic: "TEST",
            mode,
            bytes,
            target: None,
        }
    }

    #[test]
    fn immediate_is_constant() {
        let i = instr(AddressingMode::Immediate, vec![0xA9, 0x42]);
        assert_eq!(operand_value(&i).unwrap(), Value::Constant(0x42));
    }

    #[test]
    fn absolute_x_carries_index() {
        let i = instr(AddressingMode::AbsoluteX, vec![0xBD, 0x00, 0x20]);
        assert_eq!(
            operand_value(&i).unwrap(),
            Value::Memory {
                address: 0x2000,
                index: Some(IndexReg::X),
                single_byte: false,
            }
        );
    }

    #[test]
    fn indirect_y_is_post_indexed() {
        let i = instr(AddressingMode::IndirectY, vec![0xB1, 0x10]);
        assert_eq!(
            operand_value(&i).unwrap(),
            Value::IndirectMemory {
                base: 0x10,
                mode: Indirection::PostIndexedY,
            }
        );
    }
}
