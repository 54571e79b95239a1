/*!
opcodes.rs - static metadata for every documented 6502 opcode.

Grounded on the teacher's `cpu::table::EXEC_TABLE` / `OpInfo`: a `[T; 256]`
array indexed by opcode byte, built with a small `const fn` constructor.
This table widens that idea to the full 151 documented opcodes (the
teacher's table only covered the LDA family plus a couple of flag ops)
and drops the cycle-accounting fields, which this crate has no use for
(§1 Non-goals: cycle-accurate timing is explicitly out of scope).
*/

use super::AddressingMode;

/// Static metadata for one opcode: its mnemonic and addressing mode.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
}

const fn op(mnemonic: &'static str, mode: AddressingMode) -> Option<OpInfo> {
    Some(OpInfo { mnemonic, mode })
}

/// Look up an opcode's metadata. Returns `None` for undocumented opcodes
/// (§1 Non-goals).
pub fn opcode_info(opcode: u8) -> Option<OpInfo> {
    OPCODE_TABLE[opcode as usize]
}

use AddressingMode::*;

static OPCODE_TABLE: [Option<OpInfo>; 256] = {
    let mut t: [Option<OpInfo>; 256] = [None; 256];

    // -- Load/Store ------------------------------------------------------
    t[0xA9] = op("LDA", Immediate);
    t[0xA5] = op("LDA", ZeroPage);
    t[0xB5] = op("LDA", ZeroPageX);
    t[0xAD] = op("LDA", Absolute);
    t[0xBD] = op("LDA", AbsoluteX);
    t[0xB9] = op("LDA", AbsoluteY);
    t[0xA1] = op("LDA", IndirectX);
    t[0xB1] = op("LDA", IndirectY);

    t[0xA2] = op("LDX", Immediate);
    t[0xA6] = op("LDX", ZeroPage);
    t[0xB6] = op("LDX", ZeroPageY);
    t[0xAE] = op("LDX", Absolute);
    t[0xBE] = op("LDX", AbsoluteY);

    t[0xA0] = op("LDY", Immediate);
    t[0xA4] = op("LDY", ZeroPage);
    t[0xB4] = op("LDY", ZeroPageX);
    t[0xAC] = op("LDY", Absolute);
    t[0xBC] = op("LDY", AbsoluteX);

    t[0x85] = op("STA", ZeroPage);
    t[0x95] = op("STA", ZeroPageX);
    t[0x8D] = op("STA", Absolute);
    t[0x9D] = op("STA", AbsoluteX);
    t[0x99] = op("STA", AbsoluteY);
    t[0x81] = op("STA", IndirectX);
    t[0x91] = op("STA", IndirectY);

    t[0x86] = op("STX", ZeroPage);
    t[0x96] = op("STX", ZeroPageY);
    t[0x8E] = op("STX", Absolute);

    t[0x84] = op("STY", ZeroPage);
    t[0x94] = op("STY", ZeroPageX);
    t[0x8C] = op("STY", Absolute);

    // -- Transfers ---------------------------------------------------------
    t[0xAA] = op("TAX", Implied);
    t[0xA8] = op("TAY", Implied);
    t[0x8A] = op("TXA", Implied);
    t[0x98] = op("TYA", Implied);
    t[0xBA] = op("TSX", Implied);
    t[0x9A] = op("TXS", Implied);

    // -- Stack ---------------------------------------------------------
    t[0x48] = op("PHA", Implied);
    t[0x68] = op("PLA", Implied);
    t[0x08] = op("PHP", Implied);
    t[0x28] = op("PLP", Implied);

    // -- Logical -------------------------------------------------------
    t[0x29] = op("AND", Immediate);
    t[0x25] = op("AND", ZeroPage);
    t[0x35] = op("AND", ZeroPageX);
    t[0x2D] = op("AND", Absolute);
    t[0x3D] = op("AND", AbsoluteX);
    t[0x39] = op("AND", AbsoluteY);
    t[0x21] = op("AND", IndirectX);
    t[0x31] = op("AND", IndirectY);

    t[0x09] = op("ORA", Immediate);
    t[0x05] = op("ORA", ZeroPage);
    t[0x15] = op("ORA", ZeroPageX);
    t[0x0D] = op("ORA", Absolute);
    t[0x1D] = op("ORA", AbsoluteX);
    t[0x19] = op("ORA", AbsoluteY);
    t[0x01] = op("ORA", IndirectX);
    t[0x11] = op("ORA", IndirectY);

    t[0x49] = op("EOR", Immediate);
    t[0x45] = op("EOR", ZeroPage);
    t[0x55] = op("EOR", ZeroPageX);
    t[0x4D] = op("EOR", Absolute);
    t[0x5D] = op("EOR", AbsoluteX);
    t[0x59] = op("EOR", AbsoluteY);
    t[0x41] = op("EOR", IndirectX);
    t[0x51] = op("EOR", IndirectY);

    t[0x24] = op("BIT", ZeroPage);
    t[0x2C] = op("BIT", Absolute);

    // -- Arithmetic ------------------------------------------------------
    t[0x69] = op("ADC", Immediate);
    t[0x65] = op("ADC", ZeroPage);
    t[0x75] = op("ADC", ZeroPageX);
    t[0x6D] = op("ADC", Absolute);
    t[0x7D] = op("ADC", AbsoluteX);
    t[0x79] = op("ADC", AbsoluteY);
    t[0x61] = op("ADC", IndirectX);
    t[0x71] = op("ADC", IndirectY);

    t[0xE9] = op("SBC", Immediate);
    t[0xE5] = op("SBC", ZeroPage);
    t[0xF5] = op("SBC", ZeroPageX);
    t[0xED] = op("SBC", Absolute);
    t[0xFD] = op("SBC", AbsoluteX);
    t[0xF9] = op("SBC", AbsoluteY);
    t[0xE1] = op("SBC", IndirectX);
    t[0xF1] = op("SBC", IndirectY);

    // -- Compare ---------------------------------------------------------
    t[0xC9] = op("CMP", Immediate);
    t[0xC5] = op("CMP", ZeroPage);
    t[0xD5] = op("CMP", ZeroPageX);
    t[0xCD] = op("CMP", Absolute);
    t[0xDD] = op("CMP", AbsoluteX);
    t[0xD9] = op("CMP", AbsoluteY);
    t[0xC1] = op("CMP", IndirectX);
    t[0xD1] = op("CMP", IndirectY);

    t[0xE0] = op("CPX", Immediate);
    t[0xE4] = op("CPX", ZeroPage);
    t[0xEC] = op("CPX", Absolute);

    t[0xC0] = op("CPY", Immediate);
    t[0xC4] = op("CPY", ZeroPage);
    t[0xCC] = op("CPY", Absolute);

    // -- Increment / Decrement -------------------------------------------
    t[0xE6] = op("INC", ZeroPage);
    t[0xF6] = op("INC", ZeroPageX);
    t[0xEE] = op("INC", Absolute);
    t[0xFE] = op("INC", AbsoluteX);
    t[0xE8] = op("INX", Implied);
    t[0xC8] = op("INY", Implied);

    t[0xC6] = op("DEC", ZeroPage);
    t[0xD6] = op("DEC", ZeroPageX);
    t[0xCE] = op("DEC", Absolute);
    t[0xDE] = op("DEC", AbsoluteX);
    t[0xCA] = op("DEX", Implied);
    t[0x88] = op("DEY", Implied);

    // -- Shifts / Rotates -------------------------------------------------
    t[0x0A] = op("ASL", Accumulator);
    t[0x06] = op("ASL", ZeroPage);
    t[0x16] = op("ASL", ZeroPageX);
    t[0x0E] = op("ASL", Absolute);
    t[0x1E] = op("ASL", AbsoluteX);

    t[0x4A] = op("LSR", Accumulator);
    t[0x46] = op("LSR", ZeroPage);
    t[0x56] = op("LSR", ZeroPageX);
    t[0x4E] = op("LSR", Absolute);
    t[0x5E] = op("LSR", AbsoluteX);

    t[0x2A] = op("ROL", Accumulator);
    t[0x26] = op("ROL", ZeroPage);
    t[0x36] = op("ROL", ZeroPageX);
    t[0x2E] = op("ROL", Absolute);
    t[0x3E] = op("ROL", AbsoluteX);

    t[0x6A] = op("ROR", Accumulator);
    t[0x66] = op("ROR", ZeroPage);
    t[0x76] = op("ROR", ZeroPageX);
    t[0x6E] = op("ROR", Absolute);
    t[0x7E] = op("ROR", AbsoluteX);

    // -- Jumps / Calls -----------------------------------------------------
    t[0x4C] = op("JMP", Absolute);
    t[0x6C] = op("JMP", Indirect);
    t[0x20] = op("JSR", Absolute);
    t[0x60] = op("RTS", Implied);

    // -- Branches --------------------------------------------------------
    t[0x90] = op("BCC", Relative);
    t[0xB0] = op("BCS", Relative);
    t[0xF0] = op("BEQ", Relative);
    t[0x30] = op("BMI", Relative);
    t[0xD0] = op("BNE", Relative);
    t[0x10] = op("BPL", Relative);
    t[0x50] = op("BVC", Relative);
    t[0x70] = op("BVS", Relative);

    // -- Status flag changes -----------------------------------------------
    t[0x18] = op("CLC", Implied);
    t[0x38] = op("SEC", Implied);
    t[0x58] = op("CLI", Implied);
    t[0x78] = op("SEI", Implied);
    t[0xB8] = op("CLV", Implied);
    t[0xD8] = op("CLD", Implied);
    t[0xF8] = op("SED", Implied);

    // -- System ------------------------------------------------------------
    t[0x00] = op("BRK", Implied);
    t[0x40] = op("RTI", Implied);
    t[0xEA] = op("NOP", Implied);

    t
};
