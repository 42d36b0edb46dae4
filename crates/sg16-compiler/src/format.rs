//! Rendering compiled programs back to text.
//!
//! Both renderings compile back to the identical byte sequence.

use sg16_types::isa::event_mnemonic;
use sg16_types::{Instruction, Operation};

/// Canonical bytecode text: `2A`-style bytes, space-separated, one
/// instruction per line.
pub fn bytecode_to_string(instructions: &[Instruction]) -> String {
    instructions
        .iter()
        .map(Instruction::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assembly text, using mnemonics for `ev`/`op` where the tables have one.
pub fn disassemble(instructions: &[Instruction]) -> String {
    instructions
        .iter()
        .map(disassemble_instruction)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn disassemble_instruction(instr: &Instruction) -> String {
    let ev = match event_mnemonic(instr.ev) {
        Some(m) => m.to_string(),
        None => format!("{:02X}", instr.ev),
    };
    let op = match Operation::from_code(instr.op) {
        Some(op) => op.mnemonic().to_string(),
        None => format!("{:02X}", instr.op),
    };
    format!(
        "{:02X} {:02X} {:02X} {} {} {:02X} {:02X}",
        instr.pl, instr.pm, instr.px, ev, op, instr.tg, instr.vl
    )
}
