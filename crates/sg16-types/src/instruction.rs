use crate::isa::{EventClass, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes per encoded instruction.
pub const INSTRUCTION_WIDTH: usize = 7;

/// One SG16 instruction.
///
/// Field order is the encoding order: `pl pm px ev op tg vl`.
/// `pm > px` is legal; such a precondition simply never holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Instruction {
    /// Precondition location.
    pub pl: u8,
    /// Precondition minimum (inclusive).
    pub pm: u8,
    /// Precondition maximum (inclusive).
    pub px: u8,
    /// Event selector.
    pub ev: u8,
    /// Operation code.
    pub op: u8,
    /// Target location.
    pub tg: u8,
    /// Literal or source location, depending on `op`.
    pub vl: u8,
}

impl Instruction {
    pub fn from_bytes(bytes: [u8; INSTRUCTION_WIDTH]) -> Self {
        let [pl, pm, px, ev, op, tg, vl] = bytes;
        Self {
            pl,
            pm,
            px,
            ev,
            op,
            tg,
            vl,
        }
    }

    pub fn to_bytes(self) -> [u8; INSTRUCTION_WIDTH] {
        [self.pl, self.pm, self.px, self.ev, self.op, self.tg, self.vl]
    }

    /// Which dispatch path this instruction belongs to.
    pub fn event_class(&self) -> EventClass {
        EventClass::of(self.ev)
    }

    /// The decoded operation, or `None` for an unrecognised op code.
    pub fn operation(&self) -> Option<Operation> {
        Operation::from_code(self.op)
    }
}

impl From<[u8; INSTRUCTION_WIDTH]> for Instruction {
    fn from(bytes: [u8; INSTRUCTION_WIDTH]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Instruction> for [u8; INSTRUCTION_WIDTH] {
    fn from(instr: Instruction) -> Self {
        instr.to_bytes()
    }
}

/// Canonical bytecode rendering: `00 00 00 00 00 10 2A`.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.to_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// An ordered instruction list.
///
/// Order is match priority for the first-match-wins dispatch paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Flatten to raw bytes, seven per instruction.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.instructions.iter().flat_map(|i| i.to_bytes()).collect()
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

impl IntoIterator for Program {
    type Item = Instruction;
    type IntoIter = std::vec::IntoIter<Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}

/// One instruction per line, no trailing newline.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instructions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{instr}")?;
        }
        Ok(())
    }
}
