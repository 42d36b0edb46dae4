//! Shared types for SG16.
//!
//! This crate defines the instruction record, the ISA tables (event and
//! operation mnemonics), the 256-cell memory with its reserved addresses,
//! and the structured compile errors used by every other crate.

mod error;
mod instruction;
pub mod isa;
pub mod memory;

pub use error::{CompileErrors, ErrorCode, Sg16Error};
pub use instruction::{Instruction, Program, INSTRUCTION_WIDTH};
pub use isa::{EventClass, MouseEvent, Operation};
pub use memory::{Memory, MemorySnapshot};
