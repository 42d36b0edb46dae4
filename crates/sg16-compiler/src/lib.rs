//! SG16 compiler: converts program text into instruction records.
//!
//! ```text
//! program text → tokens per line → hex bytes | assembly columns → Program
//! ```
//!
//! A line is either literal bytecode (seven bare hex bytes) or assembly,
//! where the event and operation columns may use mnemonics:
//!
//! ```text
//! ; pl pm px ev  op  tg vl
//!   00 00 00 IMM SEL 10 2A
//!   00 00 00 00  00  10 2A
//! ```

mod compiler;
pub mod format;
pub mod token;

pub use compiler::{compile, CompileOutput, Compiler};
pub use format::{bytecode_to_string, disassemble};
