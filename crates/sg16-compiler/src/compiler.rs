//! Line compiler: program text to instruction records.
//!
//! Every line is handled independently:
//! - the `;` comment is stripped and blank lines are skipped
//! - a line made only of hex bytes is literal bytecode (7 bytes)
//! - any other line is assembly: 7 columns `pl pm px ev op tg vl`, where
//!   `ev` and `op` may be mnemonics
//!
//! Errors are collected across all lines rather than stopping at the first.

use sg16_types::isa::event_from_mnemonic;
use sg16_types::{
    CompileErrors, ErrorCode, Instruction, Operation, Program, Sg16Error, INSTRUCTION_WIDTH,
};
use tracing::debug;

use crate::token::{strip_comment, tokenize, Token};

/// One line's failure: code + message. The line number is attached by
/// [`Compiler`].
type LineError = (ErrorCode, String);

/// Result of compiling: a program, or every error encountered.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// `Some` only when `errors` is empty.
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

/// The SG16 compiler.
pub struct Compiler<'src> {
    source: &'src str,
    errors: CompileErrors,
}

impl<'src> Compiler<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            errors: CompileErrors::empty(),
        }
    }

    /// Compile every line, collecting errors.
    pub fn compile(mut self) -> CompileOutput {
        let mut instructions = Vec::new();

        for (idx, line) in self.source.split('\n').enumerate() {
            match compile_line(line) {
                Ok(Some(instr)) => instructions.push(instr),
                Ok(None) => {}
                Err((code, message)) => {
                    let line_no = idx as u32 + 1;
                    self.errors.push(Sg16Error::new(
                        code,
                        message,
                        line_no,
                        line.trim_end_matches('\r'),
                    ));
                }
            }
        }

        debug!(
            instructions = instructions.len(),
            errors = self.errors.len(),
            "compiled program"
        );

        let program = if self.errors.has_errors() {
            None
        } else {
            Some(Program::new(instructions))
        };

        CompileOutput {
            program,
            errors: self.errors,
        }
    }
}

/// Compile program text, failing with every line error if any line is bad.
pub fn compile(source: &str) -> Result<Program, CompileErrors> {
    let output = Compiler::new(source).compile();
    match output.program {
        Some(program) => Ok(program),
        None => Err(output.errors),
    }
}

/// Compile one line. `Ok(None)` for blank and comment-only lines.
fn compile_line(line: &str) -> Result<Option<Instruction>, LineError> {
    let tokens = tokenize(line);
    if tokens.is_empty() {
        return Ok(None);
    }

    if tokens.iter().all(Token::is_hex_byte) {
        return compile_bytecode(&tokens).map(Some);
    }

    compile_assembly(strip_comment(line), &tokens).map(Some)
}

/// A line of bare hex bytes.
fn compile_bytecode(tokens: &[Token<'_>]) -> Result<Instruction, LineError> {
    if tokens.len() != INSTRUCTION_WIDTH {
        return Err((
            ErrorCode::INVALID_LENGTH,
            format!(
                "Invalid instruction length: expected {INSTRUCTION_WIDTH} bytes, got {}",
                tokens.len()
            ),
        ));
    }

    let mut bytes = [0u8; INSTRUCTION_WIDTH];
    for (slot, tok) in bytes.iter_mut().zip(tokens) {
        *slot = hex_column(tok)?;
    }
    Ok(Instruction::from_bytes(bytes))
}

/// A line with at least one mnemonic (or bad token). `text` is the line
/// as written, comment stripped and trimmed.
fn compile_assembly(text: &str, tokens: &[Token<'_>]) -> Result<Instruction, LineError> {
    let [pl, pm, px, ev, op, tg, vl] = tokens else {
        return Err((
            ErrorCode::INVALID_FORMAT,
            format!(
                "Invalid instruction format: expected {INSTRUCTION_WIDTH} tokens, got {} in \"{}\"",
                tokens.len(),
                text
            ),
        ));
    };

    Ok(Instruction {
        pl: hex_column(pl)?,
        pm: hex_column(pm)?,
        px: hex_column(px)?,
        ev: event_column(ev)?,
        op: operation_column(op)?,
        tg: hex_column(tg)?,
        vl: hex_column(vl)?,
    })
}

fn hex_column(tok: &Token<'_>) -> Result<u8, LineError> {
    tok.hex_byte().ok_or_else(|| {
        (
            ErrorCode::INVALID_HEX_BYTE,
            format!("Invalid hex byte: {}", tok.text),
        )
    })
}

fn event_column(tok: &Token<'_>) -> Result<u8, LineError> {
    if let Some(byte) = tok.hex_byte() {
        return Ok(byte);
    }
    event_from_mnemonic(tok.text).ok_or_else(|| {
        (
            ErrorCode::UNKNOWN_EVENT_MNEMONIC,
            format!("Unknown event mnemonic: {}", tok.text),
        )
    })
}

fn operation_column(tok: &Token<'_>) -> Result<u8, LineError> {
    if let Some(byte) = tok.hex_byte() {
        return Ok(byte);
    }
    Operation::from_mnemonic(tok.text)
        .map(Operation::code)
        .ok_or_else(|| {
            (
                ErrorCode::UNKNOWN_OPERATION_MNEMONIC,
                format!("Unknown operation mnemonic: {}", tok.text),
            )
        })
}
