use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric compile error code (E100–E199).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Line shape (E100–E109) ──
    pub const INVALID_LENGTH: Self = Self(100);
    pub const INVALID_FORMAT: Self = Self(101);

    // ── Tokens (E110–E119) ──
    pub const INVALID_HEX_BYTE: Self = Self(110);
    pub const UNKNOWN_EVENT_MNEMONIC: Self = Self(111);
    pub const UNKNOWN_OPERATION_MNEMONIC: Self = Self(112);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured error for one offending program line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sg16Error {
    /// Error code (e.g., E110).
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// 1-based line number in the program text.
    pub line: u32,
    /// The raw source line, comment included.
    pub source_line: String,
}

impl Sg16Error {
    /// Create a new error.
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        line: u32,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            line,
            source_line: source_line.into(),
        }
    }
}

impl fmt::Display for Sg16Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for Sg16Error {}

/// Every line error collected while compiling one program.
///
/// Compilation is all-or-nothing: a non-empty `CompileErrors` means no
/// instruction from the text was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub struct CompileErrors {
    pub errors: Vec<Sg16Error>,
}

impl CompileErrors {
    /// Create an empty collection.
    pub fn empty() -> Self {
        Self { errors: Vec::new() }
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error. There is no cap; every offending line is kept.
    pub fn push(&mut self, error: Sg16Error) {
        self.errors.push(error);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sg16Error> {
        self.errors.iter()
    }

    /// Line numbers of the offending lines, in source order.
    pub fn lines(&self) -> Vec<u32> {
        self.errors.iter().map(|e| e.line).collect()
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a CompileErrors {
    type Item = &'a Sg16Error;
    type IntoIter = std::slice::Iter<'a, Sg16Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
