//! Error types for the SG16 engine.

use sg16_types::CompileErrors;
use thiserror::Error;

/// Errors surfaced by engine entry points and host configuration.
///
/// Runtime anomalies (unknown op codes, failed preconditions, events while
/// stopped) are not errors; they are silent no-ops.
#[derive(Debug, Error)]
pub enum EvalError {
    /// `load` was given text that does not compile. Nothing was installed.
    #[error(transparent)]
    Compile(#[from] CompileErrors),

    /// A raw mouse event code outside left/right/middle/enter/leave/move.
    #[error("unknown mouse event code: {0:#04X}")]
    UnknownMouseEvent(u8),

    /// Engine configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias for engine operations.
pub type EvalResult<T> = Result<T, EvalError>;
