//! SG16 compiler and engine as a WASM module for browser environments.
//!
//! The page owns the timers and the DOM; this module owns the machine.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { Machine, compile } from 'sg16-wasm';
//!
//! await init();
//!
//! const vm = new Machine();
//! const result = JSON.parse(vm.load("00 00 00 IMM SEL 10 2A"));
//! if (result.success) {
//!   vm.start();
//!   setInterval(() => vm.tick(), 62.5);
//!   setInterval(() => { vm.frame(); draw(vm.memory()); }, 16.67);
//! }
//! ```

use serde::Serialize;
use sg16_eval::{Engine, EvalError};
use sg16_types::CompileErrors;
use wasm_bindgen::prelude::*;

/// JSON payload returned by [`compile`] and [`Machine::load`].
#[derive(Debug, Serialize)]
struct CompileResult {
    success: bool,
    /// Number of instructions produced (0 on failure).
    instructions: usize,
    /// Canonical bytecode text, `compile` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    bytecode: Option<String>,
    errors: CompileErrors,
}

impl CompileResult {
    fn ok(instructions: usize, bytecode: Option<String>) -> Self {
        Self {
            success: true,
            instructions,
            bytecode,
            errors: CompileErrors::empty(),
        }
    }

    fn failed(errors: CompileErrors) -> Self {
        Self {
            success: false,
            instructions: 0,
            bytecode: None,
            errors,
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| serialization_error(&e))
    }
}

fn serialization_error(e: &serde_json::Error) -> String {
    format!(
        r#"{{"success":false,"instructions":0,"errors":{{"errors":[{{"code":0,"message":"Serialization error: {}","line":0,"source_line":""}}]}}}}"#,
        e
    )
}

/// Compile SG16 program text.
///
/// Returns a JSON string:
/// ```json
/// {
///   "success": true,
///   "instructions": 1,
///   "bytecode": "00 00 00 00 00 10 2A",
///   "errors": { "errors": [] }
/// }
/// ```
///
/// On failure, `success` is `false` and `errors` lists every offending
/// line.
#[wasm_bindgen]
pub fn compile(source: &str) -> String {
    let result = match sg16_compiler::compile(source) {
        Ok(program) => CompileResult::ok(
            program.len(),
            Some(sg16_compiler::bytecode_to_string(program.as_slice())),
        ),
        Err(errors) => CompileResult::failed(errors),
    };
    result.to_json()
}

/// Disassemble program text (hex or assembly) to mnemonic assembly.
///
/// Returns an empty string if the text does not compile.
#[wasm_bindgen]
pub fn disassemble(source: &str) -> String {
    sg16_compiler::compile(source)
        .map(|program| sg16_compiler::disassemble(program.as_slice()))
        .unwrap_or_default()
}

/// Return the module version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// One SG16 machine, driven by page timers and DOM events.
#[wasm_bindgen]
pub struct Machine {
    engine: Engine,
}

#[wasm_bindgen]
impl Machine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Machine {
        Machine {
            engine: Engine::new(),
        }
    }

    /// Compile and install a program. Returns a JSON result like
    /// [`compile`], without `bytecode`. A failed load changes nothing.
    pub fn load(&mut self, source: &str) -> String {
        let result = match self.engine.load(source) {
            Ok(count) => CompileResult::ok(count, None),
            Err(EvalError::Compile(errors)) => CompileResult::failed(errors),
            Err(other) => CompileResult::failed(single_error(&other)),
        };
        result.to_json()
    }

    pub fn start(&mut self) {
        self.engine.start();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Call from the tick timer (nominally every 62.5 ms).
    pub fn tick(&mut self) {
        self.engine.tick();
    }

    /// Call from the frame timer (nominally every 16.67 ms).
    pub fn frame(&mut self) {
        self.engine.frame();
    }

    /// Pointer event on grid cell `cell`. `event` is the selector code
    /// (`0x21`–`0x23` buttons, `0x61`–`0x63` enter/leave/move). Returns
    /// whether an instruction executed; unknown codes are ignored.
    pub fn mouse(&mut self, cell: u8, event: u8) -> bool {
        self.engine.on_mouse_code(cell, event).unwrap_or(false)
    }

    /// Key event with an already mapped SG16 key code (`0x0`–`0xF`).
    pub fn key(&mut self, code: u8, down: bool) -> bool {
        self.engine.on_key_event(code, down)
    }

    /// The full 256-byte memory.
    pub fn memory(&self) -> Vec<u8> {
        self.engine.memory().as_slice().to_vec()
    }

    /// Grid, variables and device cells as JSON.
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.engine.memory().snapshot()).unwrap_or_default()
    }

    /// Loaded program as canonical bytecode text.
    pub fn bytecode(&self) -> String {
        sg16_compiler::bytecode_to_string(self.engine.program().as_slice())
    }

    pub fn instruction_count(&self) -> usize {
        self.engine.program().len()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn tick_count(&self) -> f64 {
        self.engine.tick_count() as f64
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

fn single_error(err: &EvalError) -> CompileErrors {
    let mut errors = CompileErrors::empty();
    errors.push(sg16_types::Sg16Error::new(
        sg16_types::ErrorCode(0),
        err.to_string(),
        0,
        "",
    ));
    errors
}
