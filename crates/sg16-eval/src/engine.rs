//! Engine: runtime representation of a loaded SG16 program.
//!
//! Owns the memory, the program and the tick scheduler, and exposes one
//! entry point per event class. Every entry point runs to completion.

use crate::error::{EvalError, EvalResult};
use crate::render::RenderSink;
use crate::scheduler::{TickKey, TickScheduler};
use sg16_types::isa::KEY_ANY;
use sg16_types::memory::{CLICK_DEVICE, GRID_END, KEY_CODE};
use sg16_types::{EventClass, Instruction, Memory, MouseEvent, Operation, Program};
use tracing::{debug, trace};

/// Coarse engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Initial state and the state after `reset`. All event entry points
    /// are no-ops.
    Stopped,
    /// Entered by `start`. The host drives tick and frame cadences.
    Running,
}

/// A single SG16 machine.
///
/// Hosts construct one, `load` program text, `start` it, then feed it
/// `tick`/`frame` cadences and pointer/key events.
pub struct Engine {
    memory: Memory,
    program: Program,
    state: EngineState,
    scheduler: TickScheduler,
    renderer: Option<Box<dyn RenderSink>>,
}

impl Engine {
    /// Create a stopped engine with zeroed memory and no program.
    pub fn new() -> Self {
        Self {
            memory: Memory::new(),
            program: Program::default(),
            state: EngineState::Stopped,
            scheduler: TickScheduler::new(),
            renderer: None,
        }
    }

    /// Create with a render sink installed.
    pub fn with_renderer(renderer: impl RenderSink + 'static) -> Self {
        let mut engine = Self::new();
        engine.set_renderer(renderer);
        engine
    }

    pub fn set_renderer(&mut self, renderer: impl RenderSink + 'static) {
        self.renderer = Some(Box::new(renderer));
    }

    // ══════════════════════════════════════════════════════════════════════
    // State access
    // ══════════════════════════════════════════════════════════════════════

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Ticks elapsed since `start`.
    pub fn tick_count(&self) -> u64 {
        self.scheduler.now()
    }

    /// Keys of the tick instructions currently armed.
    pub fn pending_tick_events(&self) -> Vec<TickKey> {
        self.scheduler.pending_keys().copied().collect()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ══════════════════════════════════════════════════════════════════════

    /// Compile `source` and install it.
    ///
    /// Atomic: on a compile failure the previous program, memory and state
    /// are untouched. On success the engine is reset (stopped, zeroed) and
    /// holds the new program. Returns the instruction count.
    pub fn load(&mut self, source: &str) -> EvalResult<usize> {
        let program = sg16_compiler::compile(source).map_err(EvalError::Compile)?;
        let count = program.len();
        self.load_program(program);
        Ok(count)
    }

    /// Reset and install an already compiled program.
    pub fn load_program(&mut self, program: Program) {
        self.reset();
        debug!(instructions = program.len(), "program loaded");
        self.program = program;
    }

    /// Enter `Running` and apply the immediate instructions once.
    ///
    /// Calling `start` while already running does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("start ignored: already running");
            return;
        }
        self.state = EngineState::Running;
        debug!(instructions = self.program.len(), "engine started");
        self.execute_immediate();
        self.render();
    }

    /// Force `Stopped`; clear memory, program and every pending firing.
    pub fn reset(&mut self) {
        self.state = EngineState::Stopped;
        self.memory.clear();
        self.program = Program::default();
        self.scheduler.clear();
        debug!("engine reset");
        self.render();
    }

    // ══════════════════════════════════════════════════════════════════════
    // Cadences
    // ══════════════════════════════════════════════════════════════════════

    /// One tick boundary: fire due firings, arm tick instructions, then fire
    /// any zero-delay firings armed by this scan.
    pub fn tick(&mut self) {
        if !self.is_running() {
            return;
        }
        let now = self.scheduler.advance();
        trace!(tick = now, "tick");
        self.fire_due();
        self.arm_ticks();
        self.fire_due();
        self.render();
    }

    /// One frame: re-apply the immediate instructions and render.
    pub fn frame(&mut self) {
        if !self.is_running() {
            return;
        }
        self.execute_immediate();
        self.render();
    }

    fn execute_immediate(&mut self) {
        for idx in 0..self.program.len() {
            let instr = self.program.as_slice()[idx];
            if instr.event_class() == EventClass::Immediate && self.check_precondition(&instr) {
                self.execute_operation(&instr);
            }
        }
    }

    fn arm_ticks(&mut self) {
        for instr in self.program.iter() {
            let EventClass::Tick { delay } = instr.event_class() else {
                continue;
            };
            if self.scheduler.is_pending(&TickKey::of(instr)) {
                continue;
            }
            if check(&self.memory, instr) && self.scheduler.arm(*instr, delay) {
                trace!(key = ?TickKey::of(instr), delay, "tick event armed");
            }
        }
    }

    fn fire_due(&mut self) {
        while let Some(firing) = self.scheduler.pop_due() {
            if self.is_running() && self.check_precondition(&firing.instruction) {
                trace!(key = ?firing.key, due = firing.due, "tick event fired");
                self.execute_operation(&firing.instruction);
            } else {
                trace!(key = ?firing.key, "tick event discarded");
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Input events
    // ══════════════════════════════════════════════════════════════════════

    /// Deliver a pointer event on grid cell `cell`.
    ///
    /// Button events first record the device id (1/2/3) in the click-device
    /// cell. The first instruction that matches the event (or the `OAC`
    /// wildcard, for buttons), whose `pl` is `cell` or outside the grid,
    /// and whose precondition holds, executes. Returns whether one did.
    pub fn on_mouse_event(&mut self, cell: u8, event: MouseEvent) -> bool {
        if !self.is_running() {
            return false;
        }
        if let Some(device) = event.device_id() {
            self.memory.write(CLICK_DEVICE, device);
        }

        let hit = self.program.iter().copied().find(|instr| {
            event.matches(instr.ev)
                && (instr.pl == cell || instr.pl > GRID_END)
                && check(&self.memory, instr)
        });
        if let Some(instr) = &hit {
            debug!(cell, ?event, "mouse event matched");
            self.execute_operation(instr);
        }

        self.render();
        hit.is_some()
    }

    /// Deliver a pointer event by raw selector code (`0x21`..`0x23`,
    /// `0x61`..`0x63`).
    pub fn on_mouse_code(&mut self, cell: u8, code: u8) -> EvalResult<bool> {
        let event = MouseEvent::from_code(code).ok_or(EvalError::UnknownMouseEvent(code))?;
        Ok(self.on_mouse_event(cell, event))
    }

    /// Deliver a key press or release.
    ///
    /// The raw key code is recorded in the key-code cell first. The first
    /// instruction of the matching direction whose key nibble equals
    /// `key_code` (or is `F`, any key) and whose precondition holds,
    /// executes. Returns whether one did.
    pub fn on_key_event(&mut self, key_code: u8, is_key_down: bool) -> bool {
        if !self.is_running() {
            return false;
        }
        self.memory.write(KEY_CODE, key_code);

        let hit = self.program.iter().copied().find(|instr| {
            let key = match (instr.event_class(), is_key_down) {
                (EventClass::KeyDown { key }, true) | (EventClass::KeyUp { key }, false) => key,
                _ => return false,
            };
            (key == key_code || key == KEY_ANY) && check(&self.memory, instr)
        });
        if let Some(instr) = &hit {
            debug!(key_code, is_key_down, "key event matched");
            self.execute_operation(instr);
        }

        self.render();
        hit.is_some()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Instruction semantics
    // ══════════════════════════════════════════════════════════════════════

    /// `memory[pl]` lies in `[pm, px]`. Never true when `pm > px`.
    pub fn check_precondition(&self, instr: &Instruction) -> bool {
        check(&self.memory, instr)
    }

    /// Apply the instruction's operation to `memory[tg]`, saturating to
    /// `0x00..=0xFF`. Unknown op codes do nothing.
    pub fn execute_operation(&mut self, instr: &Instruction) {
        let Some(op) = instr.operation() else {
            trace!(op = instr.op, "unknown operation ignored");
            return;
        };
        let mem = &self.memory;
        let current = mem.read(instr.tg);
        let result = match op {
            Operation::SetLiteral => instr.vl,
            Operation::SetVariable => mem.read(instr.vl),
            Operation::AddLiteral => current.saturating_add(instr.vl),
            Operation::AddVariable => current.saturating_add(mem.read(instr.vl)),
            Operation::SubtractLiteral => current.saturating_sub(instr.vl),
            Operation::SubtractVariable => current.saturating_sub(mem.read(instr.vl)),
        };
        trace!(%op, tg = instr.tg, vl = instr.vl, result, "executed operation");
        self.memory.write(instr.tg, result);
    }

    fn render(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.memory);
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn check(memory: &Memory, instr: &Instruction) -> bool {
    (instr.pm..=instr.px).contains(&memory.read(instr.pl))
}
