//! Integration tests for the SG16 engine.
//!
//! Tests key engine features:
//! - load / start / reset lifecycle and atomic load
//! - precondition gating and clamped arithmetic
//! - tick arming, delayed firing, re-check at expiry, cancellation on reset
//! - mouse and keyboard first-match dispatch and device cells
//! - render sink notifications

use sg16_eval::{Engine, EngineState, EvalError, TickKey};
use sg16_types::memory::{CLICK_DEVICE, KEY_CODE};
use sg16_types::{Instruction, Memory, MemorySnapshot, MouseEvent};
use std::cell::RefCell;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Load and start a program (panics on compile errors).
fn running(source: &str) -> Engine {
    let mut engine = Engine::new();
    engine.load(source).expect("program should compile");
    engine.start();
    engine
}

fn ticks(engine: &mut Engine, n: u32) {
    for _ in 0..n {
        engine.tick();
    }
}

fn instr(bytes: [u8; 7]) -> Instruction {
    Instruction::from_bytes(bytes)
}

/// `SEL tg value` with an always-true precondition.
fn set(engine: &mut Engine, tg: u8, value: u8) {
    engine.execute_operation(&instr([0, 0, 0xFF, 0x00, 0x00, tg, value]));
}

// ══════════════════════════════════════════════════════════════════════════════
// Lifecycle
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn immediate_applies_on_start_before_any_tick() {
    let engine = running("00 00 00 IMM SEL 10 2A");
    assert_eq!(engine.memory()[0x10], 0x2A);
    assert_eq!(engine.tick_count(), 0);
    assert_eq!(engine.state(), EngineState::Running);
}

#[test]
fn load_alone_does_not_execute() {
    let mut engine = Engine::new();
    assert_eq!(engine.load("00 00 00 IMM SEL 10 2A").unwrap(), 1);
    assert_eq!(engine.memory()[0x10], 0);
    assert_eq!(engine.state(), EngineState::Stopped);
}

#[test]
fn failed_load_leaves_previous_program_and_memory() {
    let mut engine = running("00 00 00 IMM SEL 10 2A");
    let err = engine
        .load("00 00 00 IMM SEL 11 01\n00 00 00 NOPE SEL 10 01\n00 00")
        .unwrap_err();
    match err {
        EvalError::Compile(errs) => assert_eq!(errs.lines(), vec![2, 3]),
        other => panic!("expected compile error, got {other:?}"),
    }
    assert_eq!(engine.memory()[0x10], 0x2A);
    assert_eq!(engine.memory()[0x11], 0);
    assert_eq!(engine.program().len(), 1);
    assert!(engine.is_running());
}

#[test]
fn successful_load_resets_engine() {
    let mut engine = running("00 00 00 IMM SEL 10 2A");
    engine.load("00 00 00 IMM SEL 11 01").unwrap();
    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(engine.memory()[0x10], 0);
    assert_eq!(engine.program().len(), 1);
    engine.start();
    assert_eq!(engine.memory()[0x11], 1);
    assert_eq!(engine.memory()[0x10], 0);
}

#[test]
fn start_twice_does_not_rerun_immediate() {
    let mut engine = running("10 00 FE IMM ADL 10 01");
    assert_eq!(engine.memory()[0x10], 1);
    engine.start();
    assert_eq!(engine.memory()[0x10], 1);
}

#[test]
fn frame_reapplies_immediate() {
    let mut engine = running("10 00 FE IMM ADL 10 01");
    engine.frame();
    engine.frame();
    assert_eq!(engine.memory()[0x10], 3);
}

#[test]
fn stopped_engine_ignores_cadences() {
    let mut engine = Engine::new();
    engine.load("00 00 00 IMM SEL 10 2A\n00 00 00 A1T SEL 11 01").unwrap();
    engine.frame();
    ticks(&mut engine, 3);
    assert_eq!(engine.memory()[0x10], 0);
    assert_eq!(engine.memory()[0x11], 0);
    assert_eq!(engine.tick_count(), 0);
}

#[test]
fn reset_clears_everything() {
    let mut engine = running("00 00 00 IMM SEL 10 2A\n00 00 00 A3T SEL 11 01");
    engine.tick();
    assert_eq!(engine.pending_tick_events().len(), 1);
    engine.reset();
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(engine.program().is_empty());
    assert!(engine.pending_tick_events().is_empty());
    assert_eq!(engine.tick_count(), 0);
    assert!(engine.memory().as_slice().iter().all(|&b| b == 0));
}

// ══════════════════════════════════════════════════════════════════════════════
// Preconditions & operations
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn precondition_is_inclusive_exact_match() {
    let mut engine = Engine::new();
    let gated = instr([0x00, 0x05, 0x05, 0x00, 0x00, 0x10, 0x01]);
    for (value, expected) in [(0x04, false), (0x05, true), (0x06, false)] {
        set(&mut engine, 0x00, value);
        assert_eq!(engine.check_precondition(&gated), expected, "memory[0] = {value:#04X}");
    }
}

#[test]
fn precondition_with_min_above_max_never_holds() {
    let mut engine = Engine::new();
    let never = instr([0x20, 0x05, 0x01, 0x00, 0x00, 0x10, 0x01]);
    for value in 0..=255u8 {
        set(&mut engine, 0x20, value);
        assert!(!engine.check_precondition(&never));
    }
}

#[test]
fn subtract_literal_saturates_at_zero() {
    let mut engine = Engine::new();
    set(&mut engine, 0x10, 0x02);
    engine.execute_operation(&instr([0, 0, 0, 0, 0x04, 0x10, 0x05]));
    assert_eq!(engine.memory()[0x10], 0x00);
}

#[test]
fn add_literal_saturates_at_ff() {
    let mut engine = Engine::new();
    set(&mut engine, 0x10, 0xFE);
    engine.execute_operation(&instr([0, 0, 0, 0, 0x02, 0x10, 0x05]));
    assert_eq!(engine.memory()[0x10], 0xFF);
}

#[test]
fn variable_operations_read_source_cell() {
    let mut engine = Engine::new();
    set(&mut engine, 0x11, 0x30);
    set(&mut engine, 0x10, 0x05);

    // SEV 12 <- [11]
    engine.execute_operation(&instr([0, 0, 0, 0, 0x01, 0x12, 0x11]));
    assert_eq!(engine.memory()[0x12], 0x30);

    // ADV 10 += [11]
    engine.execute_operation(&instr([0, 0, 0, 0, 0x03, 0x10, 0x11]));
    assert_eq!(engine.memory()[0x10], 0x35);

    // SUV 10 -= [11]
    engine.execute_operation(&instr([0, 0, 0, 0, 0x05, 0x10, 0x11]));
    assert_eq!(engine.memory()[0x10], 0x05);

    // SUV saturates
    engine.execute_operation(&instr([0, 0, 0, 0, 0x05, 0x10, 0x11]));
    assert_eq!(engine.memory()[0x10], 0x00);

    // ADV saturates
    set(&mut engine, 0x13, 0xF0);
    engine.execute_operation(&instr([0, 0, 0, 0, 0x03, 0x13, 0x11]));
    assert_eq!(engine.memory()[0x13], 0xFF);
}

#[test]
fn unknown_operation_is_a_no_op() {
    let mut engine = Engine::new();
    set(&mut engine, 0x10, 7);
    let before = engine.memory().clone();
    engine.execute_operation(&instr([0, 0, 0, 0, 0x06, 0x10, 0x01]));
    engine.execute_operation(&instr([0, 0, 0, 0, 0xFF, 0x10, 0x01]));
    assert_eq!(engine.memory(), &before);
}

#[test]
fn immediate_respects_precondition_and_fires_all_matches() {
    let engine = running(
        "\
00 00 00 IMM SEL 10 01
00 01 01 IMM SEL 11 01
00 00 00 IMM SEL 12 01
",
    );
    assert_eq!(engine.memory()[0x10], 1);
    assert_eq!(engine.memory()[0x11], 0);
    assert_eq!(engine.memory()[0x12], 1);
}

#[test]
fn immediate_sees_writes_of_earlier_instructions() {
    let engine = running("00 00 00 IMM SEL 10 05\n10 05 05 IMM SEL 11 01");
    assert_eq!(engine.memory()[0x11], 1);
}

// ══════════════════════════════════════════════════════════════════════════════
// Tick events
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn tick_instruction_fires_after_its_delay() {
    let mut engine = running("10 00 00 A1T ADL 11 01");
    engine.tick();
    assert_eq!(engine.memory()[0x11], 0, "armed on tick 1, not yet fired");
    engine.tick();
    assert_eq!(engine.memory()[0x11], 1);
    ticks(&mut engine, 3);
    assert_eq!(engine.memory()[0x11], 4);
    assert_eq!(engine.tick_count(), 5);
}

#[test]
fn pending_tick_event_is_not_rearmed() {
    let mut engine = running("00 00 00 A3T ADL 11 01");
    for _ in 0..3 {
        engine.tick();
        assert_eq!(engine.pending_tick_events().len(), 1);
    }
    assert_eq!(engine.memory()[0x11], 0);
    engine.tick();
    assert_eq!(engine.memory()[0x11], 1, "single firing at tick 4");
    assert_eq!(engine.pending_tick_events().len(), 1, "re-armed once");
    ticks(&mut engine, 3);
    assert_eq!(engine.memory()[0x11], 2);
}

#[test]
fn pending_key_identifies_instruction() {
    let mut engine = running("00 00 00 A3T ADL 11 01");
    engine.tick();
    assert_eq!(
        engine.pending_tick_events(),
        vec![TickKey {
            pl: 0x00,
            pm: 0x00,
            px: 0x00,
            ev: 0x13
        }]
    );
}

#[test]
fn instructions_sharing_a_key_arm_only_the_first() {
    let mut engine = running("10 00 00 A1T ADL 11 01\n10 00 00 A1T ADL 12 01");
    ticks(&mut engine, 3);
    assert_eq!(engine.memory()[0x11], 2);
    assert_eq!(engine.memory()[0x12], 0);
}

#[test]
fn distinct_tick_instructions_fire_independently() {
    let mut engine = running("10 00 00 A1T ADL 11 01\n10 00 01 A2T ADL 12 01");
    ticks(&mut engine, 3);
    assert_eq!(engine.memory()[0x11], 2);
    assert_eq!(engine.memory()[0x12], 1);
}

#[test]
fn tick_precondition_rechecked_at_expiry() {
    let mut engine = running(
        "\
00 00 00 A2T SEL 11 09
00 00 00 OLC SEL 00 01
",
    );
    engine.tick();
    assert_eq!(engine.pending_tick_events().len(), 1);
    assert!(engine.on_mouse_event(0, MouseEvent::Left));
    assert_eq!(engine.memory()[0x00], 1);
    ticks(&mut engine, 2);
    assert_eq!(engine.memory()[0x11], 0, "precondition no longer holds");
    assert!(engine.pending_tick_events().is_empty(), "key released and not re-armed");
}

#[test]
fn tick_precondition_false_prevents_arming() {
    let mut engine = running("10 01 FF A1T ADL 11 01");
    ticks(&mut engine, 4);
    assert!(engine.pending_tick_events().is_empty());
    assert_eq!(engine.memory()[0x11], 0);
}

#[test]
fn zero_delay_tick_fires_on_the_arming_tick() {
    let mut engine = running("00 00 00 10 ADL 11 01");
    engine.tick();
    assert_eq!(engine.memory()[0x11], 1);
    engine.tick();
    assert_eq!(engine.memory()[0x11], 2);
    assert!(engine.pending_tick_events().is_empty());
}

#[test]
fn reset_cancels_pending_firings() {
    let mut engine = running("00 00 00 A2T SEL 11 09");
    engine.tick();
    engine.reset();
    engine.load("00 00 00 IMM SEL 12 01").unwrap();
    engine.start();
    ticks(&mut engine, 4);
    assert_eq!(engine.memory()[0x11], 0);
    assert_eq!(engine.memory()[0x12], 1);
}

#[test]
fn tick_counter_between_tick_and_immediate() {
    // A tick counter in 0x10 and an immediate mirror in 0x11.
    let mut engine = running(
        "\
10 00 FE A1T ADL 10 01
00 00 FF IMM SEV 11 10
",
    );
    ticks(&mut engine, 4);
    assert_eq!(engine.memory()[0x10], 3);
    assert_eq!(engine.memory()[0x11], 0, "mirror only updates on frames");
    engine.frame();
    assert_eq!(engine.memory()[0x11], 3);
}

// ══════════════════════════════════════════════════════════════════════════════
// Mouse events
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn mouse_first_match_wins() {
    let mut engine = running("03 00 00 OLC SEL 10 01\n03 00 00 OLC SEL 11 01");
    assert!(engine.on_mouse_event(3, MouseEvent::Left));
    assert_eq!(engine.memory()[0x10], 1);
    assert_eq!(engine.memory()[0x11], 0);
}

#[test]
fn mouse_skips_instruction_with_false_precondition() {
    let mut engine = running("03 05 05 OLC SEL 10 01\n03 00 00 OLC SEL 11 01");
    assert!(engine.on_mouse_event(3, MouseEvent::Left));
    assert_eq!(engine.memory()[0x10], 0);
    assert_eq!(engine.memory()[0x11], 1);
}

#[test]
fn mouse_location_must_match_cell() {
    let mut engine = running("03 00 00 OLC SEL 10 01");
    assert!(!engine.on_mouse_event(4, MouseEvent::Left));
    assert_eq!(engine.memory()[0x10], 0);
}

#[test]
fn mouse_location_outside_grid_means_anywhere() {
    let mut engine = running("10 00 FF OLC ADL 11 01");
    assert!(engine.on_mouse_event(7, MouseEvent::Left));
    assert!(engine.on_mouse_event(0, MouseEvent::Left));
    assert_eq!(engine.memory()[0x11], 2);
}

#[test]
fn mouse_toggle_on_grid_cell() {
    let mut engine = running("05 00 00 OLC SEL 05 01\n05 01 01 OLC SEL 05 00");
    engine.on_mouse_event(5, MouseEvent::Left);
    assert_eq!(engine.memory()[0x05], 1);
    engine.on_mouse_event(5, MouseEvent::Left);
    assert_eq!(engine.memory()[0x05], 0);
}

#[test]
fn mouse_wildcard_matches_buttons_only() {
    let mut engine = running("10 00 FF OAC ADL 11 01");
    engine.on_mouse_event(1, MouseEvent::Left);
    engine.on_mouse_event(1, MouseEvent::Right);
    engine.on_mouse_event(1, MouseEvent::Middle);
    assert_eq!(engine.memory()[0x11], 3);
    assert!(!engine.on_mouse_event(1, MouseEvent::Enter));
    assert!(!engine.on_mouse_event(1, MouseEvent::Move));
    assert_eq!(engine.memory()[0x11], 3);
}

#[test]
fn mouse_button_must_match_exactly() {
    let mut engine = running("10 00 FF ORC ADL 11 01");
    assert!(!engine.on_mouse_event(1, MouseEvent::Left));
    assert!(engine.on_mouse_event(1, MouseEvent::Right));
}

#[test]
fn pointer_motion_events_match_their_selector() {
    let mut engine = running("02 00 00 OME SEL 11 01\n02 00 00 OML SEL 11 02");
    assert!(engine.on_mouse_event(2, MouseEvent::Enter));
    assert_eq!(engine.memory()[0x11], 1);
    assert!(engine.on_mouse_event(2, MouseEvent::Leave));
    assert_eq!(engine.memory()[0x11], 2);
}

#[test]
fn click_device_cell_updated_regardless_of_match() {
    let mut engine = running("");
    engine.on_mouse_event(0, MouseEvent::Right);
    assert_eq!(engine.memory()[CLICK_DEVICE], 2);
    engine.on_mouse_event(0, MouseEvent::Middle);
    assert_eq!(engine.memory()[CLICK_DEVICE], 3);
    engine.on_mouse_event(0, MouseEvent::Move);
    assert_eq!(engine.memory()[CLICK_DEVICE], 3, "motion leaves the device cell");
}

#[test]
fn mouse_handler_reads_device_cell_it_just_wrote() {
    let mut engine = running("E2 02 02 OAC SEL 11 01\nE2 01 01 OAC SEL 11 02");
    engine.on_mouse_event(0, MouseEvent::Right);
    assert_eq!(engine.memory()[0x11], 1);
    engine.on_mouse_event(0, MouseEvent::Left);
    assert_eq!(engine.memory()[0x11], 2);
}

#[test]
fn mouse_ignored_while_stopped() {
    let mut engine = Engine::new();
    engine.load("10 00 FF OLC ADL 11 01").unwrap();
    assert!(!engine.on_mouse_event(0, MouseEvent::Left));
    assert_eq!(engine.memory()[CLICK_DEVICE], 0);
    assert_eq!(engine.memory()[0x11], 0);
}

#[test]
fn raw_mouse_codes() {
    let mut engine = running("10 00 FF OLC ADL 11 01");
    assert!(engine.on_mouse_code(0, 0x21).unwrap());
    assert!(matches!(
        engine.on_mouse_code(0, 0x2F),
        Err(EvalError::UnknownMouseEvent(0x2F))
    ));
}

// ══════════════════════════════════════════════════════════════════════════════
// Keyboard events
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn key_down_exact_then_wildcard() {
    let mut engine = running("10 00 FF KD5 ADL 11 01\n10 00 FF KDF ADL 12 01");
    assert!(engine.on_key_event(5, true));
    assert_eq!(engine.memory()[0x11], 1);
    assert_eq!(engine.memory()[0x12], 0);

    assert!(engine.on_key_event(6, true));
    assert_eq!(engine.memory()[0x12], 1);
    assert_eq!(engine.memory()[KEY_CODE], 6);
}

#[test]
fn key_direction_must_match() {
    let mut engine = running("10 00 FF KU3 SEL 11 07");
    assert!(!engine.on_key_event(3, true));
    assert_eq!(engine.memory()[0x11], 0);
    assert!(engine.on_key_event(3, false));
    assert_eq!(engine.memory()[0x11], 7);
}

#[test]
fn key_wildcard_first_in_order_wins() {
    let mut engine = running("10 00 FF KDF SEL 11 01\n10 00 FF KD2 SEL 12 01");
    engine.on_key_event(2, true);
    assert_eq!(engine.memory()[0x11], 1);
    assert_eq!(engine.memory()[0x12], 0);
}

#[test]
fn key_code_cell_updated_without_match() {
    let mut engine = running("00 00 00 IMM SEL 10 01");
    assert!(!engine.on_key_event(0x0E, false));
    assert_eq!(engine.memory()[KEY_CODE], 0x0E);
}

#[test]
fn key_precondition_on_key_code_cell() {
    // Only react while the last key code is 0x0A.
    let mut engine = running("E3 0A 0A KDF ADL 11 01");
    engine.on_key_event(0x0A, true);
    engine.on_key_event(0x0B, true);
    assert_eq!(engine.memory()[0x11], 1);
}

// ══════════════════════════════════════════════════════════════════════════════
// Rendering
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn render_sink_sees_every_mutating_entry_point() {
    let frames: Rc<RefCell<Vec<MemorySnapshot>>> = Rc::default();
    let sink = Rc::clone(&frames);
    let mut engine = Engine::with_renderer(move |memory: &Memory| {
        sink.borrow_mut().push(memory.snapshot());
    });
    engine.load("00 00 00 IMM SEL 10 2A\n03 00 00 OLC SEL 03 01").unwrap();
    let after_load = frames.borrow().len();

    engine.start();
    assert_eq!(frames.borrow().len(), after_load + 1);
    assert_eq!(frames.borrow().last().unwrap().variables[0], 0x2A);

    engine.frame();
    engine.tick();
    engine.on_mouse_event(3, MouseEvent::Left);
    engine.on_key_event(1, true);
    assert_eq!(frames.borrow().len(), after_load + 5);

    let last = *frames.borrow().last().unwrap();
    assert_eq!(last.grid[3], 1);
    assert_eq!(last.click_device, 1);
    assert_eq!(last.key_code, 1);

    engine.reset();
    assert_eq!(frames.borrow().last().unwrap().grid[3], 0);
}

#[test]
fn stopped_cadences_do_not_render() {
    let count = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&count);
    let mut engine = Engine::with_renderer(move |_: &Memory| *sink.borrow_mut() += 1);
    engine.frame();
    engine.tick();
    engine.on_key_event(1, true);
    assert_eq!(*count.borrow(), 0);
}
