//! SG16 instruction set tables.
//!
//! Event selectors occupy reserved byte ranges, grouped by the high nibble:
//!
//! ```text
//! 0x00        IMM        immediate (startup + every frame)
//! 0x11..0x1F  A1T..AFT   tick, delay = low nibble
//! 0x21..0x23  OLC/ORC/OMC  mouse left / right / middle
//! 0x2F        OAC        any mouse button
//! 0x30..0x3F  KD0..KDF   key down, key code = low nibble (F = any)
//! 0x40..0x4F  KU0..KUF   key up,   key code = low nibble (F = any)
//! 0x61..0x63  OME/OML/OMM  mouse enter / leave / move
//! ```
//!
//! Operations are 0x00..0x05; anything else is a runtime no-op.

use std::fmt;

pub const EV_IMMEDIATE: u8 = 0x00;
pub const EV_TICK: u8 = 0x10;
pub const EV_MOUSE_LEFT: u8 = 0x21;
pub const EV_MOUSE_RIGHT: u8 = 0x22;
pub const EV_MOUSE_MIDDLE: u8 = 0x23;
pub const EV_MOUSE_ANY: u8 = 0x2F;
pub const EV_KEY_DOWN: u8 = 0x30;
pub const EV_KEY_UP: u8 = 0x40;
pub const EV_MOUSE_ENTER: u8 = 0x61;
pub const EV_MOUSE_LEAVE: u8 = 0x62;
pub const EV_MOUSE_MOVE: u8 = 0x63;

/// Low-nibble key code meaning "any key".
pub const KEY_ANY: u8 = 0x0F;

const CLASS_MASK: u8 = 0xF0;
const DETAIL_MASK: u8 = 0x0F;

/// Event mnemonic table, in byte order.
pub static EVENT_MNEMONICS: &[(&str, u8)] = &[
    ("IMM", 0x00),
    ("A1T", 0x11), ("A2T", 0x12), ("A3T", 0x13), ("A4T", 0x14),
    ("A5T", 0x15), ("A6T", 0x16), ("A7T", 0x17), ("A8T", 0x18),
    ("A9T", 0x19), ("AAT", 0x1A), ("ABT", 0x1B), ("ACT", 0x1C),
    ("ADT", 0x1D), ("AET", 0x1E), ("AFT", 0x1F),
    ("OLC", 0x21), ("ORC", 0x22), ("OMC", 0x23), ("OAC", 0x2F),
    ("KD0", 0x30), ("KD1", 0x31), ("KD2", 0x32), ("KD3", 0x33),
    ("KD4", 0x34), ("KD5", 0x35), ("KD6", 0x36), ("KD7", 0x37),
    ("KD8", 0x38), ("KD9", 0x39), ("KDA", 0x3A), ("KDB", 0x3B),
    ("KDC", 0x3C), ("KDD", 0x3D), ("KDE", 0x3E), ("KDF", 0x3F),
    ("KU0", 0x40), ("KU1", 0x41), ("KU2", 0x42), ("KU3", 0x43),
    ("KU4", 0x44), ("KU5", 0x45), ("KU6", 0x46), ("KU7", 0x47),
    ("KU8", 0x48), ("KU9", 0x49), ("KUA", 0x4A), ("KUB", 0x4B),
    ("KUC", 0x4C), ("KUD", 0x4D), ("KUE", 0x4E), ("KUF", 0x4F),
    ("OME", 0x61), ("OML", 0x62), ("OMM", 0x63),
];

/// Look up an event mnemonic, case-insensitively.
pub fn event_from_mnemonic(name: &str) -> Option<u8> {
    EVENT_MNEMONICS
        .iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(name))
        .map(|&(_, code)| code)
}

/// The canonical mnemonic for an event byte, if it has one.
pub fn event_mnemonic(code: u8) -> Option<&'static str> {
    EVENT_MNEMONICS
        .iter()
        .find(|&&(_, c)| c == code)
        .map(|&(m, _)| m)
}

// ─────────────────────────────────────────────────────────────────────
// Event classes
// ─────────────────────────────────────────────────────────────────────

/// The dispatch path an event selector belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    /// `0x00`: runs at start and on every frame.
    Immediate,
    /// `0x1N`: armed on each tick, fires `delay` ticks later.
    Tick { delay: u8 },
    /// `0x2_` buttons (and the `0x2F` wildcard) or `0x6_` pointer motion.
    Mouse,
    /// `0x3K`: key `K` pressed.
    KeyDown { key: u8 },
    /// `0x4K`: key `K` released.
    KeyUp { key: u8 },
    /// Any other selector. Never dispatched.
    Inert,
}

impl EventClass {
    /// Classify an event selector byte.
    pub fn of(ev: u8) -> Self {
        if ev == EV_IMMEDIATE {
            return Self::Immediate;
        }
        match ev & CLASS_MASK {
            EV_TICK => Self::Tick {
                delay: ev & DETAIL_MASK,
            },
            0x20 | 0x60 => Self::Mouse,
            EV_KEY_DOWN => Self::KeyDown {
                key: ev & DETAIL_MASK,
            },
            EV_KEY_UP => Self::KeyUp {
                key: ev & DETAIL_MASK,
            },
            _ => Self::Inert,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Mouse events
// ─────────────────────────────────────────────────────────────────────

/// A concrete pointer event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEvent {
    Left,
    Right,
    Middle,
    Enter,
    Leave,
    Move,
}

impl MouseEvent {
    /// The event selector byte this event matches exactly.
    pub fn code(self) -> u8 {
        match self {
            Self::Left => EV_MOUSE_LEFT,
            Self::Right => EV_MOUSE_RIGHT,
            Self::Middle => EV_MOUSE_MIDDLE,
            Self::Enter => EV_MOUSE_ENTER,
            Self::Leave => EV_MOUSE_LEAVE,
            Self::Move => EV_MOUSE_MOVE,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            EV_MOUSE_LEFT => Some(Self::Left),
            EV_MOUSE_RIGHT => Some(Self::Right),
            EV_MOUSE_MIDDLE => Some(Self::Middle),
            EV_MOUSE_ENTER => Some(Self::Enter),
            EV_MOUSE_LEAVE => Some(Self::Leave),
            EV_MOUSE_MOVE => Some(Self::Move),
            _ => None,
        }
    }

    /// Value written to the click-device cell, for button events only.
    pub fn device_id(self) -> Option<u8> {
        match self {
            Self::Left => Some(1),
            Self::Right => Some(2),
            Self::Middle => Some(3),
            Self::Enter | Self::Leave | Self::Move => None,
        }
    }

    /// Whether the `OAC` wildcard covers this event.
    pub fn is_button(self) -> bool {
        self.device_id().is_some()
    }

    /// Whether an instruction's event selector matches this event.
    pub fn matches(self, ev: u8) -> bool {
        ev == self.code() || (ev == EV_MOUSE_ANY && self.is_button())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────────────────────────────

/// The six defined operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    SetLiteral = 0x00,
    SetVariable = 0x01,
    AddLiteral = 0x02,
    AddVariable = 0x03,
    SubtractLiteral = 0x04,
    SubtractVariable = 0x05,
}

/// Operation mnemonic table, in byte order.
pub static OPERATION_MNEMONICS: &[(&str, Operation)] = &[
    ("SEL", Operation::SetLiteral),
    ("SEV", Operation::SetVariable),
    ("ADL", Operation::AddLiteral),
    ("ADV", Operation::AddVariable),
    ("SUL", Operation::SubtractLiteral),
    ("SUV", Operation::SubtractVariable),
];

impl Operation {
    pub fn from_code(code: u8) -> Option<Self> {
        OPERATION_MNEMONICS
            .get(code as usize)
            .map(|&(_, op)| op)
    }

    /// Look up an operation mnemonic, case-insensitively.
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        OPERATION_MNEMONICS
            .iter()
            .find(|(m, _)| m.eq_ignore_ascii_case(name))
            .map(|&(_, op)| op)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn mnemonic(self) -> &'static str {
        OPERATION_MNEMONICS[self as usize].0
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
