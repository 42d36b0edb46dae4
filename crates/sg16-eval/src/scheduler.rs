//! Deferred tick firings on a virtual clock.
//!
//! Time is counted in whole ticks. A firing armed at tick `t` with delay
//! `n` becomes due at `t + n`. Each distinct [`TickKey`] has at most one
//! firing in flight; arming an already pending key is refused.

use sg16_types::Instruction;
use std::collections::BTreeMap;

/// Identity of an armed tick instruction: its precondition and selector.
///
/// Two instructions that differ only in `op`/`tg`/`vl` share a key, so
/// only the first one in program order is armed while the key is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickKey {
    pub pl: u8,
    pub pm: u8,
    pub px: u8,
    pub ev: u8,
}

impl TickKey {
    pub fn of(instr: &Instruction) -> Self {
        Self {
            pl: instr.pl,
            pm: instr.pm,
            px: instr.px,
            ev: instr.ev,
        }
    }
}

/// A firing waiting for its due tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledFiring {
    pub key: TickKey,
    pub instruction: Instruction,
    /// Tick at which the firing becomes due.
    pub due: u64,
}

/// Queue of pending firings, ordered by due tick then arming order.
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    now: u64,
    next_seq: u64,
    queue: BTreeMap<(u64, u64), TickKey>,
    pending: BTreeMap<TickKey, ScheduledFiring>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Move the clock forward one tick. Returns the new tick.
    pub fn advance(&mut self) -> u64 {
        self.now += 1;
        self.now
    }

    pub fn is_pending(&self, key: &TickKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pending keys in key order.
    pub fn pending_keys(&self) -> impl Iterator<Item = &TickKey> + '_ {
        self.pending.keys()
    }

    /// Schedule `instr` to fire `delay` ticks from now.
    ///
    /// Returns `false` (and schedules nothing) if its key is already pending.
    pub fn arm(&mut self, instr: Instruction, delay: u8) -> bool {
        let key = TickKey::of(&instr);
        if self.pending.contains_key(&key) {
            return false;
        }
        let due = self.now + u64::from(delay);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((due, seq), key);
        self.pending.insert(
            key,
            ScheduledFiring {
                key,
                instruction: instr,
                due,
            },
        );
        true
    }

    /// Remove and return the earliest firing due at or before now.
    ///
    /// The key is released as part of this call, so it may be armed again.
    pub fn pop_due(&mut self) -> Option<ScheduledFiring> {
        let (&(due, seq), _) = self.queue.first_key_value()?;
        if due > self.now {
            return None;
        }
        let key = self.queue.remove(&(due, seq))?;
        self.pending.remove(&key)
    }

    /// Drop every pending firing and rewind the clock to tick 0.
    pub fn clear(&mut self) {
        self.now = 0;
        self.next_seq = 0;
        self.queue.clear();
        self.pending.clear();
    }
}
