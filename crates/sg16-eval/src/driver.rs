//! Cadence driver: wall-clock time to tick and frame calls.
//!
//! The engine itself is clock-free. A host with real timers can call
//! `tick`/`frame` directly; a host with only a monotonic clock (or a test
//! with none) feeds elapsed time to a [`Driver`] instead.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EvalResult;
use std::time::Duration;

/// Cadence calls made by one `advance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStep {
    pub ticks: u64,
    pub frames: u64,
}

/// Runs the tick and frame cadences of an [`Engine`] from elapsed time.
pub struct Driver {
    engine: Engine,
    tick_period: Duration,
    frame_period: Duration,
    elapsed: Duration,
    next_tick: Duration,
    next_frame: Duration,
}

impl Driver {
    pub fn new(engine: Engine, config: &EngineConfig) -> EvalResult<Self> {
        let tick_period = config.tick_period()?;
        let frame_period = config.frame_period()?;
        Ok(Self {
            engine,
            tick_period,
            frame_period,
            elapsed: Duration::ZERO,
            next_tick: tick_period,
            next_frame: frame_period,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }

    /// Start the engine and restart both cadences from zero.
    pub fn start(&mut self) {
        self.rewind();
        self.engine.start();
    }

    /// Reset the engine. Cadences stop producing calls until `start`.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.rewind();
    }

    /// Account for `dt` of elapsed time, running every tick and frame that
    /// fell due, in time order. Ticks go first when both are due together.
    pub fn advance(&mut self, dt: Duration) -> DriverStep {
        let mut step = DriverStep::default();
        if !self.engine.is_running() {
            return step;
        }
        self.elapsed = self.elapsed.saturating_add(dt);

        loop {
            let tick_due = due(self.next_tick, self.elapsed);
            let frame_due = due(self.next_frame, self.elapsed);
            if tick_due && (!frame_due || self.next_tick <= self.next_frame) {
                self.engine.tick();
                self.next_tick = self.next_tick.saturating_add(self.tick_period);
                step.ticks += 1;
            } else if frame_due {
                self.engine.frame();
                self.next_frame = self.next_frame.saturating_add(self.frame_period);
                step.frames += 1;
            } else {
                break;
            }
        }
        step
    }

    fn rewind(&mut self) {
        self.elapsed = Duration::ZERO;
        self.next_tick = self.tick_period;
        self.next_frame = self.frame_period;
    }
}

/// A deadline pushed to `Duration::MAX` has saturated and never falls due.
fn due(deadline: Duration, elapsed: Duration) -> bool {
    deadline < Duration::MAX && deadline <= elapsed
}
