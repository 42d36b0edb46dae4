//! Cadence configuration for hosts driving the engine.

use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Nominal tick period: 1/16 s.
pub const DEFAULT_TICK_PERIOD_MS: f64 = 62.5;
/// Nominal frame period: ~60 fps.
pub const DEFAULT_FRAME_PERIOD_MS: f64 = 16.67;

/// Periods of the two cadences started by `start`.
///
/// Missing JSON fields take their defaults:
///
/// ```json
/// { "tick_period_ms": 62.5, "frame_period_ms": 16.67 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tick_period_ms: f64,
    pub frame_period_ms: f64,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> EvalResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EvalError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Both periods must be strictly positive and convert to a nonzero
    /// [`Duration`].
    pub fn validate(&self) -> EvalResult<()> {
        self.tick_period()?;
        self.frame_period()?;
        Ok(())
    }

    pub fn tick_period(&self) -> EvalResult<Duration> {
        period("tick_period_ms", self.tick_period_ms)
    }

    pub fn frame_period(&self) -> EvalResult<Duration> {
        period("frame_period_ms", self.frame_period_ms)
    }
}

fn period(name: &str, ms: f64) -> EvalResult<Duration> {
    let invalid = |why: &str| {
        EvalError::Config(format!(
            "{name} must be a positive number of milliseconds, got {ms} ({why})"
        ))
    };
    if !ms.is_finite() || ms <= 0.0 {
        return Err(invalid("not positive"));
    }
    let duration = Duration::try_from_secs_f64(ms / 1000.0).map_err(|_| invalid("too large"))?;
    if duration.is_zero() {
        return Err(invalid("below one nanosecond"));
    }
    Ok(duration)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            frame_period_ms: DEFAULT_FRAME_PERIOD_MS,
        }
    }
}
