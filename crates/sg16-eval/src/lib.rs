//! SG16 execution engine.
//!
//! Runs compiled SG16 programs against a 256-byte memory. Four dispatch
//! paths are driven by the host:
//!
//! - immediate instructions at `start` and on every `frame`
//! - tick instructions armed on every `tick`, firing after their delay
//! - mouse instructions, first match wins
//! - keyboard instructions, first match wins
//!
//! [`Driver`] turns elapsed wall-clock time into tick and frame calls.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod render;
pub mod scheduler;

pub use config::EngineConfig;
pub use driver::{Driver, DriverStep};
pub use engine::{Engine, EngineState};
pub use error::{EvalError, EvalResult};
pub use render::RenderSink;
pub use scheduler::{ScheduledFiring, TickKey, TickScheduler};
