//! The engine's four error kinds (§7). All are programmer errors: a caller
//! violating a precondition, never a condition arising from normal physics.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EngineError {
    #[error("run_to({requested}) called with clock already at {current}: time cannot go backwards")]
    InvalidTime { requested: f64, current: f64 },

    #[error("run_to exceeded the cycle limit ({limit}); likely a zero-delay event cascade")]
    CycleLimitExceeded { limit: u32 },

    #[error("unsupported arguments: {reason}")]
    UnsupportedArguments { reason: &'static str },
}
