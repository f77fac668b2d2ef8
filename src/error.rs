// src/error.rs
// Error taxonomy for the pendulum core. Construction problems and a degenerate per-step solve are the
// only two ways the physics can fail; everything above the core (HTTP, CLI) maps into or around these.

use thiserror::Error;

pub type PendulumResult<T> = Result<T, PendulumError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PendulumError {
    /// Rejected at construction; no simulation object is produced.
    #[error("Invalid configuration: {what} (got {value})")]
    InvalidConfiguration { what: &'static str, value: String },

    /// The inertia matrix of the current angle configuration cannot be inverted.
    #[error("Singular inertia matrix at step {step}: pivot {pivot} in column {column}")]
    SingularSystem {
        step: u64,
        column: usize,
        pivot: f64,
    },

    /// The step overflowed: an acceleration, velocity or angle came out NaN or infinite.
    #[error("Non-finite state produced at step {step}")]
    NonFiniteState { step: u64 },
}

impl PendulumError {
    pub(crate) fn invalid(what: &'static str, value: impl ToString) -> Self {
        PendulumError::InvalidConfiguration {
            what,
            value: value.to_string(),
        }
    }

    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, PendulumError::InvalidConfiguration { .. })
    }
}
