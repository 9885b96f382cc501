use thiserror::Error;

use crate::FloatValue;

/// Failures raised by the iterative root finder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Iteration history exhausted after {capacity} entries")]
    HistoryExhausted { capacity: usize },
    #[error("Bisection did not converge after {iterations} iterations (last estimate {estimate} K)")]
    BisectionFailed {
        iterations: usize,
        estimate: FloatValue,
    },
    #[error("Residual evaluated to a non-finite value at T={temperature} K")]
    NonFiniteResidual { temperature: FloatValue },
}

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum EcoRoofError {
    #[error("{0}")]
    Error(String),
    #[error("Timestep of {timestep_minutes} min exceeds the moisture transport stability limit of {limit_minutes:.2} min. Use more than {min_timesteps_per_hour} timesteps per hour")]
    UnstableTimestep {
        timestep_minutes: FloatValue,
        limit_minutes: FloatValue,
        min_timesteps_per_hour: u32,
    },
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl EcoRoofError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        EcoRoofError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type for `Result<T, EcoRoofError>`.
pub type EcoRoofResult<T> = Result<T, EcoRoofError>;
