//! Core building blocks for green roof surface balance models.
//!
//! This crate holds the pieces shared by every energy balance formulation:
//! physical constants, psychrometric and convection correlations, the
//! Newton/bisection root finder, environment interfaces consumed from the host
//! building simulation, and the persistent state types that the orchestration
//! layer owns between timesteps.

pub mod constants;
pub mod convection;
pub mod diagnostics;
pub mod environment;
pub mod errors;
pub mod material;
pub mod model;
pub mod psychrometrics;
pub mod solver;
pub mod state;
pub mod utils;
pub mod variable;

/// Floating point type used for all physical quantities.
pub type FloatValue = f64;
