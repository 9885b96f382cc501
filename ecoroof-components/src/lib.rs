//! Green roof components
//!
//! Surface energy balance and soil moisture models for a vegetated roof,
//! built on the shared pieces in `ecoroof-core`.
//!
//! # Module Organisation
//!
//! - `energy`: the two energy balance formulations (`PlantCoverage`, `TwoNode`)
//! - `moisture`: two-layer moisture budget and moisture-dependent soil properties
//! - `outputs`: `Green Roof|...` report variables
//! - `simulation`: per-simulation state, lifecycle resets and the surface call
//!
//! # Parameters
//!
//! Each component has an associated parameters struct in the `parameters`
//! module with defaults matching common extensive green roof build-ups.

pub mod energy;
pub mod moisture;
pub mod outputs;
pub mod parameters;
pub mod simulation;
