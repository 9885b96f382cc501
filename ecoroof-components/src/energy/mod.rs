//! Surface energy balance models.
//!
//! Both models implement [`EnergyBalanceModel`](ecoroof_core::model::EnergyBalanceModel)
//! and are selected by configuration through their `type` tag:
//!
//! - `plant_coverage`: [`PlantCoverage`], separate leaf, covered soil and bare
//!   soil nodes solved by Newton-Raphson
//! - `two_node`: [`TwoNode`], linearised leaf/ground system

mod plant_coverage;
mod two_node;

pub use plant_coverage::{
    BareSoilBalance, CanopyEnvironment, CoveredSoilBalance, LeafBalance, NodeFluxes,
    PlantCoverage,
};
pub use two_node::{ExchangeTerms, TwoNode};
