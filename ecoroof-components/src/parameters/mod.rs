//! Component parameters
//!
//! Parameter structures for the energy balance and moisture components. Each
//! struct provides defaults matching the published ecoroof correlations, and
//! missing fields fall back to those defaults when deserialised.

mod moisture_transport;
mod plant_coverage;
mod two_node;

pub use moisture_transport::{MoistureTransportParameters, RedistributionMethod};
pub use plant_coverage::PlantCoverageParameters;
pub use two_node::TwoNodeParameters;
