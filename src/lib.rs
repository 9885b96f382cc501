//! Green roof surface energy and moisture balance.
//!
//! A vegetated roof layer for building envelope simulation. Each timestep the
//! host hands over weather, the conduction terms of the roof construction and
//! the water supplied; [`EcoRoofSimulation::calculate_surface`] returns the
//! outside face temperature of the construction and keeps the soil moisture,
//! node temperatures and moisture-dependent thermal properties up to date.
//!
//! ```rust
//! use ecoroof::{
//!     ConductionCoefficients, DrivingConditions, RoofSurface, SimulationConfig, WaterInputs,
//! };
//!
//! let mut sim = SimulationConfig::default().build().unwrap();
//! sim.on_environment_start(20.0);
//!
//! let result = sim
//!     .calculate_surface(
//!         &RoofSurface::flat(1, 100.0),
//!         &DrivingConditions::default(),
//!         &ConductionCoefficients::default(),
//!         &WaterInputs::dry(),
//!         false,
//!     )
//!     .unwrap();
//! assert!(result.exterior_temperature.is_finite());
//! ```

pub mod config;

pub use config::SimulationConfig;
pub use ecoroof_components::energy::{PlantCoverage, TwoNode};
pub use ecoroof_components::parameters::{
    MoistureTransportParameters, PlantCoverageParameters, RedistributionMethod, TwoNodeParameters,
};
pub use ecoroof_components::simulation::{EcoRoofSimulation, SurfaceResult};
pub use ecoroof_core::environment::{
    ConductionCoefficients, DrivingConditions, IrrigationMode, RoofSurface, SurfaceId, WaterInputs,
};
pub use ecoroof_core::errors::{EcoRoofError, EcoRoofResult};
pub use ecoroof_core::material::{LiveThermalProperties, MaterialParameters};
pub use ecoroof_core::model::EnergyBalanceModel;

pub use ecoroof_components;
pub use ecoroof_core;
