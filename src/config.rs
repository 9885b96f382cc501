//! TOML configuration for a green roof simulation.
//!
//! ```toml
//! timestep_minutes = 10.0
//!
//! [material]
//! thickness = 0.15
//! plant_coverage = 0.8
//!
//! [moisture_transport]
//! method = "richards"
//!
//! [energy_balance]
//! type = "two_node"
//! ```
//!
//! Every section and field is optional; omitted values take their defaults.
//! The energy balance `type` is `plant_coverage` or `two_node`.

use ecoroof_components::energy::PlantCoverage;
use ecoroof_components::parameters::MoistureTransportParameters;
use ecoroof_components::simulation::EcoRoofSimulation;
use ecoroof_core::errors::{EcoRoofError, EcoRoofResult};
use ecoroof_core::material::MaterialParameters;
use ecoroof_core::model::EnergyBalanceModel;
use ecoroof_core::FloatValue;
use serde::{Deserialize, Serialize};

fn default_timestep_minutes() -> FloatValue {
    15.0
}

fn default_energy_balance() -> Box<dyn EnergyBalanceModel> {
    Box::new(PlantCoverage::new())
}

/// Everything needed to build an [`EcoRoofSimulation`].
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Length of one host timestep (minutes).
    /// Default: 15
    #[serde(default = "default_timestep_minutes")]
    pub timestep_minutes: FloatValue,
    #[serde(default)]
    pub material: MaterialParameters,
    #[serde(default)]
    pub moisture_transport: MoistureTransportParameters,
    /// Default: plant coverage
    #[serde(default = "default_energy_balance")]
    pub energy_balance: Box<dyn EnergyBalanceModel>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep_minutes: default_timestep_minutes(),
            material: MaterialParameters::default(),
            moisture_transport: MoistureTransportParameters::default(),
            energy_balance: default_energy_balance(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(source: &str) -> EcoRoofResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml_string(&self) -> EcoRoofResult<String> {
        toml::to_string(self).map_err(|e| EcoRoofError::Error(e.to_string()))
    }

    /// Validate the configuration and create the simulation.
    pub fn build(self) -> EcoRoofResult<EcoRoofSimulation> {
        EcoRoofSimulation::new(
            self.material,
            self.energy_balance,
            self.moisture_transport,
            self.timestep_minutes,
        )
    }
}
