//! The pluggable surface energy balance.
//!
//! Two formulations exist: a per-node nonlinear balance (leaf, soil under the
//! canopy, bare soil) and a linearised two-node leaf/ground balance. Both sit
//! behind [`EnergyBalanceModel`] so the orchestration layer can run either,
//! chosen by configuration. Implementations are serialisable trait objects, so
//! a `Box<dyn EnergyBalanceModel>` can be read straight from a config file
//! with a `type` field naming the model.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::environment::{DrivingConditions, RoofSurface, SoilHeatFlux};
use crate::errors::EcoRoofResult;
use crate::material::{LiveThermalProperties, MaterialParameters};
use crate::state::{EvapotranspirationRates, MoistureState, SurfaceThermalState};
use crate::variable::ReportVariableDefinition;
use crate::FloatValue;

/// Everything an energy balance needs for one surface and timestep.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceContext<'a> {
    pub surface: &'a RoofSurface,
    pub weather: &'a DrivingConditions,
    pub material: &'a MaterialParameters,
    /// Conduction into the construction, linear in the outside temperature.
    pub conduction: SoilHeatFlux,
    /// Moisture after this timestep's update.
    pub moisture: MoistureState,
    pub properties: LiveThermalProperties,
}

/// Fluxes and temperatures reported after a solve.
///
/// Fluxes are W/m^2; sensible and latent terms are positive away from the
/// surface. Temperatures are Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceFluxReport {
    pub soil_temperature: FloatValue,
    pub vegetation_temperature: FloatValue,
    pub soil_sensible: FloatValue,
    pub vegetation_sensible: FloatValue,
    pub soil_latent: FloatValue,
    pub vegetation_latent: FloatValue,
    pub soil_net_shortwave: FloatValue,
    pub soil_net_longwave: FloatValue,
    pub soil_conduction: FloatValue,
}

/// Result of one energy balance solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBalanceOutput {
    /// Outside face temperature handed to the conduction solver (C).
    pub exterior_temperature: FloatValue,
    /// Water-loss rates for the next moisture update.
    pub evapotranspiration: EvapotranspirationRates,
    pub report: SurfaceFluxReport,
}

/// A surface energy balance formulation.
#[typetag::serde(tag = "type")]
pub trait EnergyBalanceModel: Debug {
    /// Report variables this model fills in.
    fn definitions(&self) -> Vec<&'static ReportVariableDefinition>;

    /// Check that the model can run with `material`.
    fn validate(&self, _material: &MaterialParameters) -> EcoRoofResult<()> {
        Ok(())
    }

    /// Whether every ecoroof surface is solved, or only the first one with
    /// the result shared by the rest.
    fn solves_every_surface(&self) -> bool {
        true
    }

    /// Solve the balance, updating `state` with the new node temperatures.
    fn solve(
        &self,
        context: &SurfaceContext,
        state: &mut SurfaceThermalState,
    ) -> EcoRoofResult<EnergyBalanceOutput>;
}
