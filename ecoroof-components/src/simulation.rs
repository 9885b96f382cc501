//! Per-simulation state and the surface call sequence.
//!
//! [`EcoRoofSimulation`] owns everything that persists between timesteps and
//! drives one surface call:
//!
//! 1. The first surface ever processed becomes the *first ecoroof surface*.
//!    The moisture budget advances only when that surface is processed, so it
//!    moves exactly once per timestep however many roof surfaces share it.
//! 2. The configured energy balance is solved with the updated moisture and
//!    thermal properties. Models that do not solve every surface hand the
//!    first surface's result to the others.
//!
//! Lifecycle resets are explicit: [`EcoRoofSimulation::on_environment_start`]
//! at the start of each run period and [`EcoRoofSimulation::on_warmup_day`]
//! at the start of each warm-up day.

use std::collections::BTreeSet;

use ecoroof_core::environment::{
    ConductionCoefficients, DrivingConditions, RoofSurface, SurfaceId, WaterInputs,
};
use ecoroof_core::errors::EcoRoofResult;
use ecoroof_core::material::{LiveThermalProperties, MaterialParameters};
use ecoroof_core::model::{EnergyBalanceModel, EnergyBalanceOutput, SurfaceContext};
use ecoroof_core::state::{
    EvapotranspirationRates, FluxAccumulators, MoistureState, SurfaceThermalState,
};
use ecoroof_core::variable::ReportVariableDefinition;
use ecoroof_core::FloatValue;
use log::{debug, info, warn};

use crate::moisture::MoistureTransport;
use crate::outputs::{moisture_definitions, ReportValues};
use crate::parameters::MoistureTransportParameters;

/// Boundary condition handed back to the host conduction solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceResult {
    /// Outside face temperature of the roof construction (C).
    pub exterior_temperature: FloatValue,
}

/// The first ecoroof surface and the construction it carries.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FirstSurface {
    id: SurfaceId,
    construction: usize,
}

#[derive(Debug)]
pub struct EcoRoofSimulation {
    material: MaterialParameters,
    model: Box<dyn EnergyBalanceModel>,
    transport: MoistureTransport,
    moisture: MoistureState,
    properties: LiveThermalProperties,
    fluxes: FluxAccumulators,
    evapotranspiration: EvapotranspirationRates,
    thermal: SurfaceThermalState,
    first_surface: Option<FirstSurface>,
    mismatched: BTreeSet<SurfaceId>,
    last_output: Option<EnergyBalanceOutput>,
}

impl EcoRoofSimulation {
    /// Validate the inputs and set every state to its initial value.
    ///
    /// # Errors
    ///
    /// Fails if the material or model parameters are invalid, or the timestep
    /// is unstable for the chosen moisture redistribution.
    pub fn new(
        material: MaterialParameters,
        model: Box<dyn EnergyBalanceModel>,
        moisture_transport: MoistureTransportParameters,
        timestep_minutes: FloatValue,
    ) -> EcoRoofResult<Self> {
        material.validate()?;
        model.validate(&material)?;
        let transport = MoistureTransport::new(moisture_transport, &material, timestep_minutes)?;

        Ok(Self {
            moisture: MoistureState::uniform(material.initial_moisture),
            properties: material.initial_thermal_properties(),
            fluxes: FluxAccumulators::default(),
            evapotranspiration: EvapotranspirationRates::default(),
            thermal: SurfaceThermalState::default(),
            first_surface: None,
            mismatched: BTreeSet::new(),
            last_output: None,
            material,
            model,
            transport,
        })
    }

    /// Reset all state for a new run period.
    pub fn on_environment_start(&mut self, outdoor_c: FloatValue) {
        info!(
            "Resetting green roof state, initial moisture {}",
            self.material.initial_moisture
        );
        self.moisture = MoistureState::uniform(self.material.initial_moisture);
        self.properties = self.material.initial_thermal_properties();
        self.thermal = SurfaceThermalState::at_outdoor(outdoor_c);
        self.evapotranspiration = EvapotranspirationRates::default();
        self.fluxes.reset();
        self.last_output = None;
    }

    /// Restore the initial moisture and dry albedo at the start of a warm-up day.
    pub fn on_warmup_day(&mut self) {
        debug!("Warm-up day: restoring initial soil moisture");
        self.moisture = MoistureState::uniform(self.material.initial_moisture);
        self.properties.albedo = self.material.dry_albedo();
    }

    fn is_first_surface(&mut self, surface: &RoofSurface) -> bool {
        let first = *self.first_surface.get_or_insert(FirstSurface {
            id: surface.id,
            construction: surface.construction,
        });
        if surface.id == first.id {
            return true;
        }
        if surface.construction != first.construction && self.mismatched.insert(surface.id) {
            warn!(
                "Green roof {} uses construction {} but moisture is tracked for construction {} only",
                surface.id, surface.construction, first.construction
            );
        }
        false
    }

    /// Advance the roof by one surface call and return its boundary temperature.
    ///
    /// # Errors
    ///
    /// Propagates root-finder failures from the energy balance.
    pub fn calculate_surface(
        &mut self,
        surface: &RoofSurface,
        weather: &DrivingConditions,
        conduction: &ConductionCoefficients,
        water: &WaterInputs,
        warmup: bool,
    ) -> EcoRoofResult<SurfaceResult> {
        let first = self.is_first_surface(surface);

        if first {
            self.transport.update(
                &mut self.moisture,
                &mut self.properties,
                &mut self.fluxes,
                &self.evapotranspiration,
                water,
                warmup,
            );
        } else if !self.model.solves_every_surface() {
            if let Some(output) = self.last_output {
                return Ok(SurfaceResult {
                    exterior_temperature: output.exterior_temperature,
                });
            }
        }

        let context = SurfaceContext {
            surface,
            weather,
            material: &self.material,
            conduction: conduction.soil_heat_flux_terms(),
            moisture: self.moisture,
            properties: self.properties,
        };
        let output = self.model.solve(&context, &mut self.thermal)?;

        self.evapotranspiration = output.evapotranspiration;
        self.last_output = Some(output);
        Ok(SurfaceResult {
            exterior_temperature: output.exterior_temperature,
        })
    }

    pub fn material(&self) -> &MaterialParameters {
        &self.material
    }

    pub fn model(&self) -> &dyn EnergyBalanceModel {
        self.model.as_ref()
    }

    pub fn moisture_transport(&self) -> &MoistureTransport {
        &self.transport
    }

    /// Moisture-dependent properties for the host conduction solver.
    pub fn properties(&self) -> &LiveThermalProperties {
        &self.properties
    }

    pub fn moisture(&self) -> &MoistureState {
        &self.moisture
    }

    pub fn fluxes(&self) -> &FluxAccumulators {
        &self.fluxes
    }

    pub fn evapotranspiration(&self) -> &EvapotranspirationRates {
        &self.evapotranspiration
    }

    pub fn thermal_state(&self) -> &SurfaceThermalState {
        &self.thermal
    }

    pub fn first_surface(&self) -> Option<SurfaceId> {
        self.first_surface.map(|f| f.id)
    }

    /// Every variable this simulation reports, energy balance first.
    pub fn report_definitions(&self) -> Vec<&'static ReportVariableDefinition> {
        let mut definitions = self.model.definitions();
        definitions.extend(moisture_definitions());
        definitions
    }

    /// Report values after the most recent solve, `None` before the first.
    pub fn report(&self) -> Option<ReportValues> {
        let output = self.last_output.as_ref()?;
        Some(ReportValues::new(
            &self.report_definitions(),
            output,
            &self.moisture,
            &self.fluxes,
        ))
    }

    /// Summaries of the recurring warnings raised so far.
    pub fn warning_summaries(&self) -> Vec<String> {
        self.transport
            .unsaturated_flow()
            .warnings()
            .iter()
            .filter_map(|w| w.summary())
            .collect()
    }
}
