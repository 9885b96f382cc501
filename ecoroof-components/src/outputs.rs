//! Report variables published to the host output system.
//!
//! Every variable is declared once here. The energy balance models list the
//! subset they fill in; the moisture variables are always reported.

use ecoroof_core::define_report_variable;
use ecoroof_core::model::EnergyBalanceOutput;
use ecoroof_core::state::{FluxAccumulators, MoistureState};
use ecoroof_core::variable::{find_definition, Aggregation, ReportVariableDefinition};
use ecoroof_core::FloatValue;

define_report_variable!(
    VAR_SOIL_TEMPERATURE,
    name = "Green Roof|Soil Temperature",
    unit = "C",
    aggregation = Aggregation::State,
    description = "Coverage-weighted soil surface temperature",
);

define_report_variable!(
    VAR_VEGETATION_TEMPERATURE,
    name = "Green Roof|Vegetation Temperature",
    unit = "C",
    aggregation = Aggregation::State,
    description = "Leaf canopy temperature",
);

define_report_variable!(
    VAR_ROOT_MOISTURE_RATIO,
    name = "Green Roof|Soil Root Moisture Ratio",
    unit = "m3/m3",
    aggregation = Aggregation::State,
    description = "Volumetric moisture of the root zone",
);

define_report_variable!(
    VAR_SURFACE_MOISTURE_RATIO,
    name = "Green Roof|Soil Near Surface Moisture Ratio",
    unit = "m3/m3",
    aggregation = Aggregation::State,
    description = "Volumetric moisture of the near-surface layer",
);

define_report_variable!(
    VAR_SOIL_SENSIBLE,
    name = "Green Roof|Soil Sensible Heat Transfer Rate per Area",
    unit = "W/m2",
    aggregation = Aggregation::State,
    description = "Sensible heat from the soil to the air",
);

define_report_variable!(
    VAR_VEGETATION_SENSIBLE,
    name = "Green Roof|Vegetation Sensible Heat Transfer Rate per Area",
    unit = "W/m2",
    aggregation = Aggregation::State,
    description = "Sensible heat from the canopy to the air",
);

define_report_variable!(
    VAR_VEGETATION_MOISTURE_RATE,
    name = "Green Roof|Vegetation Moisture Transfer Rate",
    unit = "m/s",
    aggregation = Aggregation::State,
    description = "Transpiration as a water depth rate",
);

define_report_variable!(
    VAR_SOIL_MOISTURE_RATE,
    name = "Green Roof|Soil Moisture Transfer Rate",
    unit = "m/s",
    aggregation = Aggregation::State,
    description = "Soil evaporation as a water depth rate",
);

define_report_variable!(
    VAR_VEGETATION_LATENT,
    name = "Green Roof|Vegetation Latent Heat Transfer Rate per Area",
    unit = "W/m2",
    aggregation = Aggregation::State,
    description = "Latent heat carried away by transpiration",
);

define_report_variable!(
    VAR_SOIL_LATENT,
    name = "Green Roof|Soil Latent Heat Transfer Rate per Area",
    unit = "W/m2",
    aggregation = Aggregation::State,
    description = "Latent heat carried away by soil evaporation",
);

define_report_variable!(
    VAR_SOIL_NET_SHORTWAVE,
    name = "Green Roof|Soil Net Shortwave Radiation Heat Transfer Rate per Area",
    unit = "W/m2",
    aggregation = Aggregation::State,
    description = "Shortwave absorbed by the soil",
);

define_report_variable!(
    VAR_SOIL_NET_LONGWAVE,
    name = "Green Roof|Soil Net Longwave Radiation Heat Transfer Rate per Area",
    unit = "W/m2",
    aggregation = Aggregation::State,
    description = "Net longwave gained by the soil from sky and canopy",
);

define_report_variable!(
    VAR_SOIL_CONDUCTION,
    name = "Green Roof|Soil Conduction Heat Transfer Rate per Area",
    unit = "W/m2",
    aggregation = Aggregation::State,
    description = "Heat conducted from the soil surface into the roof",
);

define_report_variable!(
    VAR_CUMULATIVE_PRECIPITATION,
    name = "Green Roof|Cumulative Precipitation Depth",
    unit = "m",
    aggregation = Aggregation::Sum,
    description = "Precipitation since the start of the environment",
);

define_report_variable!(
    VAR_CUMULATIVE_IRRIGATION,
    name = "Green Roof|Cumulative Irrigation Depth",
    unit = "m",
    aggregation = Aggregation::Sum,
    description = "Irrigation since the start of the environment",
);

define_report_variable!(
    VAR_CUMULATIVE_RUNOFF,
    name = "Green Roof|Cumulative Runoff Depth",
    unit = "m",
    aggregation = Aggregation::Sum,
    description = "Runoff since the start of the environment",
);

define_report_variable!(
    VAR_CUMULATIVE_EVAPOTRANSPIRATION,
    name = "Green Roof|Cumulative Evapotranspiration Depth",
    unit = "m",
    aggregation = Aggregation::Sum,
    description = "Evapotranspiration since the start of the environment",
);

define_report_variable!(
    VAR_CURRENT_PRECIPITATION,
    name = "Green Roof|Current Precipitation Depth",
    unit = "m",
    aggregation = Aggregation::Sum,
    description = "Precipitation this timestep",
);

define_report_variable!(
    VAR_CURRENT_IRRIGATION,
    name = "Green Roof|Current Irrigation Depth",
    unit = "m",
    aggregation = Aggregation::Sum,
    description = "Irrigation this timestep",
);

define_report_variable!(
    VAR_CURRENT_RUNOFF,
    name = "Green Roof|Current Runoff Depth",
    unit = "m",
    aggregation = Aggregation::Sum,
    description = "Runoff this timestep",
);

define_report_variable!(
    VAR_CURRENT_EVAPOTRANSPIRATION,
    name = "Green Roof|Current Evapotranspiration Depth",
    unit = "m",
    aggregation = Aggregation::Sum,
    description = "Evapotranspiration this timestep",
);

/// Energy balance variables; soil radiation terms only when `with_radiation`.
pub fn energy_definitions(with_radiation: bool) -> Vec<&'static ReportVariableDefinition> {
    let mut definitions = vec![
        &VAR_SOIL_TEMPERATURE,
        &VAR_VEGETATION_TEMPERATURE,
        &VAR_SOIL_SENSIBLE,
        &VAR_VEGETATION_SENSIBLE,
        &VAR_VEGETATION_MOISTURE_RATE,
        &VAR_SOIL_MOISTURE_RATE,
        &VAR_VEGETATION_LATENT,
        &VAR_SOIL_LATENT,
    ];
    if with_radiation {
        definitions.push(&VAR_SOIL_NET_SHORTWAVE);
        definitions.push(&VAR_SOIL_NET_LONGWAVE);
    }
    definitions.push(&VAR_SOIL_CONDUCTION);
    definitions
}

/// Moisture and water budget variables, reported by every model.
pub fn moisture_definitions() -> Vec<&'static ReportVariableDefinition> {
    vec![
        &VAR_ROOT_MOISTURE_RATIO,
        &VAR_SURFACE_MOISTURE_RATIO,
        &VAR_CUMULATIVE_PRECIPITATION,
        &VAR_CUMULATIVE_IRRIGATION,
        &VAR_CUMULATIVE_RUNOFF,
        &VAR_CUMULATIVE_EVAPOTRANSPIRATION,
        &VAR_CURRENT_PRECIPITATION,
        &VAR_CURRENT_IRRIGATION,
        &VAR_CURRENT_RUNOFF,
        &VAR_CURRENT_EVAPOTRANSPIRATION,
    ]
}

/// Snapshot of every reported value after a surface call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportValues {
    entries: Vec<(&'static ReportVariableDefinition, FloatValue)>,
}

impl ReportValues {
    pub fn new(
        definitions: &[&'static ReportVariableDefinition],
        output: &EnergyBalanceOutput,
        moisture: &MoistureState,
        fluxes: &FluxAccumulators,
    ) -> Self {
        let report = &output.report;
        let entries = definitions
            .iter()
            .map(|&definition| {
                let value = match definition.name {
                    n if n == VAR_SOIL_TEMPERATURE.name => report.soil_temperature,
                    n if n == VAR_VEGETATION_TEMPERATURE.name => report.vegetation_temperature,
                    n if n == VAR_ROOT_MOISTURE_RATIO.name => moisture.root,
                    n if n == VAR_SURFACE_MOISTURE_RATIO.name => moisture.top,
                    n if n == VAR_SOIL_SENSIBLE.name => report.soil_sensible,
                    n if n == VAR_VEGETATION_SENSIBLE.name => report.vegetation_sensible,
                    n if n == VAR_VEGETATION_MOISTURE_RATE.name => {
                        output.evapotranspiration.vegetation
                    }
                    n if n == VAR_SOIL_MOISTURE_RATE.name => output.evapotranspiration.soil,
                    n if n == VAR_VEGETATION_LATENT.name => report.vegetation_latent,
                    n if n == VAR_SOIL_LATENT.name => report.soil_latent,
                    n if n == VAR_SOIL_NET_SHORTWAVE.name => report.soil_net_shortwave,
                    n if n == VAR_SOIL_NET_LONGWAVE.name => report.soil_net_longwave,
                    n if n == VAR_SOIL_CONDUCTION.name => report.soil_conduction,
                    n if n == VAR_CUMULATIVE_PRECIPITATION.name => fluxes.cumulative_precipitation,
                    n if n == VAR_CUMULATIVE_IRRIGATION.name => fluxes.cumulative_irrigation,
                    n if n == VAR_CUMULATIVE_RUNOFF.name => fluxes.cumulative_runoff,
                    n if n == VAR_CUMULATIVE_EVAPOTRANSPIRATION.name => {
                        fluxes.cumulative_evapotranspiration
                    }
                    n if n == VAR_CURRENT_PRECIPITATION.name => fluxes.current_precipitation,
                    n if n == VAR_CURRENT_IRRIGATION.name => fluxes.current_irrigation,
                    n if n == VAR_CURRENT_RUNOFF.name => fluxes.current_runoff,
                    n if n == VAR_CURRENT_EVAPOTRANSPIRATION.name => {
                        fluxes.current_evapotranspiration
                    }
                    _ => 0.0,
                };
                (definition, value)
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[(&'static ReportVariableDefinition, FloatValue)] {
        &self.entries
    }

    pub fn definitions(&self) -> Vec<&'static ReportVariableDefinition> {
        self.entries.iter().map(|(d, _)| *d).collect()
    }

    /// Value of the variable called `name`, if reported.
    pub fn value(&self, name: &str) -> Option<FloatValue> {
        let definition = find_definition(&self.definitions(), name)?;
        self.entries
            .iter()
            .find(|(d, _)| *d == definition)
            .map(|(_, v)| *v)
    }
}
