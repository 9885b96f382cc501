//! Soil Moisture Transport Component
//!
//! Tracks water in a two-layer growing medium and updates the soil thermal
//! properties that depend on it.
//!
//! # What This Component Does
//!
//! Once per timestep, in order:
//!
//! 1. Removes evapotranspiration: soil evaporation from the near-surface
//!    layer, transpiration from the root zone
//! 2. Adds precipitation and irrigation to the near-surface layer; input above
//!    the infiltration capacity, and any water above saturation, runs off
//! 3. Redistributes water between the layers (diffusion or unsaturated flow)
//! 4. Refills a root zone that has dried below residual from the layer above
//! 5. Moves the soil albedo, conductivity, density and specific heat toward
//!    their moisture-dependent values, rate limited per timestep
//!
//! # States (tracked between timesteps)
//!
//! - `Green Roof|Soil Near Surface Moisture Ratio` (m^3/m^3)
//! - `Green Roof|Soil Root Moisture Ratio` (m^3/m^3)
//!
//! # Outputs
//!
//! - Current and cumulative precipitation, irrigation, runoff and
//!   evapotranspiration depths (m)
//!
//! Cumulative totals are not accumulated during warm-up.

mod properties;
mod redistribution;

pub use properties::{PropertyTargets, RateLimiter};
pub use redistribution::{diffuse, SoilLayers, UnsaturatedFlow};

use ecoroof_core::environment::{IrrigationMode, WaterInputs};
use ecoroof_core::errors::{EcoRoofError, EcoRoofResult};
use ecoroof_core::material::{LiveThermalProperties, MaterialParameters};
use ecoroof_core::state::{EvapotranspirationRates, FluxAccumulators, MoistureState};
use ecoroof_core::FloatValue;
use log::debug;

use crate::parameters::{MoistureTransportParameters, RedistributionMethod};

/// Coefficient of the unsaturated-flow stability limit (min/m^2.07).
const STABILITY_COEFFICIENT: FloatValue = 161240.0 / 60.0;

/// Largest timestep (minutes) for which unsaturated flow in a soil of
/// `thickness` (m) stays stable.
///
/// $$\Delta t_{max} = \frac{161240 \cdot 2^{-2.3}}{60} d^{2.07}$$
pub fn stability_limit_minutes(thickness: FloatValue) -> FloatValue {
    STABILITY_COEFFICIENT * 2.0_f64.powf(-2.3) * thickness.powf(2.07)
}

/// Fail if `timestep_minutes` exceeds the stability limit, naming the
/// number of timesteps per hour that would be needed.
fn check_stability(thickness: FloatValue, timestep_minutes: FloatValue) -> EcoRoofResult<()> {
    let limit = stability_limit_minutes(thickness);
    if timestep_minutes <= limit {
        return Ok(());
    }
    let divisor = (1..=20u32)
        .find(|&d| (timestep_minutes / d as FloatValue).floor() <= limit)
        .unwrap_or(21);
    Err(EcoRoofError::UnstableTimestep {
        timestep_minutes,
        limit_minutes: limit,
        min_timesteps_per_hour: (60.0 * divisor as FloatValue / timestep_minutes).round() as u32,
    })
}

/// Two-layer moisture budget and thermal property updater.
#[derive(Debug, Clone)]
pub struct MoistureTransport {
    parameters: MoistureTransportParameters,
    material: MaterialParameters,
    layers: SoilLayers,
    timestep_minutes: FloatValue,
    limiter: RateLimiter,
    unsaturated: UnsaturatedFlow,
}

impl MoistureTransport {
    /// Set up the layers for `material` and check the timestep.
    ///
    /// # Errors
    ///
    /// [`EcoRoofError::UnstableTimestep`] when the unsaturated-flow model is
    /// selected and the timestep is too long for the soil thickness.
    pub fn new(
        parameters: MoistureTransportParameters,
        material: &MaterialParameters,
        timestep_minutes: FloatValue,
    ) -> EcoRoofResult<Self> {
        if !(timestep_minutes > 0.0 && timestep_minutes <= 60.0) {
            return Err(EcoRoofError::invalid_parameter(
                "timestep_minutes",
                "must lie in (0, 60]",
            ));
        }
        let (top_depth, root_depth) = parameters.layer_depths(material.thickness);
        if top_depth <= 0.0 || root_depth <= 0.0 {
            return Err(EcoRoofError::invalid_parameter(
                "top_layer_depth",
                format!(
                    "layers of {} m and {} m do not fit a soil of {} m",
                    top_depth, root_depth, material.thickness
                ),
            ));
        }
        let layers = SoilLayers {
            top_depth,
            root_depth,
            saturation: material.saturation_moisture,
            residual: material.residual_moisture,
        };

        if parameters.method == RedistributionMethod::Richards {
            check_stability(layers.thickness(), timestep_minutes)?;
        }

        let (min_ratio, max_ratio) = parameters.property_ratio_bounds(timestep_minutes);
        debug!(
            "Moisture transport: {:?}, top layer {} m, root zone {} m",
            parameters.method, top_depth, root_depth
        );

        Ok(Self {
            unsaturated: UnsaturatedFlow::from_parameters(&parameters),
            limiter: RateLimiter::new(min_ratio, max_ratio),
            parameters,
            material: material.clone(),
            layers,
            timestep_minutes,
        })
    }

    pub fn layers(&self) -> &SoilLayers {
        &self.layers
    }

    pub fn method(&self) -> RedistributionMethod {
        self.parameters.method
    }

    pub fn unsaturated_flow(&self) -> &UnsaturatedFlow {
        &self.unsaturated
    }

    fn seconds(&self) -> FloatValue {
        self.timestep_minutes * 60.0
    }

    /// Advance the moisture budget by one timestep and update the live
    /// thermal properties.
    pub fn update(
        &mut self,
        moisture: &mut MoistureState,
        properties: &mut LiveThermalProperties,
        fluxes: &mut FluxAccumulators,
        evapotranspiration: &EvapotranspirationRates,
        water: &WaterInputs,
        warmup: bool,
    ) {
        let layers = self.layers;
        let seconds = self.seconds();
        let floor = layers.floor();

        // Evapotranspiration, limited to the water each layer holds above its floor
        let evaporated = (evapotranspiration.soil * seconds)
            .min(((moisture.top - floor) * layers.top_depth).max(0.0));
        let transpired = (evapotranspiration.vegetation * seconds)
            .min(((moisture.root - floor) * layers.root_depth).max(0.0));
        moisture.top -= evaporated / layers.top_depth;
        moisture.root -= transpired / layers.root_depth;
        fluxes.current_evapotranspiration = evaporated + transpired;

        // Precipitation and irrigation
        let precipitation = water.precipitation.unwrap_or(0.0).max(0.0);
        moisture.top += precipitation / layers.top_depth;

        let irrigation = match water.irrigation_mode {
            IrrigationMode::None => 0.0,
            IrrigationMode::Scheduled => water.irrigation,
            IrrigationMode::Smart { threshold } => {
                if moisture.top < threshold * layers.saturation {
                    water.irrigation
                } else {
                    0.0
                }
            }
        }
        .max(0.0);
        moisture.top += irrigation / layers.top_depth;

        fluxes.current_precipitation = precipitation;
        fluxes.current_irrigation = irrigation;

        // Infiltration capacity, then saturation excess
        let capacity = self.parameters.infiltration_capacity(self.timestep_minutes);
        let mut runoff = (precipitation + irrigation - capacity).max(0.0);
        moisture.top -= runoff / layers.top_depth;

        let ceiling = layers.ceiling();
        if moisture.top > ceiling {
            runoff += (moisture.top - ceiling) * layers.top_depth;
            moisture.top = ceiling;
        }

        runoff += match self.parameters.method {
            RedistributionMethod::Diffusion => {
                diffuse(moisture, &layers, &self.parameters, seconds);
                0.0
            }
            RedistributionMethod::Richards => self.unsaturated.step(moisture, &layers, seconds),
        };
        fluxes.current_runoff = runoff;

        // Refill a dried-out root zone from whatever the layer above can spare
        if moisture.root < floor {
            let refill = ((floor - moisture.root) * layers.root_depth)
                .min(((moisture.top - floor) * layers.top_depth).max(0.0));
            moisture.top -= refill / layers.top_depth;
            moisture.root += refill / layers.root_depth;
        }

        if !warmup {
            fluxes.accumulate();
        }

        let targets =
            PropertyTargets::at(&self.material, moisture, layers.top_depth, layers.root_depth);
        self.limiter.apply(properties, &targets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn transport(method: RedistributionMethod, thickness: FloatValue) -> MoistureTransport {
        let parameters = MoistureTransportParameters {
            method,
            ..MoistureTransportParameters::default()
        };
        let material = MaterialParameters {
            thickness,
            ..MaterialParameters::default()
        };
        MoistureTransport::new(parameters, &material, 15.0).unwrap()
    }

    #[test]
    fn test_stability_limit() {
        // ~4.64 minutes for 10 cm of soil
        let limit = stability_limit_minutes(0.1);
        assert!((limit - 4.64).abs() < 0.01, "limit = {}", limit);
        assert!(stability_limit_minutes(0.2) > 15.0);
    }

    #[test]
    fn test_unstable_timestep_rejected() {
        let parameters = MoistureTransportParameters {
            method: RedistributionMethod::Richards,
            ..MoistureTransportParameters::default()
        };
        let material = MaterialParameters::default();
        let err = MoistureTransport::new(parameters, &material, 15.0).unwrap_err();

        match err {
            EcoRoofError::UnstableTimestep {
                min_timesteps_per_hour,
                ..
            } => assert_eq!(min_timesteps_per_hour, 16),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_diffusion_ignores_stability_limit() {
        let parameters = MoistureTransportParameters::default();
        let material = MaterialParameters::default();
        assert!(MoistureTransport::new(parameters, &material, 15.0).is_ok());
    }

    #[test]
    fn test_invalid_timestep() {
        let material = MaterialParameters::default();
        let result =
            MoistureTransport::new(MoistureTransportParameters::default(), &material, 0.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_thin_soil_split_in_half() {
        let transport = transport(RedistributionMethod::Diffusion, 0.1);
        assert!(is_close!(transport.layers().top_depth, 0.05));
        assert!(is_close!(transport.layers().root_depth, 0.05));
    }

    #[test]
    fn test_rain_above_capacity_runs_off() {
        let mut transport = transport(RedistributionMethod::Diffusion, 0.15);
        let material = MaterialParameters::default();
        let mut moisture = MoistureState::uniform(0.1);
        let mut properties = material.initial_thermal_properties();
        let mut fluxes = FluxAccumulators::default();

        // 0.01 m in 15 minutes against a capacity of 0.003175 m
        transport.update(
            &mut moisture,
            &mut properties,
            &mut fluxes,
            &EvapotranspirationRates::default(),
            &WaterInputs::rain(0.01),
            false,
        );

        assert!(is_close!(fluxes.current_runoff, 0.01 - 0.003175));
        assert!(is_close!(fluxes.cumulative_precipitation, 0.01));
    }

    #[test]
    fn test_smart_irrigation_skipped_when_wet() {
        let mut transport = transport(RedistributionMethod::Diffusion, 0.15);
        let material = MaterialParameters::default();
        let mut properties = material.initial_thermal_properties();
        let water = WaterInputs {
            irrigation: 0.001,
            irrigation_mode: IrrigationMode::Smart { threshold: 0.4 },
            ..WaterInputs::default()
        };

        let mut wet = MoistureState::uniform(0.2);
        let mut fluxes = FluxAccumulators::default();
        let et = EvapotranspirationRates::default();
        transport.update(&mut wet, &mut properties, &mut fluxes, &et, &water, false);
        assert_eq!(fluxes.current_irrigation, 0.0);

        let mut dry = MoistureState::uniform(0.05);
        transport.update(&mut dry, &mut properties, &mut fluxes, &et, &water, false);
        assert_eq!(fluxes.current_irrigation, 0.001);
    }

    #[test]
    fn test_warmup_does_not_accumulate() {
        let mut transport = transport(RedistributionMethod::Diffusion, 0.15);
        let material = MaterialParameters::default();
        let mut moisture = MoistureState::uniform(0.1);
        let mut properties = material.initial_thermal_properties();
        let mut fluxes = FluxAccumulators::default();

        transport.update(
            &mut moisture,
            &mut properties,
            &mut fluxes,
            &EvapotranspirationRates::default(),
            &WaterInputs::rain(0.001),
            true,
        );

        assert_eq!(fluxes.current_precipitation, 0.001);
        assert_eq!(fluxes.cumulative_precipitation, 0.0);
    }

    #[test]
    fn test_evapotranspiration_limited_to_available_water() {
        let mut transport = transport(RedistributionMethod::Diffusion, 0.15);
        let material = MaterialParameters::default();
        let mut moisture = MoistureState::uniform(0.02);
        let mut properties = material.initial_thermal_properties();
        let mut fluxes = FluxAccumulators::default();
        let layers = *transport.layers();
        let before = layers.water_depth(&moisture);

        // Far more than the soil holds
        let et = EvapotranspirationRates {
            vegetation: 1e-5,
            soil: 1e-5,
        };
        transport.update(
            &mut moisture,
            &mut properties,
            &mut fluxes,
            &et,
            &WaterInputs::dry(),
            false,
        );

        assert!(moisture.top >= layers.floor());
        assert!(moisture.root >= layers.floor());
        let after = layers.water_depth(&moisture);
        assert!((before - after - fluxes.current_evapotranspiration).abs() < 1e-12);
    }
}
