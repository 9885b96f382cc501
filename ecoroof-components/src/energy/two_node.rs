//! Two-Node Energy Balance
//!
//! A linearised leaf/ground balance after the FASST vegetation model
//! (Frankenstein and Koenig, 2004), with canopy air properties from Deardorff
//! (1978).
//!
//! # What This Component Does
//!
//! 1. Evaluates canopy air temperature and humidity, transfer coefficients,
//!    stomatal resistance and latent heats at the previous leaf and ground
//!    temperatures
//! 2. Linearises the leaf and ground balances around the current estimate:
//!
//!    $$P_1 + P_3 T_f + P_2 T_g = 0$$
//!
//!    $$T_{1G} + T_{3G} T_f + T_{2G} T_g = 0$$
//!
//! 3. Solves the 2x2 system a fixed number of times, blending each new
//!    estimate with the previous one
//! 4. Returns the ground temperature as the exterior boundary temperature
//!
//! Only the first vegetated surface of a timestep is solved; the result is
//! shared by every other surface of the same construction.
//!
//! Evapotranspiration rates come from the Deardorff latent fluxes at the
//! previous temperatures, not the newly solved ones.

use ecoroof_core::constants::{GRAVITY, KELVIN, STEFAN_BOLTZMANN, WATER_DENSITY};
use ecoroof_core::errors::{EcoRoofError, EcoRoofResult};
use ecoroof_core::material::MaterialParameters;
use ecoroof_core::model::{
    EnergyBalanceModel, EnergyBalanceOutput, SurfaceContext, SurfaceFluxReport,
};
use ecoroof_core::psychrometrics::{air_density, garratt};
use ecoroof_core::state::{EvapotranspirationRates, SurfaceThermalState};
use ecoroof_core::utils::linear_algebra::{relax, solve_2x2};
use ecoroof_core::variable::ReportVariableDefinition;
use ecoroof_core::FloatValue;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::outputs::energy_definitions;
use crate::parameters::TwoNodeParameters;

/// Specific heat of canopy air used by the FASST transfer terms (J/kg/K).
const CP_CANOPY_AIR: FloatValue = 1005.6;

/// Every term of the linearised balances that does not depend on the current
/// temperature estimate.
#[derive(Debug, Clone)]
pub struct ExchangeTerms {
    /// Fractional vegetation cover.
    pub cover: FloatValue,
    /// Outdoor air (K).
    pub air_temperature: FloatValue,
    pub shortwave: FloatValue,
    /// Incoming longwave from sky and ground (W/m^2).
    pub incoming_longwave: FloatValue,

    pub leaf_albedo: FloatValue,
    pub leaf_emissivity: FloatValue,
    pub ground_albedo: FloatValue,
    pub ground_emissivity: FloatValue,

    /// Foliage and ground sensible coefficients (W/m^2/K).
    pub foliage_sensible_coefficient: FloatValue,
    pub ground_sensible_coefficient: FloatValue,
    /// Sensible flux to the foliage and to the ground (W/m^2).
    pub foliage_sensible: FloatValue,
    pub ground_sensible: FloatValue,

    /// Mixing ratios (kg/kg) and their temperature slopes.
    pub air_mixing_ratio: FloatValue,
    pub foliage_saturation: FloatValue,
    pub foliage_saturation_slope: FloatValue,
    pub ground_saturation: FloatValue,
    pub ground_saturation_slope: FloatValue,

    /// Foliage surface wetness, $r_a / (r_a + r_s)$.
    pub wetness: FloatValue,
    /// Near-surface moisture ratio.
    pub ground_moisture: FloatValue,
    /// Denominator of the canopy air humidity.
    pub humidity_denominator: FloatValue,
    /// Latent transfer scale of the foliage (W/m^2 per kg/kg).
    pub foliage_latent_scale: FloatValue,
    /// Latent transfer scale of the ground (W/m^2 per kg/kg).
    pub ground_latent_scale: FloatValue,

    /// Latent flux to the foliage and to the ground (W/m^2).
    pub foliage_latent: FloatValue,
    pub ground_latent: FloatValue,
    pub foliage_latent_heat: FloatValue,
    pub ground_latent_heat: FloatValue,

    pub conduction_part1: FloatValue,
    pub conduction_part2: FloatValue,
}

impl ExchangeTerms {
    /// Evaluate the terms at the previous leaf and ground temperatures in `state`.
    pub fn new(
        context: &SurfaceContext,
        parameters: &TwoNodeParameters,
        state: &SurfaceThermalState,
    ) -> Self {
        let weather = context.weather;
        let surface = context.surface;
        let material = context.material;
        let lai = material.leaf_area_index;

        let sigma = TwoNodeParameters::vegetation_cover(lai);
        let wind = weather.wind_speed.max(parameters.min_wind_speed);
        let incoming_longwave = STEFAN_BOLTZMANN
            * (surface.view_factor_ground * weather.ground_kelvin().powi(4)
                + surface.view_factor_sky * weather.sky_kelvin().powi(4));
        let shortwave = weather.incident_shortwave(surface.anisotropic_sky_multiplier);

        let ta = weather.outdoor_dry_bulb;
        let tak = ta + KELVIN;
        let tf = state.previous_leaf;
        let tg = state.previous_ground;
        let tgk = tg + KELVIN;
        let pressure = weather.barometric_pressure;

        let vapor_pressure = weather.relative_humidity / 100.0 * garratt::saturation_vapor_pressure(ta);
        let qa = garratt::mixing_ratio(vapor_pressure, pressure);
        let rho_a = air_density(pressure, tak);

        // Canopy air
        let tafk = (1.0 - sigma) * tak + sigma * (0.3 * tak + 0.6 * (tf + KELVIN) + 0.1 * tgk);
        let taf = tafk - KELVIN;
        let rho_af = 0.5 * (rho_a + air_density(pressure, tafk));

        let za = parameters.reference_height;
        let kv = parameters.von_karman;
        let zd = TwoNodeParameters::displacement_height(material.plant_height);
        let zo = TwoNodeParameters::foliage_roughness(material.plant_height);
        let foliage_neutral = (kv / ((za - zd) / zo).ln()).powi(2);
        let canopy_wind = 0.83 * foliage_neutral.sqrt() * sigma * wind + (1.0 - sigma) * wind;
        let cf = 0.01 * (1.0 + 0.3 / canopy_wind);

        let sheatf =
            parameters.windless_exchange + 1.1 * lai * rho_af * CP_CANOPY_AIR * cf * canopy_wind;

        let qsf = garratt::mixing_ratio(garratt::saturation_vapor_pressure(tf), pressure);
        let dqf = garratt::mixing_ratio_slope(tf, pressure);
        let lef = garratt::latent_heat(tf, tf);

        // Stomatal resistance from shortwave and root-zone moisture
        let aerodynamic = 1.0 / (cf * canopy_wind);
        let radiation_factor =
            1.0 / ((0.004 * shortwave + 0.005) / (0.81 * (0.004 * shortwave + 1.0))).min(1.0);
        let moisture_range = material.saturation_moisture - material.residual_moisture;
        let moisture_factor = if moisture_range == 0.0 {
            1e-10
        } else {
            moisture_range / (context.moisture.root - material.residual_moisture)
        };
        let stomatal =
            material.min_stomatal_resistance * radiation_factor * moisture_factor / lai;
        let wetness = aerodynamic / (aerodynamic + stomatal);

        let mg = context.moisture.top / material.saturation_moisture;
        let humidity_denominator = 1.0 - sigma * (0.6 * (1.0 - wetness) + 0.1 * (1.0 - mg));

        let qsg = garratt::mixing_ratio(garratt::saturation_vapor_pressure(tg), pressure);
        let dqg = garratt::mixing_ratio_slope(tg, pressure);
        let leg = garratt::latent_heat(tg, tg);

        // Ground exchange with stability correction
        let rho_ag = 0.5 * (rho_a + air_density(pressure, tgk));
        let richardson =
            2.0 * GRAVITY * za * (taf - tg) / ((tafk + tgk) * canopy_wind * canopy_wind);
        let stability = if richardson < 0.0 {
            (1.0 - 16.0 * richardson).powf(-0.5)
        } else {
            (1.0 - 5.0 * richardson.min(0.19)).powf(-0.5)
        };
        let ground_neutral = (kv / (za / material.roughness.roughness_length()).ln()).powi(2);
        let heat_transfer = stability
            * ((1.0 - sigma) * ground_neutral / parameters.turbulent_schmidt
                + sigma * foliage_neutral);
        let vapor_transfer = stability
            * ((1.0 - sigma) * ground_neutral / parameters.turbulent_prandtl
                + sigma * foliage_neutral);
        let sheatg =
            parameters.windless_exchange + rho_ag * CP_CANOPY_AIR * heat_transfer * canopy_wind;

        let qaf = ((1.0 - sigma) * qa + sigma * (0.3 * qa + 0.6 * qsf * wetness + 0.1 * qsg * mg))
            / humidity_denominator;
        let qg = mg * qsg + (1.0 - mg) * qaf;

        let foliage_latent_scale = lai * rho_af * cf * lef * canopy_wind * wetness;
        let ground_latent_scale = rho_ag * vapor_transfer * leg * canopy_wind * mg;

        Self {
            cover: sigma,
            air_temperature: tak,
            shortwave,
            incoming_longwave,
            leaf_albedo: material.leaf_reflectivity,
            leaf_emissivity: material.leaf_emissivity,
            ground_albedo: context.properties.albedo,
            ground_emissivity: material.thermal_absorptance,
            foliage_sensible_coefficient: sheatf,
            ground_sensible_coefficient: sheatg,
            foliage_sensible: sheatf * (taf - tf),
            ground_sensible: sheatg * (taf - tg),
            air_mixing_ratio: qa,
            foliage_saturation: qsf,
            foliage_saturation_slope: dqf,
            ground_saturation: qsg,
            ground_saturation_slope: dqg,
            wetness,
            ground_moisture: mg,
            humidity_denominator,
            foliage_latent_scale,
            ground_latent_scale,
            foliage_latent: foliage_latent_scale * (qaf - qsf),
            ground_latent: ground_latent_scale * (qaf - qg),
            foliage_latent_heat: lef,
            ground_latent_heat: leg,
            conduction_part1: context.conduction.part1,
            conduction_part2: context.conduction.part2,
        }
    }

    fn exchange_emissivity(&self) -> FloatValue {
        self.leaf_emissivity + self.ground_emissivity
            - self.leaf_emissivity * self.ground_emissivity
    }

    /// Coefficient matrix and right-hand side of the linearised balances at
    /// leaf temperature `leaf` and ground temperature `ground` (K).
    pub fn linear_system(
        &self,
        leaf: FloatValue,
        ground: FloatValue,
    ) -> ([[FloatValue; 2]; 2], [FloatValue; 2]) {
        let sb = STEFAN_BOLTZMANN;
        let sigma = self.cover;
        let ef = self.leaf_emissivity;
        let eg = self.ground_emissivity;
        let e1 = self.exchange_emissivity();
        let d_one = self.humidity_denominator;
        let rn = self.wetness;
        let mg = self.ground_moisture;
        let qa = self.air_mixing_ratio;
        let (qsf, dqf) = (self.foliage_saturation, self.foliage_saturation_slope);
        let (qsg, dqg) = (self.ground_saturation, self.ground_saturation_slope);
        let sheatf = self.foliage_sensible_coefficient;
        let sheatg = self.ground_sensible_coefficient;
        let a = self.foliage_latent_scale;
        let b = self.ground_latent_scale;
        let tak = self.air_temperature;

        let foliage_linearised = qsf - leaf * dqf;
        let ground_linearised = qsg - ground * dqg;
        let cross = sigma * ef * eg * sb / e1;
        let leaf_emission = -sigma * ef * sb - cross;
        let ground_emission = -(1.0 - sigma) * eg * sb - cross;

        let p1 = sigma * (self.shortwave * (1.0 - self.leaf_albedo) + ef * self.incoming_longwave)
            - 3.0 * cross * ground.powi(4)
            - 3.0 * leaf_emission * leaf.powi(4)
            + sheatf * (1.0 - 0.7 * sigma) * tak
            + a * (1.0 - 0.7 * sigma) / d_one * qa
            + a * (0.6 * sigma * rn / d_one - 1.0) * foliage_linearised
            + a * (0.1 * sigma * mg / d_one) * ground_linearised;
        let p2 = 4.0 * cross * ground.powi(3)
            + 0.1 * sigma * sheatf
            + a * (0.1 * sigma * mg) / d_one * dqg;
        let p3 = 4.0 * leaf_emission * leaf.powi(3)
            + (0.6 * sigma - 1.0) * sheatf
            + a * (0.6 * sigma * rn / d_one - 1.0) * dqf;

        let t1 = (1.0 - sigma)
            * (self.shortwave * (1.0 - self.ground_albedo) + eg * self.incoming_longwave)
            - 3.0 * cross * leaf.powi(4)
            - 3.0 * ground_emission * ground.powi(4)
            + sheatg * (1.0 - 0.7 * sigma) * tak
            + b * (1.0 - 0.7 * sigma) / d_one * qa
            + b * (0.1 * sigma * mg / d_one - mg) * ground_linearised
            + b * (0.6 * sigma * rn / d_one) * foliage_linearised
            + self.conduction_part1
            + self.conduction_part2 * KELVIN;
        let t2 = 4.0 * ground_emission * ground.powi(3)
            + (0.1 * sigma - 1.0) * sheatg
            + b * (0.1 * sigma * mg / d_one - mg) * dqg
            - self.conduction_part2;
        let t3 = 4.0 * cross * leaf.powi(3)
            + 0.6 * sigma * sheatg
            + b * (0.6 * sigma * rn / d_one) * dqf;

        ([[p3, p2], [t3, t2]], [-p1, -t1])
    }

    /// One relaxed update of the (leaf, ground) estimate (K).
    pub fn step(
        &self,
        leaf: FloatValue,
        ground: FloatValue,
        relaxation: FloatValue,
    ) -> EcoRoofResult<(FloatValue, FloatValue)> {
        let (matrix, rhs) = self.linear_system(leaf, ground);
        let [new_leaf, new_ground] = solve_2x2(matrix, rhs).ok_or_else(|| {
            EcoRoofError::Error(format!(
                "Singular leaf/ground system at T_f={:.3} K, T_g={:.3} K",
                leaf, ground
            ))
        })?;
        Ok((
            relax(leaf, new_leaf, relaxation),
            relax(ground, new_ground, relaxation),
        ))
    }
}

/// Linearised leaf/ground energy balance.
///
/// # Parameters
///
/// See [`TwoNodeParameters`] for configuration options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwoNode {
    #[serde(default)]
    parameters: TwoNodeParameters,
}

impl TwoNode {
    /// Create a new two-node model with default parameters.
    pub fn new() -> Self {
        Self::from_parameters(TwoNodeParameters::default())
    }

    pub fn from_parameters(parameters: TwoNodeParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &TwoNodeParameters {
        &self.parameters
    }
}

#[typetag::serde(name = "two_node")]
impl EnergyBalanceModel for TwoNode {
    fn definitions(&self) -> Vec<&'static ReportVariableDefinition> {
        energy_definitions(false)
    }

    fn validate(&self, material: &MaterialParameters) -> EcoRoofResult<()> {
        let params = &self.parameters;
        let za = params.reference_height;
        let zd = TwoNodeParameters::displacement_height(material.plant_height);
        let zo = TwoNodeParameters::foliage_roughness(material.plant_height);
        if za <= zd || (za - zd) / zo <= 1.0 {
            return Err(EcoRoofError::invalid_parameter(
                "reference_height",
                format!(
                    "{} m is too close to the canopy (displacement height {:.3} m, roughness {:.3} m)",
                    za, zd, zo
                ),
            ));
        }
        if params.iterations == 0 {
            return Err(EcoRoofError::invalid_parameter(
                "iterations",
                "at least one pass is needed",
            ));
        }
        if !(params.relaxation > 0.0 && params.relaxation <= 1.0) {
            return Err(EcoRoofError::invalid_parameter(
                "relaxation",
                "must lie in (0, 1]",
            ));
        }
        Ok(())
    }

    fn solves_every_surface(&self) -> bool {
        false
    }

    fn solve(
        &self,
        context: &SurfaceContext,
        state: &mut SurfaceThermalState,
    ) -> EcoRoofResult<EnergyBalanceOutput> {
        let terms = ExchangeTerms::new(context, &self.parameters, state);

        let mut leaf = state.previous_leaf + KELVIN;
        let mut ground = state.previous_ground + KELVIN;
        for _ in 0..self.parameters.iterations {
            (leaf, ground) = terms.step(leaf, ground, self.parameters.relaxation)?;
        }
        debug!(
            "Two-node solve: leaf {:.3} K, ground {:.3} K",
            leaf, ground
        );

        let soil_conduction = -(terms.conduction_part1 - terms.conduction_part2 * (ground - KELVIN));

        state.previous_leaf = leaf - KELVIN;
        state.previous_ground = ground - KELVIN;
        state.leaf = leaf;
        state.soil = ground;
        state.bare_soil = ground;
        state.soil_average = ground;

        let vegetation = -terms.foliage_latent / terms.foliage_latent_heat / WATER_DENSITY;
        let soil = -terms.ground_latent / terms.ground_latent_heat / WATER_DENSITY;

        Ok(EnergyBalanceOutput {
            exterior_temperature: ground - KELVIN,
            evapotranspiration: EvapotranspirationRates {
                vegetation: vegetation.max(0.0),
                soil: soil.max(0.0),
            },
            report: SurfaceFluxReport {
                soil_temperature: ground - KELVIN,
                vegetation_temperature: leaf - KELVIN,
                soil_sensible: -terms.ground_sensible,
                vegetation_sensible: -terms.foliage_sensible,
                soil_latent: -terms.ground_latent,
                vegetation_latent: -terms.foliage_latent,
                soil_net_shortwave: 0.0,
                soil_net_longwave: 0.0,
                soil_conduction,
            },
        })
    }
}
