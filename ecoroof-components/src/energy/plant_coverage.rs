//! Plant Coverage Energy Balance
//!
//! Resolves three surface nodes separately: the leaf canopy, the soil beneath
//! it, and the bare soil between plants. Each node balance is nonlinear in its
//! own temperature and is solved by Newton-Raphson with a bisection fallback.
//!
//! # What This Component Does
//!
//! 1. Computes the per-timestep driving terms: incident shortwave, canopy
//!    transmittances, soil albedo from surface moisture, stomatal stress
//!    factors, and the canopy air space convection coefficient
//! 2. Solves the leaf balance (skipped without plants)
//! 3. Solves the soil-under-canopy balance at the new leaf temperature
//!    (skipped without plants)
//! 4. Solves the bare soil balance (skipped at full coverage)
//! 5. Returns the coverage-weighted soil temperature as the exterior boundary
//!    temperature, plus evapotranspiration rates for the next moisture update
//!
//! # Leaf Balance
//!
//! $$F_p = Q_{sw,p} + Q_{ir,sky,p} + Q_{ir,exch,p} - Q_{conv,p} - Q_{ET,p}$$
//!
//! with transpiration through the stomatal and aerodynamic resistances in
//! series:
//!
//! $$Q_{ET,p} = \frac{LAI \rho c_p}{\gamma} \frac{e_s(T_p) - e_{air}}{r_s + r_a}$$
//!
//! $$r_s = \frac{r_{min}}{LAI} f_{solar} f_{hum} f_{vwc} f_{temp}$$
//!
//! # Soil Balances
//!
//! Under the canopy the soil sees transmitted shortwave, longwave exchange with
//! both sky and leaves, convection through the parallel combination of the
//! canopy air space and the canopy, evaporation through the substrate
//! resistance, and conduction into the construction. Bare soil drops the
//! canopy terms.
//!
//! Conduction into the roof is linear in the coverage-weighted soil
//! temperature:
//!
//! $$Q_{cond} = -q_1 + q_2 \left(\sigma T_s + (1 - \sigma) T_b\right)$$

use ecoroof_core::constants::{
    CP_AIR, KELVIN, K_AIR, LEWIS_NUMBER, STEFAN_BOLTZMANN, WATER_DENSITY,
};
use ecoroof_core::convection::{bare_soil_coefficient, canopy_coefficient, RoofGeometry, H_MIN};
use ecoroof_core::environment::SoilHeatFlux;
use ecoroof_core::errors::{EcoRoofError, EcoRoofResult};
use ecoroof_core::material::MaterialParameters;
use ecoroof_core::model::{
    EnergyBalanceModel, EnergyBalanceOutput, SurfaceContext, SurfaceFluxReport,
};
use ecoroof_core::psychrometrics::{
    air_density, air_vapor_pressure, humidity_stress, latent_heat_vaporization,
    latent_heat_with_frost, psychrometric_constant, saturation_vapor_pressure,
    saturation_vapor_pressure_slope, solar_stress, temperature_stress, temperature_stress_slope,
    LATENT_HEAT_SLOPE,
};
use ecoroof_core::solver::{solve, ResidualFunction};
use ecoroof_core::state::{EvapotranspirationRates, SurfaceThermalState};
use ecoroof_core::variable::ReportVariableDefinition;
use ecoroof_core::FloatValue;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::outputs::energy_definitions;
use crate::parameters::PlantCoverageParameters;

/// Soil albedo fit against the near-surface moisture ratio.
fn moist_soil_albedo(moisture_ratio: FloatValue) -> FloatValue {
    0.2171 * moisture_ratio * moisture_ratio - 0.4336 * moisture_ratio + 0.3143
}

/// Stomatal resistance multiplier for near-surface moisture.
fn moisture_stress(
    parameters: &PlantCoverageParameters,
    material: &MaterialParameters,
    moisture: FloatValue,
) -> FloatValue {
    let wilting_point = material.residual_moisture;
    let onset = parameters.stress_onset_fraction * material.field_capacity;

    if moisture > onset {
        return 1.0;
    }
    let stress = (1.0 / ((moisture - wilting_point) / (onset - wilting_point))).max(0.0);
    if moisture < wilting_point || !stress.is_finite() {
        parameters.wilting_stress
    } else {
        stress
    }
}

/// Per-timestep quantities shared by the three node balances.
#[derive(Debug, Clone)]
pub struct CanopyEnvironment {
    pub geometry: RoofGeometry,
    /// Outdoor air (K).
    pub air_temperature: FloatValue,
    pub wind_speed: FloatValue,
    /// Pa
    pub pressure: FloatValue,
    /// kPa
    pub vapor_pressure_air: FloatValue,
    /// kg/m^3
    pub air_density: FloatValue,
    /// $F_{sky} T_{sky}^4$ (K^4).
    pub sky_radiance: FloatValue,
    /// Incident shortwave (W/m^2).
    pub shortwave: FloatValue,

    /// Fraction of the roof covered by plants.
    pub coverage: FloatValue,
    pub leaf_area_index: FloatValue,
    pub leaf_albedo: FloatValue,
    pub leaf_emissivity: FloatValue,
    pub soil_emissivity: FloatValue,
    pub soil_albedo: FloatValue,
    pub shortwave_transmittance: FloatValue,
    pub longwave_transmittance: FloatValue,

    pub min_stomatal_resistance: FloatValue,
    pub solar_stress: FloatValue,
    pub moisture_stress: FloatValue,
    /// Evaporation resistance of the substrate surface (s/m).
    pub substrate_resistance: FloatValue,
    /// Convection coefficient of the canopy air space (W/m^2/K).
    pub porous_coefficient: FloatValue,

    pub conduction: SoilHeatFlux,
}

impl CanopyEnvironment {
    pub fn new(context: &SurfaceContext, parameters: &PlantCoverageParameters) -> Self {
        let material = context.material;
        let weather = context.weather;
        let surface = context.surface;

        let air_temperature = weather.outdoor_kelvin();
        let pressure = weather.barometric_pressure;
        let density = air_density(pressure, air_temperature);
        let geometry = surface.geometry();
        let lai = material.leaf_area_index;

        let surface_moisture_ratio = context.moisture.top / material.saturation_moisture;

        // Canopy air space as a porous medium
        let k_por = parameters.porous_conductivity(K_AIR);
        let diffusivity = k_por / (density * CP_AIR);
        let length = geometry.length();
        let peclet = 0.3 * weather.wind_speed * length / diffusivity;
        let porous_coefficient = (1.128 * peclet.sqrt() * k_por / length).max(H_MIN);

        let shortwave = weather.incident_shortwave(surface.anisotropic_sky_multiplier);

        Self {
            geometry,
            air_temperature,
            wind_speed: weather.wind_speed,
            pressure,
            vapor_pressure_air: air_vapor_pressure(weather.relative_humidity, air_temperature),
            air_density: density,
            sky_radiance: surface.view_factor_sky * weather.sky_kelvin().powi(4),
            shortwave,
            coverage: material.plant_coverage,
            leaf_area_index: lai,
            leaf_albedo: material.leaf_reflectivity,
            leaf_emissivity: material.leaf_emissivity,
            soil_emissivity: material.thermal_absorptance,
            soil_albedo: moist_soil_albedo(surface_moisture_ratio),
            shortwave_transmittance: (-material.shortwave_extinction * lai).exp(),
            longwave_transmittance: (-material.longwave_extinction * lai).exp(),
            min_stomatal_resistance: material.min_stomatal_resistance,
            solar_stress: solar_stress(shortwave),
            moisture_stress: moisture_stress(parameters, material, context.moisture.top),
            substrate_resistance: parameters.substrate_resistance_coefficient
                * surface_moisture_ratio.powf(parameters.substrate_resistance_exponent),
            porous_coefficient,
            conduction: context.conduction,
        }
    }

    /// $\epsilon_p + \epsilon_g - \epsilon_p \epsilon_g$
    fn exchange_emissivity(&self) -> FloatValue {
        self.leaf_emissivity + self.soil_emissivity - self.leaf_emissivity * self.soil_emissivity
    }

    /// Longwave exchanged between canopy and soil, positive into `receiver`.
    fn leaf_soil_exchange(&self, receiver: FloatValue, emitter: FloatValue) -> FloatValue {
        (1.0 - self.longwave_transmittance)
            * STEFAN_BOLTZMANN
            * self.leaf_emissivity
            * self.soil_emissivity
            * (emitter.powi(4) - receiver.powi(4))
            / self.exchange_emissivity()
    }

    /// Derivative of the canopy/soil exchange with respect to either node's
    /// own temperature, evaluated at `temperature`.
    fn leaf_soil_exchange_slope(&self, temperature: FloatValue) -> FloatValue {
        -4.0 * (1.0 - self.longwave_transmittance)
            * STEFAN_BOLTZMANN
            * self.leaf_emissivity
            * self.soil_emissivity
            * temperature.powi(3)
            / self.exchange_emissivity()
    }

    /// Net sky longwave on a soil surface, before canopy attenuation.
    fn soil_sky_longwave(&self, temperature: FloatValue) -> FloatValue {
        let eps = self.soil_emissivity;
        eps * STEFAN_BOLTZMANN
            * (self.sky_radiance - temperature.powi(4) - (1.0 - eps) * self.sky_radiance)
    }

    /// Aerodynamic resistance (s/m) for a convection coefficient.
    fn aerodynamic_resistance(&self, coefficient: FloatValue) -> FloatValue {
        self.air_density * CP_AIR * LEWIS_NUMBER.powf(2.0 / 3.0) / coefficient
    }

    /// Evaporation from a soil surface at `temperature` through `resistance` (W/m^2).
    fn latent(&self, temperature: FloatValue, resistance: FloatValue) -> FloatValue {
        let gamma = psychrometric_constant(temperature, self.pressure);
        self.air_density * CP_AIR / gamma
            * (saturation_vapor_pressure(temperature) - self.vapor_pressure_air)
            / resistance
    }

    fn latent_slope(&self, temperature: FloatValue, resistance: FloatValue) -> FloatValue {
        let deficit = saturation_vapor_pressure(temperature) - self.vapor_pressure_air;
        self.air_density * 0.622 / (resistance * self.pressure / 1000.0)
            * (latent_heat_vaporization(temperature) * saturation_vapor_pressure_slope(temperature)
                + LATENT_HEAT_SLOPE * deficit)
    }

    /// Conduction into the construction for the two soil node temperatures (K).
    fn conduction(&self, soil: FloatValue, bare_soil: FloatValue) -> FloatValue {
        let sigma = self.coverage;
        self.conduction
            .into_construction(sigma * (soil - KELVIN) + (1.0 - sigma) * (bare_soil - KELVIN))
    }
}

/// Fluxes at a soil node (W/m^2). Sensible and latent are positive away from
/// the surface; radiation is positive into it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeFluxes {
    pub sensible: FloatValue,
    pub latent: FloatValue,
    pub shortwave: FloatValue,
    pub longwave: FloatValue,
    pub conduction: FloatValue,
}

impl NodeFluxes {
    /// Energy left over at the node; zero when balanced.
    pub fn imbalance(&self) -> FloatValue {
        self.shortwave + self.longwave - self.sensible - self.latent - self.conduction
    }
}

/// Leaf canopy balance, holding the soil under it fixed.
#[derive(Debug, Clone, Copy)]
pub struct LeafBalance<'a> {
    environment: &'a CanopyEnvironment,
    soil_temperature: FloatValue,
}

impl<'a> LeafBalance<'a> {
    pub fn new(environment: &'a CanopyEnvironment, soil_temperature: FloatValue) -> Self {
        Self {
            environment,
            soil_temperature,
        }
    }

    fn convection_coefficient(&self, temperature: FloatValue) -> FloatValue {
        let env = self.environment;
        canopy_coefficient(
            &env.geometry,
            env.air_temperature,
            temperature,
            env.wind_speed,
            K_AIR,
        )
    }

    /// Shortwave absorbed by the canopy, including reflection off the soil.
    pub fn absorbed_shortwave(&self) -> FloatValue {
        let env = self.environment;
        let tau = env.shortwave_transmittance;
        (1.0 - env.leaf_albedo - tau) * (1.0 + tau * env.soil_albedo) * env.shortwave
    }

    pub fn sky_longwave(&self, temperature: FloatValue) -> FloatValue {
        let env = self.environment;
        let eps = env.leaf_emissivity;
        (1.0 - env.longwave_transmittance)
            * eps
            * STEFAN_BOLTZMANN
            * (env.sky_radiance - temperature.powi(4) - (1.0 - eps) * env.sky_radiance)
    }

    pub fn soil_longwave(&self, temperature: FloatValue) -> FloatValue {
        self.environment
            .leaf_soil_exchange(temperature, self.soil_temperature)
    }

    pub fn sensible(&self, temperature: FloatValue) -> FloatValue {
        let env = self.environment;
        env.leaf_area_index
            * self.convection_coefficient(temperature)
            * (temperature - env.air_temperature)
    }

    /// $LAI \rho c_p / \gamma$, with $\gamma$ at the soil temperature.
    fn transpiration_scale(&self) -> FloatValue {
        let env = self.environment;
        env.leaf_area_index * env.air_density * CP_AIR
            / psychrometric_constant(self.soil_temperature, env.pressure)
    }

    /// Stomatal resistance less its temperature factor (s/m).
    fn base_stomatal_resistance(&self, temperature: FloatValue) -> FloatValue {
        let env = self.environment;
        env.min_stomatal_resistance / env.leaf_area_index
            * env.solar_stress
            * humidity_stress(temperature, env.vapor_pressure_air)
            * env.moisture_stress
    }

    pub fn stomatal_resistance(&self, temperature: FloatValue) -> FloatValue {
        self.base_stomatal_resistance(temperature) * temperature_stress(temperature)
    }

    pub fn transpiration(&self, temperature: FloatValue) -> FloatValue {
        let env = self.environment;
        let resistance = self.stomatal_resistance(temperature)
            + env.aerodynamic_resistance(self.convection_coefficient(temperature));
        self.transpiration_scale()
            * (saturation_vapor_pressure(temperature) - env.vapor_pressure_air)
            / resistance
    }
}

impl ResidualFunction for LeafBalance<'_> {
    fn residual(&self, temperature: FloatValue) -> FloatValue {
        self.absorbed_shortwave() + self.sky_longwave(temperature) + self.soil_longwave(temperature)
            - self.sensible(temperature)
            - self.transpiration(temperature)
    }

    /// Convection coefficient and humidity stress are held constant.
    fn derivative(&self, temperature: FloatValue) -> FloatValue {
        let env = self.environment;
        let h = self.convection_coefficient(temperature);

        let sky = -4.0
            * (1.0 - env.longwave_transmittance)
            * env.leaf_emissivity
            * STEFAN_BOLTZMANN
            * temperature.powi(3);
        let exchange = env.leaf_soil_exchange_slope(temperature);

        let resistance =
            self.stomatal_resistance(temperature) + env.aerodynamic_resistance(h);
        let resistance_slope =
            self.base_stomatal_resistance(temperature) * temperature_stress_slope(temperature);
        let deficit = saturation_vapor_pressure(temperature) - env.vapor_pressure_air;
        let transpiration = self.transpiration_scale()
            * (saturation_vapor_pressure_slope(temperature) * resistance
                - deficit * resistance_slope)
            / (resistance * resistance);

        sky + exchange - env.leaf_area_index * h - transpiration
    }
}

/// Soil under the canopy, holding the leaf and bare soil fixed.
#[derive(Debug, Clone, Copy)]
pub struct CoveredSoilBalance<'a> {
    environment: &'a CanopyEnvironment,
    leaf_temperature: FloatValue,
    bare_soil_temperature: FloatValue,
    /// Canopy air space and canopy in parallel (W/m^2/K).
    convection_coefficient: FloatValue,
    aerodynamic_resistance: FloatValue,
}

impl<'a> CoveredSoilBalance<'a> {
    pub fn new(
        environment: &'a CanopyEnvironment,
        leaf_temperature: FloatValue,
        bare_soil_temperature: FloatValue,
    ) -> Self {
        let env = environment;
        let h_canopy = canopy_coefficient(
            &env.geometry,
            env.air_temperature,
            leaf_temperature,
            env.wind_speed,
            K_AIR,
        );
        let h_por = env.porous_coefficient;
        Self {
            environment,
            leaf_temperature,
            bare_soil_temperature,
            convection_coefficient: h_por * h_canopy / (h_por + h_canopy),
            aerodynamic_resistance: env.air_density
                * CP_AIR
                * LEWIS_NUMBER.powf(2.0 / 3.0)
                * (1.0 / h_por + 1.0 / h_canopy),
        }
    }

    fn resistance(&self) -> FloatValue {
        self.environment.substrate_resistance + self.aerodynamic_resistance
    }

    pub fn fluxes(&self, temperature: FloatValue) -> NodeFluxes {
        let env = self.environment;
        let tau_lw = env.longwave_transmittance;
        NodeFluxes {
            sensible: self.convection_coefficient * (temperature - env.air_temperature),
            latent: env.latent(temperature, self.resistance()).max(0.0),
            shortwave: env.shortwave_transmittance * (1.0 - env.soil_albedo) * env.shortwave,
            longwave: tau_lw * env.soil_sky_longwave(temperature)
                + env.leaf_soil_exchange(temperature, self.leaf_temperature),
            conduction: env.conduction(temperature, self.bare_soil_temperature),
        }
    }
}

impl ResidualFunction for CoveredSoilBalance<'_> {
    fn residual(&self, temperature: FloatValue) -> FloatValue {
        self.fluxes(temperature).imbalance()
    }

    fn derivative(&self, temperature: FloatValue) -> FloatValue {
        let env = self.environment;
        let resistance = self.resistance();
        let latent = if env.latent(temperature, resistance) > 0.0 {
            env.latent_slope(temperature, resistance)
        } else {
            0.0
        };

        -4.0 * STEFAN_BOLTZMANN
            * temperature.powi(3)
            * env.soil_emissivity
            * env.longwave_transmittance
            + env.leaf_soil_exchange_slope(temperature)
            - self.convection_coefficient
            - latent
            - env.conduction.part2 * env.coverage
    }
}

/// Bare soil between plants, holding the covered soil fixed.
#[derive(Debug, Clone, Copy)]
pub struct BareSoilBalance<'a> {
    environment: &'a CanopyEnvironment,
    covered_soil_temperature: FloatValue,
}

impl<'a> BareSoilBalance<'a> {
    pub fn new(environment: &'a CanopyEnvironment, covered_soil_temperature: FloatValue) -> Self {
        Self {
            environment,
            covered_soil_temperature,
        }
    }

    fn convection_coefficient(&self, temperature: FloatValue) -> FloatValue {
        let env = self.environment;
        bare_soil_coefficient(
            &env.geometry,
            env.air_temperature,
            temperature,
            env.wind_speed,
            K_AIR,
        )
    }

    fn resistance(&self, coefficient: FloatValue) -> FloatValue {
        self.environment.substrate_resistance
            + self.environment.aerodynamic_resistance(coefficient)
    }

    pub fn fluxes(&self, temperature: FloatValue) -> NodeFluxes {
        let env = self.environment;
        let h = self.convection_coefficient(temperature);
        NodeFluxes {
            sensible: h * (temperature - env.air_temperature),
            latent: env.latent(temperature, self.resistance(h)),
            shortwave: (1.0 - env.soil_albedo) * env.shortwave,
            longwave: env.soil_sky_longwave(temperature),
            conduction: env.conduction(self.covered_soil_temperature, temperature),
        }
    }
}

impl ResidualFunction for BareSoilBalance<'_> {
    fn residual(&self, temperature: FloatValue) -> FloatValue {
        self.fluxes(temperature).imbalance()
    }

    /// Convection coefficient held constant.
    fn derivative(&self, temperature: FloatValue) -> FloatValue {
        let env = self.environment;
        let h = self.convection_coefficient(temperature);
        -4.0 * STEFAN_BOLTZMANN * temperature.powi(3) * env.soil_emissivity
            - h
            - env.latent_slope(temperature, self.resistance(h))
            - env.conduction.part2 * (1.0 - env.coverage)
    }
}

/// Per-node energy balance of a partially vegetated roof.
///
/// Stateless between calls: all node temperatures live in the
/// [`SurfaceThermalState`] owned by the caller.
///
/// # Parameters
///
/// See [`PlantCoverageParameters`] for configuration options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantCoverage {
    #[serde(default)]
    parameters: PlantCoverageParameters,
}

impl PlantCoverage {
    /// Create a new plant coverage model with default parameters.
    pub fn new() -> Self {
        Self::from_parameters(PlantCoverageParameters::default())
    }

    pub fn from_parameters(parameters: PlantCoverageParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &PlantCoverageParameters {
        &self.parameters
    }

    fn solve_node<F: ResidualFunction>(
        &self,
        node: &str,
        function: &F,
        initial: FloatValue,
    ) -> EcoRoofResult<FloatValue> {
        let solution = solve(function, initial, &self.parameters.solver)?;
        if solution.is_converged() {
            debug!(
                "{} temperature {:.3} K by {:?} after {} Newton and {} bisection iterations",
                node,
                solution.temperature,
                solution.method,
                solution.newton_iterations,
                solution.bisection_iterations
            );
        } else {
            warn!(
                "{} temperature did not converge after {} iterations (last step {:.2e} K), using {:.3} K",
                node, solution.newton_iterations, solution.final_step, solution.temperature
            );
        }
        Ok(solution.temperature)
    }
}

#[typetag::serde(name = "plant_coverage")]
impl EnergyBalanceModel for PlantCoverage {
    fn definitions(&self) -> Vec<&'static ReportVariableDefinition> {
        energy_definitions(true)
    }

    fn validate(&self, material: &MaterialParameters) -> EcoRoofResult<()> {
        let params = &self.parameters;
        if !(0.0..=1.0).contains(&params.canopy_porosity) {
            return Err(EcoRoofError::invalid_parameter(
                "canopy_porosity",
                "must lie between 0 and 1",
            ));
        }
        if params.stress_onset_fraction * material.field_capacity <= material.residual_moisture {
            return Err(EcoRoofError::invalid_parameter(
                "stress_onset_fraction",
                "moisture stress must start above the wilting point",
            ));
        }
        Ok(())
    }

    fn solve(
        &self,
        context: &SurfaceContext,
        state: &mut SurfaceThermalState,
    ) -> EcoRoofResult<EnergyBalanceOutput> {
        let env = CanopyEnvironment::new(context, &self.parameters);
        let sigma = env.coverage;

        let mut leaf = state.leaf;
        let mut soil = state.soil;
        let mut bare_soil = state.bare_soil;
        let mut transpiration = 0.0;
        let mut report = SurfaceFluxReport::default();
        let mut covered = NodeFluxes::default();
        let mut bare = NodeFluxes::default();

        if sigma != 0.0 {
            let leaf_balance = LeafBalance::new(&env, state.soil);
            leaf = self.solve_node("Leaf", &leaf_balance, state.leaf)?;
            transpiration = leaf_balance.transpiration(leaf);
            report.vegetation_temperature = leaf - KELVIN;
            report.vegetation_sensible = leaf_balance.sensible(leaf);
            report.vegetation_latent = transpiration;

            let soil_balance = CoveredSoilBalance::new(&env, leaf, state.bare_soil);
            soil = self.solve_node("Soil", &soil_balance, state.soil)?;
            covered = soil_balance.fluxes(soil);
        }

        if sigma != 1.0 {
            let bare_balance = BareSoilBalance::new(&env, soil);
            bare_soil = self.solve_node("Bare soil", &bare_balance, state.bare_soil)?;
            bare = bare_balance.fluxes(bare_soil);
        }

        let soil_average = sigma * soil + (1.0 - sigma) * bare_soil;
        let weighted = |under: FloatValue, open: FloatValue| sigma * under + (1.0 - sigma) * open;

        report.soil_temperature = soil_average - KELVIN;
        report.soil_sensible = weighted(covered.sensible, bare.sensible);
        report.soil_latent = weighted(covered.latent, bare.latent);
        report.soil_net_shortwave = weighted(covered.shortwave, bare.shortwave);
        report.soil_net_longwave = weighted(covered.longwave, bare.longwave);
        report.soil_conduction = env.conduction(soil, bare_soil);

        let vegetation = if sigma != 0.0 {
            transpiration / latent_heat_with_frost(leaf) / WATER_DENSITY
        } else {
            0.0
        };
        let evaporation = report.soil_latent / latent_heat_with_frost(soil_average) / WATER_DENSITY;

        state.leaf = leaf;
        state.soil = soil;
        state.bare_soil = bare_soil;
        state.soil_average = soil_average;

        Ok(EnergyBalanceOutput {
            exterior_temperature: soil_average - KELVIN,
            evapotranspiration: EvapotranspirationRates {
                vegetation: vegetation.max(0.0),
                soil: evaporation.max(0.0),
            },
            report,
        })
    }
}
