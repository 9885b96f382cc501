//! Conservation tests for the green roof components.
//!
//! These tests verify that the physical budgets close:
//! - Energy at each converged surface node
//! - Water mass across each moisture update

use approx::assert_relative_eq;
use ecoroof_components::energy::{BareSoilBalance, CanopyEnvironment, LeafBalance, PlantCoverage};
use ecoroof_components::moisture::MoistureTransport;
use ecoroof_components::parameters::{MoistureTransportParameters, RedistributionMethod};
use ecoroof_core::constants::{KELVIN, STEFAN_BOLTZMANN};
use ecoroof_core::environment::{
    DrivingConditions, IrrigationMode, RoofSurface, SoilHeatFlux, WaterInputs,
};
use ecoroof_core::material::MaterialParameters;
use ecoroof_core::model::{EnergyBalanceModel, SurfaceContext};
use ecoroof_core::solver::{solve, ResidualFunction, SolverSettings};
use ecoroof_core::state::{
    EvapotranspirationRates, FluxAccumulators, MoistureState, SurfaceThermalState,
};

fn summer_noon() -> DrivingConditions {
    DrivingConditions {
        outdoor_dry_bulb: 30.0,
        wind_speed: 3.0,
        relative_humidity: 45.0,
        beam_solar: 750.0,
        diffuse_solar: 130.0,
        sky_temperature: 15.0,
        ..DrivingConditions::default()
    }
}

fn context<'a>(
    surface: &'a RoofSurface,
    weather: &'a DrivingConditions,
    material: &'a MaterialParameters,
    moisture: MoistureState,
) -> SurfaceContext<'a> {
    SurfaceContext {
        surface,
        weather,
        material,
        // 1.5 W/m^2/K into a building held at 22 C
        conduction: SoilHeatFlux {
            part1: 33.0,
            part2: 1.5,
        },
        moisture,
        properties: material.initial_thermal_properties(),
    }
}

mod energy_conservation {
    use super::*;

    /// Absorbed radiation equals sensible plus transpiration at the solved leaf temperature.
    #[test]
    fn test_leaf_energy_balance_closes() {
        let material = MaterialParameters::default();
        let surface = RoofSurface::flat(1, 200.0);
        let weather = summer_noon();
        let model = PlantCoverage::new();
        let env = CanopyEnvironment::new(
            &context(&surface, &weather, &material, MoistureState::uniform(0.2)),
            model.parameters(),
        );

        let soil = 35.0 + KELVIN;
        let balance = LeafBalance::new(&env, soil);
        let solution = solve(&balance, 30.0 + KELVIN, &SolverSettings::default()).unwrap();
        let t = solution.temperature;

        assert!(solution.is_converged());
        let gained = balance.absorbed_shortwave() + balance.sky_longwave(t) + balance.soil_longwave(t);
        let lost = balance.sensible(t) + balance.transpiration(t);
        assert_relative_eq!(gained, lost, epsilon = 1e-2);
        assert!(balance.transpiration(t) > 0.0);
    }

    /// With no plants the bare soil node alone balances the surface.
    #[test]
    fn test_bare_soil_balance_without_plants() {
        let material = MaterialParameters {
            plant_coverage: 0.0,
            ..MaterialParameters::default()
        };
        let surface = RoofSurface::flat(1, 200.0);
        let weather = summer_noon();
        let ctx = context(&surface, &weather, &material, MoistureState::uniform(0.2));
        let model = PlantCoverage::new();
        let mut state = SurfaceThermalState::at_outdoor(weather.outdoor_dry_bulb);

        let output = model.solve(&ctx, &mut state).unwrap();
        let report = output.report;

        // Plant outputs are exactly zero
        assert_eq!(report.vegetation_temperature, 0.0);
        assert_eq!(report.vegetation_sensible, 0.0);
        assert_eq!(report.vegetation_latent, 0.0);
        assert_eq!(output.evapotranspiration.vegetation, 0.0);

        // Hand-computed terms at the solved temperature
        let t = state.bare_soil;
        let eps = material.thermal_absorptance;
        let sky = weather.sky_kelvin().powi(4);
        let longwave = eps * STEFAN_BOLTZMANN * (sky - t.powi(4) - (1.0 - eps) * sky);
        let conduction = -33.0 + 1.5 * (t - KELVIN);
        assert_relative_eq!(report.soil_net_longwave, longwave, max_relative = 1e-9);
        assert_relative_eq!(report.soil_conduction, conduction, max_relative = 1e-9);
        assert_relative_eq!(output.exterior_temperature, t - KELVIN, epsilon = 1e-12);

        let imbalance = report.soil_net_shortwave + report.soil_net_longwave
            - report.soil_sensible
            - report.soil_latent
            - report.soil_conduction;
        assert_relative_eq!(imbalance, 0.0, epsilon = 1e-2);

        // Same as evaluating the bare soil node directly
        let env = CanopyEnvironment::new(&ctx, model.parameters());
        let direct = BareSoilBalance::new(&env, state.soil);
        assert_relative_eq!(direct.residual(t), 0.0, epsilon = 1e-2);
    }

    /// Full coverage leaves the bare soil node untouched.
    #[test]
    fn test_full_coverage_skips_bare_soil() {
        let material = MaterialParameters {
            plant_coverage: 1.0,
            ..MaterialParameters::default()
        };
        let surface = RoofSurface::flat(1, 200.0);
        let weather = summer_noon();
        let ctx = context(&surface, &weather, &material, MoistureState::uniform(0.2));
        let mut state = SurfaceThermalState::at_outdoor(18.0);

        PlantCoverage::new().solve(&ctx, &mut state).unwrap();

        assert_eq!(state.bare_soil, 18.0 + KELVIN);
        assert_relative_eq!(state.soil_average, state.soil, epsilon = 1e-12);
    }
}

mod moisture_conservation {
    use super::*;

    fn run_budget(method: RedistributionMethod, material: MaterialParameters) {
        let parameters = MoistureTransportParameters {
            method,
            ..MoistureTransportParameters::default()
        };
        let mut transport = MoistureTransport::new(parameters, &material, 15.0).unwrap();
        let layers = *transport.layers();
        let mut moisture = MoistureState::uniform(material.initial_moisture);
        let mut properties = material.initial_thermal_properties();
        let mut fluxes = FluxAccumulators::default();
        let initial = layers.water_depth(&moisture);

        // A day of 15 minute steps: dry morning, a storm, then drying
        for step in 0..96 {
            let water = WaterInputs {
                precipitation: Some(if (40..44).contains(&step) { 0.004 } else { 0.0 }),
                irrigation: if step == 10 { 0.001 } else { 0.0 },
                irrigation_mode: IrrigationMode::Scheduled,
            };
            let evapotranspiration = EvapotranspirationRates {
                vegetation: 2e-8,
                soil: 1e-8,
            };
            let before = layers.water_depth(&moisture);

            transport.update(
                &mut moisture,
                &mut properties,
                &mut fluxes,
                &evapotranspiration,
                &water,
                false,
            );

            assert_relative_eq!(
                layers.water_depth(&moisture) - before,
                fluxes.current_net_input(),
                epsilon = 1e-12
            );
            assert!(moisture.top >= layers.floor() && moisture.top <= layers.ceiling());
            assert!(moisture.root >= layers.floor() && moisture.root <= layers.ceiling());
        }

        let net = fluxes.cumulative_precipitation + fluxes.cumulative_irrigation
            - fluxes.cumulative_runoff
            - fluxes.cumulative_evapotranspiration;
        assert_relative_eq!(layers.water_depth(&moisture) - initial, net, epsilon = 1e-10);
        assert!(fluxes.cumulative_runoff > 0.0, "storm should run off");
    }

    #[test]
    fn test_diffusion_budget_closes() {
        run_budget(RedistributionMethod::Diffusion, MaterialParameters::default());
    }

    #[test]
    fn test_unsaturated_flow_budget_closes() {
        // Thick enough to be stable at 15 minute steps
        let material = MaterialParameters {
            thickness: 0.3,
            initial_moisture: 0.15,
            ..MaterialParameters::default()
        };
        run_budget(RedistributionMethod::Richards, material);
    }

    /// Evapotranspiration dries both layers down to their floor without the
    /// redistribution step putting any water back.
    fn run_dry_spell(method: RedistributionMethod) {
        let material = MaterialParameters {
            thickness: 0.3,
            initial_moisture: 0.03,
            ..MaterialParameters::default()
        };
        let parameters = MoistureTransportParameters {
            method,
            ..MoistureTransportParameters::default()
        };
        let mut transport = MoistureTransport::new(parameters, &material, 15.0).unwrap();
        let layers = *transport.layers();
        let mut moisture = MoistureState::uniform(material.initial_moisture);
        let mut properties = material.initial_thermal_properties();
        let mut fluxes = FluxAccumulators::default();
        let evapotranspiration = EvapotranspirationRates {
            vegetation: 1e-7,
            soil: 1e-7,
        };
        let initial = layers.water_depth(&moisture);

        // Four dry days
        for _ in 0..384 {
            let before = layers.water_depth(&moisture);
            transport.update(
                &mut moisture,
                &mut properties,
                &mut fluxes,
                &evapotranspiration,
                &WaterInputs::dry(),
                false,
            );

            assert_relative_eq!(
                layers.water_depth(&moisture) - before,
                fluxes.current_net_input(),
                epsilon = 1e-12
            );
            assert!(moisture.top >= layers.floor() * (1.0 - 1e-12));
            assert!(moisture.root >= layers.floor() * (1.0 - 1e-12));
        }

        // Dried out, and nothing left to evaporate
        assert_relative_eq!(
            layers.water_depth(&moisture),
            layers.floor() * layers.thickness(),
            epsilon = 1e-9
        );
        assert_relative_eq!(fluxes.current_evapotranspiration, 0.0, epsilon = 1e-12);

        let net = -fluxes.cumulative_runoff - fluxes.cumulative_evapotranspiration;
        assert_relative_eq!(layers.water_depth(&moisture) - initial, net, epsilon = 1e-10);
    }

    #[test]
    fn test_diffusion_dry_spell_budget_closes() {
        run_dry_spell(RedistributionMethod::Diffusion);
    }

    #[test]
    fn test_unsaturated_flow_dry_spell_budget_closes() {
        run_dry_spell(RedistributionMethod::Richards);
    }

    /// Cumulative totals only ever grow.
    #[test]
    fn test_cumulative_totals_never_decrease() {
        let material = MaterialParameters::default();
        let mut transport =
            MoistureTransport::new(MoistureTransportParameters::default(), &material, 15.0)
                .unwrap();
        let mut moisture = MoistureState::uniform(material.initial_moisture);
        let mut properties = material.initial_thermal_properties();
        let mut fluxes = FluxAccumulators::default();
        let evapotranspiration = EvapotranspirationRates {
            vegetation: 5e-8,
            soil: 5e-8,
        };

        let mut previous = fluxes;
        for step in 0..48 {
            let water = WaterInputs::rain(if step % 12 == 0 { 0.006 } else { 0.0 });
            transport.update(
                &mut moisture,
                &mut properties,
                &mut fluxes,
                &evapotranspiration,
                &water,
                false,
            );
            assert!(fluxes.cumulative_precipitation >= previous.cumulative_precipitation);
            assert!(fluxes.cumulative_runoff >= previous.cumulative_runoff);
            assert!(
                fluxes.cumulative_evapotranspiration >= previous.cumulative_evapotranspiration
            );
            previous = fluxes;
        }
    }
}
