//! Multi-step runs of the full surface call sequence.

use approx::assert_relative_eq;
use ecoroof_components::energy::{PlantCoverage, TwoNode};
use ecoroof_components::moisture::RateLimiter;
use ecoroof_components::parameters::MoistureTransportParameters;
use ecoroof_components::simulation::EcoRoofSimulation;
use ecoroof_core::environment::{
    ConductionCoefficients, DrivingConditions, RoofSurface, WaterInputs,
};
use ecoroof_core::material::MaterialParameters;
use ecoroof_core::model::EnergyBalanceModel;

/// Weather for step `step` of a 15 minute day.
fn diurnal(step: usize) -> DrivingConditions {
    let hour = step as f64 * 0.25;
    let sun = ((hour - 6.0) / 12.0 * std::f64::consts::PI).sin().max(0.0);
    DrivingConditions {
        outdoor_dry_bulb: 20.0 + 8.0 * ((hour - 9.0) / 24.0 * 2.0 * std::f64::consts::PI).sin(),
        wind_speed: 2.5,
        relative_humidity: 55.0,
        beam_solar: 650.0 * sun,
        diffuse_solar: 120.0 * sun,
        sky_temperature: 8.0,
        ground_temperature: 20.0,
        ..DrivingConditions::default()
    }
}

/// Flux into a building held at 22 C through a lightweight deck.
fn conduction() -> ConductionCoefficients {
    ConductionCoefficients {
        ctf_cross: 0.0,
        ctf_outside: 1.5,
        const_out_part: 33.0,
        ..ConductionCoefficients::default()
    }
}

fn simulation(model: Box<dyn EnergyBalanceModel>) -> EcoRoofSimulation {
    let mut sim = EcoRoofSimulation::new(
        MaterialParameters::default(),
        model,
        MoistureTransportParameters::default(),
        15.0,
    )
    .unwrap();
    sim.on_environment_start(diurnal(0).outdoor_dry_bulb);
    sim
}

/// One surface call at `step` of the day, returning the exterior temperature.
fn advance(sim: &mut EcoRoofSimulation, step: usize, water: &WaterInputs, warmup: bool) -> f64 {
    let surface = RoofSurface::flat(1, 150.0);
    sim.calculate_surface(&surface, &diurnal(step), &conduction(), water, warmup)
        .unwrap()
        .exterior_temperature
}

fn run_day(sim: &mut EcoRoofSimulation, water: impl Fn(usize) -> WaterInputs) -> Vec<f64> {
    (0..96)
        .map(|step| advance(sim, step, &water(step), false))
        .collect()
}

mod full_day {
    use super::*;

    #[test]
    fn test_plant_coverage_day_is_physical() {
        let mut sim = simulation(Box::new(PlantCoverage::new()));
        let temperatures = run_day(&mut sim, |_| WaterInputs::dry());

        assert!(temperatures.iter().all(|t| t.is_finite()));
        assert!(temperatures.iter().all(|t| (-20.0..80.0).contains(t)));

        // Midday is warmer than midnight
        assert!(temperatures[52] > temperatures[0]);
        assert!(sim.fluxes().cumulative_evapotranspiration > 0.0);
        assert_eq!(sim.fluxes().cumulative_runoff, 0.0);
    }

    #[test]
    fn test_two_node_day_is_physical() {
        let mut sim = simulation(Box::new(TwoNode::new()));
        let temperatures = run_day(&mut sim, |_| WaterInputs::dry());

        assert!(temperatures.iter().all(|t| t.is_finite()));
        assert!(temperatures.iter().all(|t| (-20.0..80.0).contains(t)));
        assert!(temperatures[52] > temperatures[0]);

        let state = sim.thermal_state();
        assert_relative_eq!(state.previous_ground, temperatures[95], epsilon = 1e-12);
    }

    /// Moisture always stays between the residual and saturation limits.
    #[test]
    fn test_moisture_stays_in_bounds() {
        let mut sim = simulation(Box::new(PlantCoverage::new()));
        let layers = *sim.moisture_transport().layers();

        for step in 0..96 {
            let water = WaterInputs::rain(if (20..30).contains(&step) { 0.01 } else { 0.0 });
            advance(&mut sim, step, &water, false);
            let moisture = sim.moisture();
            assert!(moisture.top >= layers.floor() && moisture.top <= layers.ceiling());
            assert!(moisture.root >= layers.floor() && moisture.root <= layers.ceiling());
        }
    }
}

mod runoff {
    use super::*;

    /// Rain above the 0.5 in/h infiltration capacity runs off immediately.
    #[test]
    fn test_excess_over_infiltration_capacity_runs_off() {
        let mut sim = simulation(Box::new(PlantCoverage::new()));
        advance(&mut sim, 0, &WaterInputs::rain(0.01), false);

        let capacity = 0.5 * 0.0254 / 4.0;
        assert_relative_eq!(sim.fluxes().current_runoff, 0.01 - capacity, epsilon = 1e-12);
        assert_relative_eq!(sim.fluxes().cumulative_precipitation, 0.01, epsilon = 1e-15);
    }

    /// Warm-up steps change the soil but not the reported totals.
    #[test]
    fn test_warmup_does_not_accumulate() {
        let mut sim = simulation(Box::new(PlantCoverage::new()));
        advance(&mut sim, 0, &WaterInputs::rain(0.002), true);

        assert_eq!(sim.fluxes().cumulative_precipitation, 0.0);
        assert_eq!(sim.fluxes().current_precipitation, 0.002);
        assert!(sim.moisture().top > sim.material().initial_moisture);
    }
}

mod thermal_properties {
    use super::*;

    /// A +50% jump in a property moves at most +20% in 15 minutes.
    #[test]
    fn test_rate_limiter_caps_jump() {
        let params = MoistureTransportParameters::default();
        let (low, high) = params.property_ratio_bounds(15.0);
        let limiter = RateLimiter::new(low, high);

        assert_relative_eq!(limiter.limit(1.0, 1.5), 1.2, epsilon = 1e-12);
        assert_relative_eq!(limiter.limit(1.0, 0.5), 0.8, epsilon = 1e-12);
        assert_relative_eq!(limiter.limit(1.0, 1.1), 1.1, epsilon = 1e-12);

        // Scaled with the timestep
        let (_, high) = params.property_ratio_bounds(5.0);
        let limiter = RateLimiter::new(0.0, high);
        assert_relative_eq!(limiter.limit(1.0, 1.5), 1.0 + 0.2 / 3.0, epsilon = 1e-12);
    }

    /// Wetting the soil drags the live properties toward their wet values.
    #[test]
    fn test_rain_changes_properties_gradually() {
        let mut sim = simulation(Box::new(PlantCoverage::new()));
        let dry = *sim.properties();

        advance(&mut sim, 0, &WaterInputs::rain(0.003), false);
        let wet = *sim.properties();

        assert!(wet.conductivity != dry.conductivity);
        assert!(wet.conductivity / dry.conductivity <= 1.2 + 1e-12);
        assert!(wet.conductivity / dry.conductivity >= 0.8 - 1e-12);
        assert!(wet.specific_heat / dry.specific_heat <= 1.2 + 1e-12);
    }
}
