//! Moisture-dependent soil thermal properties.
//!
//! Each property relaxes toward a target computed from the current moisture,
//! but never changes by more than a fixed fraction per timestep so the host's
//! conduction transfer functions stay stable.

use ecoroof_core::constants::WATER_DENSITY;
use ecoroof_core::material::{LiveThermalProperties, MaterialParameters};
use ecoroof_core::state::MoistureState;
use ecoroof_core::FloatValue;

/// Wet-soil solar absorptance approached at saturation.
const WET_ABSORPTANCE: FloatValue = 0.92;
const MIN_ABSORPTANCE: FloatValue = 0.20;
const MAX_ABSORPTANCE: FloatValue = 0.95;

/// Specific heat added per unit volumetric moisture (J/kg/K).
const WATER_SPECIFIC_HEAT_FACTOR: FloatValue = 1900.0;

/// Properties the soil would have at the current moisture, before rate limiting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyTargets {
    pub solar_absorptance: FloatValue,
    pub conductivity: FloatValue,
    pub density: FloatValue,
    pub specific_heat: FloatValue,
}

impl PropertyTargets {
    /// Targets for `moisture` in layers of the given depths.
    ///
    /// Absorptance follows the near-surface layer; the bulk properties follow
    /// the depth-weighted mean moisture. Conductivity uses the fit
    ///
    /// $$k = \frac{k_{dry}}{1.15} \frac{1.45 e^{4.411 S}}{1 + 0.45 e^{4.411 S}}$$
    pub fn at(
        material: &MaterialParameters,
        moisture: &MoistureState,
        top_depth: FloatValue,
        root_depth: FloatValue,
    ) -> Self {
        let residual = material.residual_moisture;
        let range = material.saturation_moisture - residual;

        let top_saturation = (moisture.top - residual) / range;
        let solar_absorptance = (material.solar_absorptance
            + (WET_ABSORPTANCE - material.solar_absorptance) * top_saturation)
            .clamp(MIN_ABSORPTANCE, MAX_ABSORPTANCE);

        let average = moisture.average(top_depth, root_depth);
        let saturation = (average - residual) / range;
        let growth = (4.411 * saturation).exp();

        Self {
            solar_absorptance,
            conductivity: (material.conductivity / 1.15) * (1.45 * growth) / (1.0 + 0.45 * growth),
            density: material.density + (average - residual) * WATER_DENSITY,
            specific_heat: material.specific_heat + WATER_SPECIFIC_HEAT_FACTOR * average,
        }
    }
}

/// Caps the per-step ratio between a property's new and current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiter {
    pub min_ratio: FloatValue,
    pub max_ratio: FloatValue,
}

impl RateLimiter {
    pub fn new(min_ratio: FloatValue, max_ratio: FloatValue) -> Self {
        Self {
            min_ratio,
            max_ratio,
        }
    }

    /// Move `current` toward `target` within the allowed ratio.
    pub fn limit(&self, current: FloatValue, target: FloatValue) -> FloatValue {
        if current <= 0.0 {
            return target;
        }
        current * (target / current).clamp(self.min_ratio, self.max_ratio)
    }

    /// Commit rate-limited targets to the live properties.
    pub fn apply(&self, properties: &mut LiveThermalProperties, targets: &PropertyTargets) {
        properties.albedo = self.limit(properties.albedo, 1.0 - targets.solar_absorptance);
        properties.conductivity = self.limit(properties.conductivity, targets.conductivity);
        properties.density = self.limit(properties.density, targets.density);
        properties.specific_heat = self.limit(properties.specific_heat, targets.specific_heat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn limiter_15_min() -> RateLimiter {
        RateLimiter::new(0.8, 1.2)
    }

    #[test]
    fn test_limit_caps_jump() {
        let limiter = limiter_15_min();
        // +50% requested, +20% allowed
        assert!(is_close!(limiter.limit(1.0, 1.5), 1.2));
        // -50% requested, -20% allowed
        assert!(is_close!(limiter.limit(1.0, 0.5), 0.8));
        // Within bounds passes through
        assert!(is_close!(limiter.limit(1.0, 1.1), 1.1));
    }

    #[test]
    fn test_dry_soil_targets_match_dry_properties() {
        let material = MaterialParameters::default();
        let dry = MoistureState::uniform(material.residual_moisture);
        let targets = PropertyTargets::at(&material, &dry, 0.05, 0.05);

        assert!(is_close!(targets.conductivity, material.conductivity / 1.15));
        assert!(is_close!(targets.density, material.density));
        assert!(is_close!(
            targets.specific_heat,
            material.specific_heat + 1900.0 * material.residual_moisture
        ));
        assert!(is_close!(targets.solar_absorptance, material.solar_absorptance));
    }

    #[test]
    fn test_wet_soil_targets() {
        let material = MaterialParameters::default();
        let wet = MoistureState::uniform(material.saturation_moisture);
        let targets = PropertyTargets::at(&material, &wet, 0.05, 0.05);

        assert!(is_close!(targets.solar_absorptance, WET_ABSORPTANCE));
        assert!(targets.conductivity > 2.0 * material.conductivity);
        assert!(is_close!(targets.density, material.density + 0.29 * 990.0));
    }

    #[test]
    fn test_absorptance_clamped() {
        let material = MaterialParameters {
            solar_absorptance: 0.1,
            ..MaterialParameters::default()
        };
        let dry = MoistureState::uniform(material.residual_moisture);
        let targets = PropertyTargets::at(&material, &dry, 0.05, 0.05);
        assert!(is_close!(targets.solar_absorptance, MIN_ABSORPTANCE));
    }

    #[test]
    fn test_apply_rate_limits_every_property() {
        let material = MaterialParameters::default();
        let mut properties = material.initial_thermal_properties();
        let wet = MoistureState::uniform(material.saturation_moisture);
        let targets = PropertyTargets::at(&material, &wet, 0.05, 0.05);

        limiter_15_min().apply(&mut properties, &targets);

        // Conductivity wants to more than double; capped at +20%
        assert!(is_close!(properties.conductivity, 0.35 * 1.2));
        // Albedo wants 0.08 from 0.3; capped at -20%
        assert!(is_close!(properties.albedo, 0.3 * 0.8));
        assert!(properties.density > material.density);
    }
}
