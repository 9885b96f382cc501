//! Convective heat transfer over the roof surface.
//!
//! The roof is treated as a square plate of the given area. A Grashof/Reynolds
//! comparison selects natural, mixed or forced convection, and an empirical
//! Nusselt correlation gives the coefficient for that regime.
//!
//! # Regimes
//!
//! With $Gr = |g \beta \Delta T L_c^3 / \nu^2|$ and $Re = V L / \nu$:
//!
//! - natural when $Gr > 55.3 \, Re^{5/3}$
//! - forced when $Gr < 0.068 \, Re^{2.2}$
//! - mixed otherwise
//!
//! Natural is checked first, so it wins where the two thresholds cross at high
//! Reynolds numbers.

use serde::{Deserialize, Serialize};

use crate::constants::{GRAVITY, NU_AIR, PRANDTL_AIR};
use crate::FloatValue;

/// Lower bound on any returned coefficient (W/m^2/K).
///
/// Keeps aerodynamic resistances finite in still, isothermal air.
pub const H_MIN: FloatValue = 0.1;

/// Enhancement applied to the plate correlations for a plant canopy.
pub const CANOPY_MULTIPLIER: FloatValue = 3.0;

/// Enhancement applied to the plate correlations for bare soil.
pub const BARE_SOIL_MULTIPLIER: FloatValue = 2.1;

/// Convection regime selected from the Grashof/Reynolds balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvectionRegime {
    Natural,
    Mixed,
    Forced,
}

/// Square-plate geometry derived from the roof area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofGeometry {
    /// Roof area (m^2).
    pub area: FloatValue,
}

impl RoofGeometry {
    pub fn new(area: FloatValue) -> Self {
        Self { area }
    }

    /// Side length of the equivalent square (m).
    pub fn length(&self) -> FloatValue {
        self.area.sqrt()
    }

    /// Characteristic length $L W / (2L + 2W)$ (m).
    pub fn characteristic_length(&self) -> FloatValue {
        let length = self.length();
        let width = length;
        length * width / (2.0 * length + 2.0 * width)
    }
}

/// Grashof number for a surface at `surface_temperature` in air at `air_temperature` (K).
pub fn grashof(
    geometry: &RoofGeometry,
    air_temperature: FloatValue,
    surface_temperature: FloatValue,
) -> FloatValue {
    let beta = 1.0 / (0.5 * (air_temperature + surface_temperature));
    let l_c = geometry.characteristic_length();
    (GRAVITY * beta * (surface_temperature - air_temperature) * l_c.powi(3) / (NU_AIR * NU_AIR))
        .abs()
}

/// Reynolds number based on the side length.
pub fn reynolds(geometry: &RoofGeometry, wind_speed: FloatValue) -> FloatValue {
    wind_speed * geometry.length() / NU_AIR
}

/// Classify the convection regime.
pub fn classify(grashof: FloatValue, reynolds: FloatValue) -> ConvectionRegime {
    if grashof > 55.3 * reynolds.powf(5.0 / 3.0) {
        ConvectionRegime::Natural
    } else if grashof < 0.068 * reynolds.powf(2.2) {
        ConvectionRegime::Forced
    } else {
        ConvectionRegime::Mixed
    }
}

fn plate_coefficient(
    geometry: &RoofGeometry,
    air_temperature: FloatValue,
    surface_temperature: FloatValue,
    wind_speed: FloatValue,
    conductivity: FloatValue,
    multiplier: FloatValue,
) -> FloatValue {
    let gr = grashof(geometry, air_temperature, surface_temperature);
    let re = reynolds(geometry, wind_speed);
    let length = geometry.length();
    let l_c = geometry.characteristic_length();

    let h = match classify(gr, re) {
        ConvectionRegime::Forced => {
            let nu = 3.0 + 1.25 * 0.0253 * re.powf(0.8);
            multiplier * nu * conductivity / length
        }
        ConvectionRegime::Mixed => {
            let nu = 2.7
                * (gr / re.powf(2.2)).powf(1.0 / 3.0)
                * (3.0 * 15.0 / 4.0 + 0.0253 * 15.0 / 16.0 * re.powf(0.8));
            let norm = (gr / re.powf(5.0 / 3.0)) / 60.0;
            let l_mixed = l_c * norm + length * (1.0 - norm);
            multiplier * nu * conductivity / l_mixed
        }
        ConvectionRegime::Natural => {
            let nu = 0.15 * (gr * PRANDTL_AIR).powf(1.0 / 3.0);
            multiplier * nu * conductivity / l_c
        }
    };

    if h.is_finite() {
        h.max(H_MIN)
    } else {
        H_MIN
    }
}

/// Convective coefficient (W/m^2/K) between a plant canopy and the air.
pub fn canopy_coefficient(
    geometry: &RoofGeometry,
    air_temperature: FloatValue,
    leaf_temperature: FloatValue,
    wind_speed: FloatValue,
    conductivity: FloatValue,
) -> FloatValue {
    plate_coefficient(
        geometry,
        air_temperature,
        leaf_temperature,
        wind_speed,
        conductivity,
        CANOPY_MULTIPLIER,
    )
}

/// Convective coefficient (W/m^2/K) between bare soil and the air.
pub fn bare_soil_coefficient(
    geometry: &RoofGeometry,
    air_temperature: FloatValue,
    soil_temperature: FloatValue,
    wind_speed: FloatValue,
    conductivity: FloatValue,
) -> FloatValue {
    plate_coefficient(
        geometry,
        air_temperature,
        soil_temperature,
        wind_speed,
        conductivity,
        BARE_SOIL_MULTIPLIER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KELVIN, K_AIR};
    use is_close::is_close;

    #[test]
    fn test_geometry() {
        let geometry = RoofGeometry::new(100.0);
        assert!(is_close!(geometry.length(), 10.0));
        assert!(is_close!(geometry.characteristic_length(), 2.5));
    }

    #[test]
    fn test_still_air_is_natural() {
        let geometry = RoofGeometry::new(100.0);
        let gr = grashof(&geometry, KELVIN + 20.0, KELVIN + 30.0);
        assert!(gr > 0.0);
        assert_eq!(classify(gr, 0.0), ConvectionRegime::Natural);
    }

    #[test]
    fn test_windy_isothermal_is_forced() {
        let geometry = RoofGeometry::new(100.0);
        let gr = grashof(&geometry, KELVIN + 20.0, KELVIN + 20.0);
        let re = reynolds(&geometry, 3.0);
        assert_eq!(gr, 0.0);
        assert_eq!(classify(gr, re), ConvectionRegime::Forced);
    }

    #[test]
    fn test_forced_coefficient_value() {
        let geometry = RoofGeometry::new(100.0);
        let t = KELVIN + 20.0;
        let h = canopy_coefficient(&geometry, t, t, 3.0, K_AIR);

        let re: FloatValue = 3.0 * 10.0 / NU_AIR;
        let nu = 3.0 + 1.25 * 0.0253 * re.powf(0.8);
        let expected = 3.0 * nu * K_AIR / 10.0;
        assert!(is_close!(h, expected), "h = {}, expected {}", h, expected);
    }

    #[test]
    fn test_canopy_enhanced_over_bare_soil() {
        let geometry = RoofGeometry::new(50.0);
        let h_canopy = canopy_coefficient(&geometry, KELVIN + 20.0, KELVIN + 25.0, 2.0, K_AIR);
        let h_bare = bare_soil_coefficient(&geometry, KELVIN + 20.0, KELVIN + 25.0, 2.0, K_AIR);
        assert!(is_close!(h_canopy / h_bare, CANOPY_MULTIPLIER / BARE_SOIL_MULTIPLIER));
    }

    #[test]
    fn test_floor_applies_without_driving_force() {
        let geometry = RoofGeometry::new(100.0);
        let t = KELVIN + 20.0;
        assert_eq!(canopy_coefficient(&geometry, t, t, 0.0, K_AIR), H_MIN);
    }

    #[test]
    fn test_coefficient_increases_with_wind() {
        let geometry = RoofGeometry::new(100.0);
        let t = KELVIN + 20.0;
        let calm = bare_soil_coefficient(&geometry, t, t + 5.0, 0.5, K_AIR);
        let windy = bare_soil_coefficient(&geometry, t, t + 5.0, 8.0, K_AIR);
        assert!(windy > calm, "calm {} windy {}", calm, windy);
    }
}
