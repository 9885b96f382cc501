//! Psychrometric and plant-stress correlations.
//!
//! All functions are pure. Temperatures are in Kelvin unless the argument name
//! says otherwise; vapour pressures from [`saturation_vapor_pressure`] are in kPa.
//!
//! The two-node model uses a second family of correlations (Garratt, in Pa and
//! Celsius), kept in the [`garratt`] submodule so the units never mix.

use crate::constants::{CP_AIR, KELVIN, LATENT_HEAT_FROST, R_AIR};
use crate::FloatValue;

/// Slope of the latent heat of vaporisation with temperature (J/kg/K).
pub const LATENT_HEAT_SLOPE: FloatValue = -2379.3;

/// Saturation vapour pressure (kPa) over water.
///
/// $$e_s = 0.6108 \exp\left(\frac{17.27 T_c}{T_c + 237.3}\right)$$
pub fn saturation_vapor_pressure(temperature: FloatValue) -> FloatValue {
    let tc = temperature - KELVIN;
    0.6108 * (17.27 * tc / (tc + 237.3)).exp()
}

/// Derivative of [`saturation_vapor_pressure`] with respect to temperature (kPa/K).
pub fn saturation_vapor_pressure_slope(temperature: FloatValue) -> FloatValue {
    let tc = temperature - KELVIN;
    let denom = tc + 237.3;
    saturation_vapor_pressure(temperature) * 17.27 * 237.3 / (denom * denom)
}

/// Latent heat of vaporisation (J/kg), linear in temperature.
pub fn latent_heat_vaporization(temperature: FloatValue) -> FloatValue {
    (2501.1 - 2.3793 * (temperature - KELVIN)) * 1000.0
}

/// Latent heat (J/kg) switching to the sublimation value below freezing.
pub fn latent_heat_with_frost(temperature: FloatValue) -> FloatValue {
    if temperature - KELVIN < 0.0 {
        LATENT_HEAT_FROST
    } else {
        latent_heat_vaporization(temperature)
    }
}

/// Psychrometric constant (kPa/K) at the given temperature and pressure (Pa).
///
/// $$\gamma = \frac{c_p P_a / 1000}{0.622 \, i_{fg}(T)}$$
pub fn psychrometric_constant(temperature: FloatValue, pressure: FloatValue) -> FloatValue {
    CP_AIR * (pressure / 1000.0) / (0.622 * latent_heat_vaporization(temperature))
}

/// Density of dry air (kg/m^3) from the ideal gas law.
pub fn air_density(pressure: FloatValue, temperature: FloatValue) -> FloatValue {
    pressure / (R_AIR * temperature)
}

/// Vapour pressure of outdoor air (kPa) from relative humidity in percent.
pub fn air_vapor_pressure(relative_humidity: FloatValue, air_temperature: FloatValue) -> FloatValue {
    relative_humidity / 100.0 * saturation_vapor_pressure(air_temperature)
}

/// Vapour-pressure-deficit stress multiplier on stomatal resistance.
///
/// Returns $1/f_{vpd}$ with $f_{vpd} = 1 - 0.41 \ln(\text{VPD})$, capped at 1
/// and replaced by 0.05 when it goes negative.
pub fn humidity_stress(leaf_temperature: FloatValue, vapor_pressure_air: FloatValue) -> FloatValue {
    let vpd = saturation_vapor_pressure(leaf_temperature) - vapor_pressure_air;
    let mut f_vpd = if vpd > 0.0 { 1.0 - 0.41 * vpd.ln() } else { 1.0 };
    if f_vpd > 1.0 {
        f_vpd = 1.0;
    }
    if f_vpd < 0.0 {
        f_vpd = 0.05;
    }
    1.0 / f_vpd
}

/// Leaf temperature stress multiplier, minimal near 35 C.
pub fn temperature_stress(leaf_temperature: FloatValue) -> FloatValue {
    let dt = 35.0 - (leaf_temperature - KELVIN);
    (1.0 / (1.0 - 0.0016 * dt * dt)).abs()
}

/// Derivative of [`temperature_stress`] with respect to leaf temperature (1/K).
pub fn temperature_stress_slope(leaf_temperature: FloatValue) -> FloatValue {
    let dt = 35.0 - (leaf_temperature - KELVIN);
    let g = 1.0 - 0.0016 * dt * dt;
    -g.signum() * 0.0032 * dt / (g * g)
}

/// Shortwave stress multiplier on stomatal resistance.
pub fn solar_stress(shortwave: FloatValue) -> FloatValue {
    1.0 + (-0.034 * (shortwave - 3.5)).exp()
}

/// Correlations used by the linearised two-node model.
///
/// Temperatures are Celsius and pressures Pascal.
pub mod garratt {
    use crate::constants::{KELVIN, LATENT_HEAT_FROST};
    use crate::FloatValue;

    /// Saturation vapour pressure (Pa).
    pub fn saturation_vapor_pressure(temperature_c: FloatValue) -> FloatValue {
        611.2 * (17.67 * temperature_c / (temperature_c + KELVIN - 29.65)).exp()
    }

    /// Derivative of [`saturation_vapor_pressure`] (Pa/K).
    pub fn saturation_vapor_pressure_slope(temperature_c: FloatValue) -> FloatValue {
        let denom = temperature_c + KELVIN - 29.65;
        saturation_vapor_pressure(temperature_c)
            * (17.67 / denom - 17.67 * temperature_c / (denom * denom))
    }

    /// Saturation mixing ratio (kg/kg) for a vapour pressure and total pressure.
    pub fn mixing_ratio(vapor_pressure: FloatValue, pressure: FloatValue) -> FloatValue {
        0.622 * vapor_pressure / (pressure - vapor_pressure)
    }

    /// Derivative of the saturation mixing ratio with temperature (1/K).
    pub fn mixing_ratio_slope(temperature_c: FloatValue, pressure: FloatValue) -> FloatValue {
        let es = saturation_vapor_pressure(temperature_c);
        0.622 * pressure / ((pressure - es) * (pressure - es))
            * saturation_vapor_pressure_slope(temperature_c)
    }

    /// Latent heat (J/kg) from the Henderson-Sellers fit.
    ///
    /// `previous_c` selects the frost value when the surface was below freezing
    /// at the end of the previous timestep.
    pub fn latent_heat(temperature_c: FloatValue, previous_c: FloatValue) -> FloatValue {
        if previous_c < 0.0 {
            return LATENT_HEAT_FROST;
        }
        let tk = temperature_c + KELVIN;
        let ratio = tk / (tk - 33.91);
        1.91846e6 * ratio * ratio
    }
}
