//! Two-Node Parameters
//!
//! Parameters for the linearised leaf/ground energy balance based on the
//! FASST vegetation model.

use ecoroof_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the two-node energy balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoNodeParameters {
    /// Von Karman constant.
    /// Default: 0.4
    pub von_karman: FloatValue,

    /// Turbulent Schmidt number for heat transfer near the ground.
    /// Default: 0.63
    pub turbulent_schmidt: FloatValue,

    /// Turbulent Prandtl number for vapour transfer near the ground.
    /// Default: 0.71
    pub turbulent_prandtl: FloatValue,

    /// Windless sensible heat transfer correction (W/m^2/K).
    /// Default: 2.0
    pub windless_exchange: FloatValue,

    /// Height of the wind and air temperature reference (m).
    /// Default: 2.0
    pub reference_height: FloatValue,

    /// Floor applied to the wind speed (m/s).
    /// Default: 2.0
    pub min_wind_speed: FloatValue,

    /// Fixed-point passes over the coupled system.
    /// Default: 3
    pub iterations: usize,

    /// Weight of each new estimate against the previous one.
    /// Default: 0.5
    pub relaxation: FloatValue,
}

impl Default for TwoNodeParameters {
    fn default() -> Self {
        Self {
            von_karman: 0.4,
            turbulent_schmidt: 0.63,
            turbulent_prandtl: 0.71,
            windless_exchange: 2.0,
            reference_height: 2.0,
            min_wind_speed: 2.0,
            iterations: 3,
            relaxation: 0.5,
        }
    }
}

impl TwoNodeParameters {
    /// Fractional vegetation cover from the leaf area index.
    ///
    /// $$\sigma_f = 0.9 - 0.7 e^{-0.75 \, LAI}$$
    pub fn vegetation_cover(leaf_area_index: FloatValue) -> FloatValue {
        0.9 - 0.7 * (-0.75 * leaf_area_index).exp()
    }

    /// Zero-plane displacement height of the canopy (m).
    pub fn displacement_height(plant_height: FloatValue) -> FloatValue {
        0.701 * plant_height.powf(0.979)
    }

    /// Foliage roughness length (m), limited below at 0.02 m.
    pub fn foliage_roughness(plant_height: FloatValue) -> FloatValue {
        (0.131 * plant_height.powf(0.997)).max(0.02)
    }
}
