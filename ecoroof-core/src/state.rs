//! Persistent state carried between timesteps.
//!
//! The orchestration layer owns one instance of each type and resets them at
//! the lifecycle events (start of an environment, start of a warm-up day).

use serde::{Deserialize, Serialize};

use crate::constants::KELVIN;
use crate::FloatValue;

/// Temperature assumed for every node before the first environment starts (C).
pub const DEFAULT_NODE_TEMPERATURE: FloatValue = 10.0;

/// Volumetric moisture of the two soil layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoistureState {
    /// Near-surface layer (m^3/m^3).
    pub top: FloatValue,
    /// Root zone (m^3/m^3).
    pub root: FloatValue,
}

impl MoistureState {
    pub fn uniform(moisture: FloatValue) -> Self {
        Self {
            top: moisture,
            root: moisture,
        }
    }

    /// Water held in both layers as an equivalent depth (m).
    pub fn water_depth(&self, top_depth: FloatValue, root_depth: FloatValue) -> FloatValue {
        self.top * top_depth + self.root * root_depth
    }

    /// Thickness-weighted mean moisture.
    pub fn average(&self, top_depth: FloatValue, root_depth: FloatValue) -> FloatValue {
        self.water_depth(top_depth, root_depth) / (top_depth + root_depth)
    }
}

/// Node temperatures of the surface energy balance.
///
/// The plant coverage model works in Kelvin on the `leaf`, `soil`,
/// `bare_soil` nodes. The two-node model keeps its previous-step leaf and
/// ground temperatures in Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceThermalState {
    /// Leaf/canopy temperature (K).
    pub leaf: FloatValue,
    /// Soil under the canopy (K).
    pub soil: FloatValue,
    /// Bare soil between plants (K).
    pub bare_soil: FloatValue,
    /// Cover-weighted soil temperature (K).
    pub soil_average: FloatValue,
    /// Leaf temperature at the end of the last two-node solve (C).
    pub previous_leaf: FloatValue,
    /// Ground temperature at the end of the last two-node solve (C).
    pub previous_ground: FloatValue,
}

impl Default for SurfaceThermalState {
    fn default() -> Self {
        let kelvin = DEFAULT_NODE_TEMPERATURE + KELVIN;
        Self {
            leaf: kelvin,
            soil: kelvin,
            bare_soil: kelvin,
            soil_average: kelvin,
            previous_leaf: DEFAULT_NODE_TEMPERATURE,
            previous_ground: DEFAULT_NODE_TEMPERATURE,
        }
    }
}

impl SurfaceThermalState {
    /// Every node at the outdoor temperature, the initial guess for a new environment.
    pub fn at_outdoor(outdoor_c: FloatValue) -> Self {
        let kelvin = outdoor_c + KELVIN;
        Self {
            leaf: kelvin,
            soil: kelvin,
            bare_soil: kelvin,
            soil_average: kelvin,
            previous_leaf: outdoor_c,
            previous_ground: outdoor_c,
        }
    }
}

/// Water-loss rates from the last energy balance, consumed by the next
/// moisture update.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvapotranspirationRates {
    /// Transpiration drawn from the root zone (m/s).
    pub vegetation: FloatValue,
    /// Evaporation from the top layer (m/s).
    pub soil: FloatValue,
}

/// Water budget terms, for the current timestep and accumulated over the
/// environment (m of water).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FluxAccumulators {
    pub current_precipitation: FloatValue,
    pub current_irrigation: FloatValue,
    pub current_runoff: FloatValue,
    pub current_evapotranspiration: FloatValue,
    pub cumulative_precipitation: FloatValue,
    pub cumulative_irrigation: FloatValue,
    pub cumulative_runoff: FloatValue,
    pub cumulative_evapotranspiration: FloatValue,
}

impl FluxAccumulators {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold the current-step terms into the cumulative totals.
    pub fn accumulate(&mut self) {
        self.cumulative_precipitation += self.current_precipitation;
        self.cumulative_irrigation += self.current_irrigation;
        self.cumulative_runoff += self.current_runoff;
        self.cumulative_evapotranspiration += self.current_evapotranspiration;
    }

    /// Net water gained this step (m): inputs minus losses.
    pub fn current_net_input(&self) -> FloatValue {
        self.current_precipitation + self.current_irrigation
            - self.current_runoff
            - self.current_evapotranspiration
    }
}
