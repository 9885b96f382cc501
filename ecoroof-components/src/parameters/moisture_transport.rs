//! Moisture Transport Parameters
//!
//! Parameters for the two-layer soil moisture budget and the moisture-dependent
//! soil thermal properties.

use ecoroof_core::FloatValue;
use serde::{Deserialize, Serialize};

/// How moisture moves between the top layer and the root zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedistributionMethod {
    /// Relaxation toward equal moisture at fixed rates, faster downward than up.
    #[default]
    Diffusion,
    /// Darcy flow with van Genuchten-Mualem unsaturated conductivity.
    Richards,
}

/// Parameters for the moisture transport and thermal property updater.
///
/// # Default Values
///
/// The unsaturated-flow constants are curve fits for an extensive green roof
/// substrate (Schaap and van Genuchten, 2006).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistureTransportParameters {
    /// Redistribution sub-model.
    /// Default: diffusion
    pub method: RedistributionMethod,

    // Layers
    /// Thickness of the near-surface layer (m).
    /// Default: 0.06
    pub top_layer_depth: FloatValue,

    /// Soils no thicker than this are split in half instead (m).
    /// Default: 0.12
    pub thin_soil_limit: FloatValue,

    // Infiltration
    /// Maximum rate water can enter the top layer (m/h).
    /// Anything above becomes runoff. 0.5 in/h.
    /// Default: 0.0127
    pub max_infiltration_rate: FloatValue,

    // Diffusion
    /// Downward redistribution rate (1/s).
    /// Default: 5e-5
    pub diffusion_down_rate: FloatValue,

    /// Upward redistribution rate (1/s).
    /// Default: 1e-5
    pub diffusion_up_rate: FloatValue,

    // Unsaturated flow
    /// van Genuchten alpha (1/m).
    /// Default: 23.0
    pub van_genuchten_alpha: FloatValue,

    /// van Genuchten n (dimensionless).
    /// Default: 1.27
    pub van_genuchten_n: FloatValue,

    /// Mualem pore-connectivity exponent.
    /// Default: 0.5
    pub pore_connectivity: FloatValue,

    /// Saturated hydraulic conductivity (m/s).
    /// Default: 5.157e-7
    pub saturated_conductivity: FloatValue,

    /// Lower bound on relative saturation before it is clamped with a warning.
    /// Default: 1e-4
    pub min_relative_saturation: FloatValue,

    /// Drainage below this rate (m/h) is ignored, about one drop per hour.
    /// Default: 2.33e-7
    pub min_drainage_rate: FloatValue,

    // Thermal properties
    /// Largest fractional change of a thermal property per reference interval.
    /// Default: 0.2
    pub max_property_change: FloatValue,

    /// Interval the property change limit refers to (minutes).
    /// Default: 15.0
    pub property_change_interval: FloatValue,
}

impl Default for MoistureTransportParameters {
    fn default() -> Self {
        Self {
            method: RedistributionMethod::Diffusion,

            top_layer_depth: 0.06,
            thin_soil_limit: 0.12,

            max_infiltration_rate: 0.5 * 0.0254,

            diffusion_down_rate: 5e-5,
            diffusion_up_rate: 1e-5,

            van_genuchten_alpha: 23.0,
            van_genuchten_n: 1.27,
            pore_connectivity: 0.5,
            saturated_conductivity: 5.157e-7,
            min_relative_saturation: 1e-4,
            min_drainage_rate: 2.33e-7,

            max_property_change: 0.2,
            property_change_interval: 15.0,
        }
    }
}

impl MoistureTransportParameters {
    /// Split a soil of total `thickness` into (top, root) depths (m).
    pub fn layer_depths(&self, thickness: FloatValue) -> (FloatValue, FloatValue) {
        let top = if thickness > self.thin_soil_limit {
            self.top_layer_depth
        } else {
            0.5 * thickness
        };
        (top, thickness - top)
    }

    /// Infiltration capacity over one timestep (m).
    pub fn infiltration_capacity(&self, timestep_minutes: FloatValue) -> FloatValue {
        self.max_infiltration_rate * timestep_minutes / 60.0
    }

    /// Bounds (min, max) on the new/old ratio of a thermal property per timestep.
    pub fn property_ratio_bounds(&self, timestep_minutes: FloatValue) -> (FloatValue, FloatValue) {
        let change = self.max_property_change * timestep_minutes / self.property_change_interval;
        (1.0 - change, 1.0 + change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_depths() {
        let params = MoistureTransportParameters::default();

        let (top, root) = params.layer_depths(0.15);
        assert!((top - 0.06).abs() < 1e-12);
        assert!((root - 0.09).abs() < 1e-12);

        // Thin soil splits evenly
        let (top, root) = params.layer_depths(0.1);
        assert!((top - 0.05).abs() < 1e-12);
        assert!((root - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_infiltration_capacity() {
        let params = MoistureTransportParameters::default();
        // Half an inch per hour over 15 minutes
        let capacity = params.infiltration_capacity(15.0);
        assert!((capacity - 0.003175).abs() < 1e-12);
    }

    #[test]
    fn test_property_ratio_bounds() {
        let params = MoistureTransportParameters::default();
        let (min, max) = params.property_ratio_bounds(15.0);
        assert!((min - 0.8).abs() < 1e-12);
        assert!((max - 1.2).abs() < 1e-12);

        let (min, max) = params.property_ratio_bounds(60.0);
        assert!((min - 0.2).abs() < 1e-12);
        assert!((max - 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_method_deserialization() {
        let json = r#"{"method": "richards"}"#;
        let params: MoistureTransportParameters =
            serde_json::from_str(json).expect("Partial deserialization failed");
        assert_eq!(params.method, RedistributionMethod::Richards);
        assert!((params.van_genuchten_n - 1.27).abs() < 1e-12);
    }
}
