//! Properties of the vegetated growing-medium layer.

use serde::{Deserialize, Serialize};

use crate::environment::Roughness;
use crate::errors::{EcoRoofError, EcoRoofResult};
use crate::FloatValue;

/// Read-only description of the outermost (soil and plant) layer of a green
/// roof construction.
///
/// Moisture quantities are volumetric fractions (m^3/m^3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParameters {
    // Plants
    /// Height of plants (m).
    /// Default: 0.2
    pub plant_height: FloatValue,

    /// Leaf area index (m^2 leaf / m^2 ground).
    /// Default: 1.0
    pub leaf_area_index: FloatValue,

    /// Shortwave reflectivity of leaves.
    /// Default: 0.22
    pub leaf_reflectivity: FloatValue,

    /// Longwave emissivity of leaves.
    /// Default: 0.95
    pub leaf_emissivity: FloatValue,

    /// Minimum stomatal resistance (s/m).
    /// Default: 180.0
    pub min_stomatal_resistance: FloatValue,

    /// Fraction of the roof covered by plants, used by the plant coverage model.
    /// Default: 0.9
    pub plant_coverage: FloatValue,

    /// Canopy extinction coefficient for shortwave.
    /// Default: 0.65
    pub shortwave_extinction: FloatValue,

    /// Canopy extinction coefficient for longwave.
    /// Default: 0.8
    pub longwave_extinction: FloatValue,

    // Soil
    /// Surface roughness class.
    /// Default: medium rough
    pub roughness: Roughness,

    /// Total soil thickness (m).
    /// Default: 0.1
    pub thickness: FloatValue,

    /// Dry soil conductivity (W/m/K).
    /// Default: 0.35
    pub conductivity: FloatValue,

    /// Dry soil density (kg/m^3).
    /// Default: 1100.0
    pub density: FloatValue,

    /// Dry soil specific heat (J/kg/K).
    /// Default: 1200.0
    pub specific_heat: FloatValue,

    /// Soil thermal absorptance, used as its longwave emissivity.
    /// Default: 0.9
    pub thermal_absorptance: FloatValue,

    /// Dry soil solar absorptance.
    /// Default: 0.7
    pub solar_absorptance: FloatValue,

    // Moisture
    /// Saturation (maximum) volumetric moisture, the soil porosity.
    /// Default: 0.3
    pub saturation_moisture: FloatValue,

    /// Residual volumetric moisture; also the wilting point.
    /// Default: 0.01
    pub residual_moisture: FloatValue,

    /// Initial volumetric moisture of both layers.
    /// Default: 0.1
    pub initial_moisture: FloatValue,

    /// Field-capacity volumetric moisture.
    /// Default: 0.25
    pub field_capacity: FloatValue,
}

impl Default for MaterialParameters {
    fn default() -> Self {
        Self {
            plant_height: 0.2,
            leaf_area_index: 1.0,
            leaf_reflectivity: 0.22,
            leaf_emissivity: 0.95,
            min_stomatal_resistance: 180.0,
            plant_coverage: 0.9,
            shortwave_extinction: 0.65,
            longwave_extinction: 0.8,

            roughness: Roughness::MediumRough,
            thickness: 0.1,
            conductivity: 0.35,
            density: 1100.0,
            specific_heat: 1200.0,
            thermal_absorptance: 0.9,
            solar_absorptance: 0.7,

            saturation_moisture: 0.3,
            residual_moisture: 0.01,
            initial_moisture: 0.1,
            field_capacity: 0.25,
        }
    }
}

fn check(condition: bool, name: &str, reason: &str) -> EcoRoofResult<()> {
    if condition {
        Ok(())
    } else {
        Err(EcoRoofError::invalid_parameter(name, reason))
    }
}

fn check_fraction(value: FloatValue, name: &str) -> EcoRoofResult<()> {
    check(
        (0.0..=1.0).contains(&value),
        name,
        "must lie between 0 and 1",
    )
}

impl MaterialParameters {
    /// Reject parameter sets the models cannot run with.
    pub fn validate(&self) -> EcoRoofResult<()> {
        check(self.thickness > 0.0, "thickness", "must be positive")?;
        check(self.plant_height > 0.0, "plant_height", "must be positive")?;
        check(
            self.leaf_area_index > 0.0,
            "leaf_area_index",
            "must be positive",
        )?;
        check(
            self.min_stomatal_resistance > 0.0,
            "min_stomatal_resistance",
            "must be positive",
        )?;
        check(self.conductivity > 0.0, "conductivity", "must be positive")?;
        check(self.density > 0.0, "density", "must be positive")?;
        check(self.specific_heat > 0.0, "specific_heat", "must be positive")?;
        check_fraction(self.leaf_reflectivity, "leaf_reflectivity")?;
        check_fraction(self.leaf_emissivity, "leaf_emissivity")?;
        check_fraction(self.plant_coverage, "plant_coverage")?;
        check_fraction(self.thermal_absorptance, "thermal_absorptance")?;
        check_fraction(self.solar_absorptance, "solar_absorptance")?;
        check(
            self.residual_moisture >= 0.0,
            "residual_moisture",
            "must not be negative",
        )?;
        check(
            self.saturation_moisture > self.residual_moisture && self.saturation_moisture <= 1.0,
            "saturation_moisture",
            "must exceed the residual moisture and not exceed 1",
        )?;
        check(
            self.initial_moisture >= self.residual_moisture
                && self.initial_moisture <= self.saturation_moisture,
            "initial_moisture",
            "must lie between the residual and saturation moisture",
        )?;
        check(
            self.field_capacity > self.residual_moisture,
            "field_capacity",
            "must exceed the residual moisture",
        )?;
        Ok(())
    }

    /// Dry soil albedo.
    pub fn dry_albedo(&self) -> FloatValue {
        1.0 - self.solar_absorptance
    }

    /// Properties at the start of an environment, before any moisture update.
    pub fn initial_thermal_properties(&self) -> LiveThermalProperties {
        LiveThermalProperties {
            conductivity: self.conductivity,
            density: self.density,
            specific_heat: self.specific_heat,
            albedo: self.dry_albedo(),
        }
    }
}

/// Moisture-dependent soil properties that the host CTF solver reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveThermalProperties {
    /// W/m/K
    pub conductivity: FloatValue,
    /// kg/m^3
    pub density: FloatValue,
    /// J/kg/K
    pub specific_heat: FloatValue,
    /// Soil shortwave albedo.
    pub albedo: FloatValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_are_valid() {
        let params = MaterialParameters::default();
        assert!(params.validate().is_ok());
        assert!((params.dry_albedo() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_moisture_range() {
        let params = MaterialParameters {
            saturation_moisture: 0.01,
            residual_moisture: 0.01,
            ..MaterialParameters::default()
        };
        let err = params.validate().unwrap_err();
        assert!(
            err.to_string().contains("saturation_moisture"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_initial_moisture_outside_range() {
        let params = MaterialParameters {
            initial_moisture: 0.5,
            ..MaterialParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_initial_thermal_properties() {
        let params = MaterialParameters::default();
        let props = params.initial_thermal_properties();
        assert_eq!(props.conductivity, 0.35);
        assert_eq!(props.density, 1100.0);
        assert_eq!(props.specific_heat, 1200.0);
        assert!((props.albedo - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_partial_deserialization() {
        let json = r#"{"leaf_area_index": 3.0, "roughness": "very_smooth"}"#;
        let params: MaterialParameters =
            serde_json::from_str(json).expect("Partial deserialization failed");

        assert!((params.leaf_area_index - 3.0).abs() < 1e-10);
        assert_eq!(params.roughness, Roughness::VerySmooth);
        assert!((params.thickness - 0.1).abs() < 1e-10);
    }
}
