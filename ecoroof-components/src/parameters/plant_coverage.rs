//! Plant Coverage Parameters
//!
//! Parameters for the per-node energy balance that resolves leaf, soil under
//! the canopy and bare soil temperatures separately.

use ecoroof_core::solver::SolverSettings;
use ecoroof_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the plant coverage energy balance.
///
/// Plant and soil optical properties come from the construction's
/// [`MaterialParameters`](ecoroof_core::material::MaterialParameters); the
/// values here describe the canopy air space and the empirical resistance fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantCoverageParameters {
    /// Porosity of the canopy treated as a porous medium (dimensionless).
    /// Default: 0.85
    pub canopy_porosity: FloatValue,

    /// Thermal conductivity of plant tissue (W/m/K).
    /// Default: 0.5
    pub plant_conductivity: FloatValue,

    /// Coefficient of the substrate surface resistance fit (s/m).
    /// $r_{s,sub} = a \, M_g^{b}$
    /// Default: 34.52
    pub substrate_resistance_coefficient: FloatValue,

    /// Exponent of the substrate surface resistance fit.
    /// Default: -3.2678
    pub substrate_resistance_exponent: FloatValue,

    /// Fraction of field capacity below which moisture stress starts.
    /// Default: 0.7
    pub stress_onset_fraction: FloatValue,

    /// Stomatal resistance multiplier once moisture falls below the wilting point.
    /// Default: 1000.0
    pub wilting_stress: FloatValue,

    /// Newton/bisection settings shared by the three nodes.
    pub solver: SolverSettings,
}

impl Default for PlantCoverageParameters {
    fn default() -> Self {
        Self {
            canopy_porosity: 0.85,
            plant_conductivity: 0.5,
            substrate_resistance_coefficient: 34.52,
            substrate_resistance_exponent: -3.2678,
            stress_onset_fraction: 0.7,
            wilting_stress: 1000.0,
            solver: SolverSettings::default(),
        }
    }
}

impl PlantCoverageParameters {
    /// Effective conductivity of the canopy air space (W/m/K).
    ///
    /// $$k_{por} = \phi k_{air} + (1 - \phi) k_{plants}$$
    pub fn porous_conductivity(&self, air_conductivity: FloatValue) -> FloatValue {
        self.canopy_porosity * air_conductivity
            + (1.0 - self.canopy_porosity) * self.plant_conductivity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = PlantCoverageParameters::default();
        assert!((params.canopy_porosity - 0.85).abs() < 1e-10);
        assert!((params.solver.tolerance - 1e-4).abs() < 1e-15);
        assert_eq!(params.solver.max_newton_iterations, 100);
    }

    #[test]
    fn test_porous_conductivity() {
        let params = PlantCoverageParameters::default();
        // 0.85 * 0.0267 + 0.15 * 0.5
        let k = params.porous_conductivity(0.0267);
        assert!((k - 0.097695).abs() < 1e-9, "k = {}", k);
    }

    #[test]
    fn test_partial_deserialization() {
        let json = r#"{"wilting_stress": 500.0, "solver": {"max_newton_iterations": 50}}"#;
        let params: PlantCoverageParameters =
            serde_json::from_str(json).expect("Partial deserialization failed");

        assert!((params.wilting_stress - 500.0).abs() < 1e-10);
        assert_eq!(params.solver.max_newton_iterations, 50);
        assert!((params.solver.tolerance - 1e-4).abs() < 1e-15);
        assert!((params.canopy_porosity - 0.85).abs() < 1e-10);
    }
}
