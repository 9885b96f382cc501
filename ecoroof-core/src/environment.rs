//! Inputs supplied by the host building simulation each timestep.
//!
//! These types are the narrow interface to the collaborators that live outside
//! this workspace: the weather provider, the precipitation and irrigation
//! schedules, and the conduction transfer function (CTF) solver of the roof
//! construction. They carry values only; evaluating schedules or CTF series is
//! the host's job.

use serde::{Deserialize, Serialize};

use crate::constants::KELVIN;
use crate::convection::RoofGeometry;
use crate::FloatValue;

/// Identifier of a surface in the host model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub usize);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface {}", self.0)
    }
}

/// Outdoor conditions at the roof for the current timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivingConditions {
    /// Outdoor dry-bulb temperature at roof height (C).
    pub outdoor_dry_bulb: FloatValue,
    /// Wind speed at roof height (m/s).
    pub wind_speed: FloatValue,
    /// Outdoor relative humidity (%).
    pub relative_humidity: FloatValue,
    /// Barometric pressure (Pa).
    pub barometric_pressure: FloatValue,
    /// Beam solar radiation on the roof (W/m^2).
    pub beam_solar: FloatValue,
    /// Diffuse horizontal solar radiation (W/m^2).
    pub diffuse_solar: FloatValue,
    /// Effective sky radiant temperature (C).
    pub sky_temperature: FloatValue,
    /// Ground radiant temperature (C).
    pub ground_temperature: FloatValue,
}

impl Default for DrivingConditions {
    fn default() -> Self {
        Self {
            outdoor_dry_bulb: 20.0,
            wind_speed: 2.0,
            relative_humidity: 50.0,
            barometric_pressure: 101325.0,
            beam_solar: 0.0,
            diffuse_solar: 0.0,
            sky_temperature: 10.0,
            ground_temperature: 20.0,
        }
    }
}

impl DrivingConditions {
    pub fn outdoor_kelvin(&self) -> FloatValue {
        self.outdoor_dry_bulb + KELVIN
    }

    pub fn sky_kelvin(&self) -> FloatValue {
        self.sky_temperature + KELVIN
    }

    pub fn ground_kelvin(&self) -> FloatValue {
        self.ground_temperature + KELVIN
    }

    /// Shortwave incident on the surface: beam plus weighted diffuse (W/m^2).
    pub fn incident_shortwave(&self, anisotropic_sky_multiplier: FloatValue) -> FloatValue {
        self.beam_solar + anisotropic_sky_multiplier * self.diffuse_solar
    }
}

/// Geometry and view factors of a vegetated roof surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofSurface {
    pub id: SurfaceId,
    pub zone: usize,
    /// Construction index; every ecoroof surface is expected to share one.
    pub construction: usize,
    /// Surface area (m^2).
    pub area: FloatValue,
    pub view_factor_sky: FloatValue,
    pub view_factor_ground: FloatValue,
    /// Weight of diffuse solar reaching the surface.
    pub anisotropic_sky_multiplier: FloatValue,
}

impl RoofSurface {
    /// A flat roof: full sky view and isotropic diffuse.
    pub fn flat(id: usize, area: FloatValue) -> Self {
        Self {
            id: SurfaceId(id),
            zone: 0,
            construction: 0,
            area,
            view_factor_sky: 1.0,
            view_factor_ground: 0.0,
            anisotropic_sky_multiplier: 1.0,
        }
    }

    pub fn geometry(&self) -> RoofGeometry {
        RoofGeometry::new(self.area)
    }
}

/// Surface roughness class of the growing medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Roughness {
    VeryRough,
    Rough,
    MediumRough,
    MediumSmooth,
    Smooth,
    VerySmooth,
}

impl Roughness {
    /// Aerodynamic roughness length of the ground (m).
    pub fn roughness_length(&self) -> FloatValue {
        match self {
            Roughness::VerySmooth => 0.0008,
            Roughness::Smooth => 0.0010,
            Roughness::MediumSmooth => 0.0015,
            Roughness::MediumRough => 0.0020,
            Roughness::Rough => 0.0030,
            Roughness::VeryRough => 0.005,
        }
    }
}

/// Current-step CTF terms of the roof construction and its inside surface.
///
/// Coefficient fields are the zeroth terms of the CTF series; the remaining
/// fields are the history and interior terms the host has already evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductionCoefficients {
    pub ctf_cross: FloatValue,
    pub ctf_inside: FloatValue,
    pub ctf_outside: FloatValue,
    pub ctf_source_in: FloatValue,
    /// History part of the outside flux (W/m^2).
    pub const_out_part: FloatValue,
    /// History part of the inside flux (W/m^2).
    pub const_in_part: FloatValue,
    /// Shortwave absorbed at the inside face (W/m^2).
    pub inside_shortwave_absorbed: FloatValue,
    /// Thermal radiation absorbed at the inside face (W/m^2).
    pub inside_thermal_absorbed: FloatValue,
    pub source_history: FloatValue,
    /// Inside convection coefficient (W/m^2/K).
    pub inside_convection: FloatValue,
    /// Zone mean air temperature (C).
    pub zone_air_temperature: FloatValue,
    /// Net longwave exchanged with other interior surfaces (W/m^2).
    pub net_longwave_to_surface: FloatValue,
    /// Inside surface temperature (C).
    pub inside_surface_temperature: FloatValue,
}

impl ConductionCoefficients {
    /// Reduce the CTF terms to a flux linear in the outside temperature.
    ///
    /// When the cross term is significant the inside surface balance is
    /// eliminated; otherwise the last inside temperature is used directly.
    pub fn soil_heat_flux_terms(&self) -> SoilHeatFlux {
        let (part1, f1) = if self.ctf_cross > 0.01 {
            let f1 = self.ctf_cross / (self.ctf_inside + self.inside_convection);
            let part1 = -self.const_out_part
                + f1 * (self.const_in_part
                    + self.inside_shortwave_absorbed
                    + self.inside_thermal_absorbed
                    + self.ctf_source_in * self.source_history
                    + self.inside_convection * self.zone_air_temperature
                    + self.net_longwave_to_surface);
            (part1, f1)
        } else {
            (
                -self.const_out_part + self.ctf_cross * self.inside_surface_temperature,
                0.0,
            )
        };
        SoilHeatFlux {
            part1,
            part2: self.ctf_outside - f1 * self.ctf_cross,
        }
    }
}

/// Conduction into the roof as $Q = -q_1 + q_2 T_c$.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SoilHeatFlux {
    pub part1: FloatValue,
    pub part2: FloatValue,
}

impl SoilHeatFlux {
    /// Heat conducted from the outside face into the construction (W/m^2).
    pub fn into_construction(&self, surface_temperature_c: FloatValue) -> FloatValue {
        -self.part1 + self.part2 * surface_temperature_c
    }
}

/// Irrigation control applied by the moisture updater.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IrrigationMode {
    #[default]
    None,
    /// Apply the scheduled amount unconditionally.
    Scheduled,
    /// Apply the scheduled amount only while the top layer is below
    /// `threshold` times saturation.
    Smart { threshold: FloatValue },
}

/// Water supplied to the roof this timestep.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterInputs {
    /// Precipitation depth (m), `None` when no rain schedule exists.
    pub precipitation: Option<FloatValue>,
    /// Scheduled irrigation depth (m).
    pub irrigation: FloatValue,
    pub irrigation_mode: IrrigationMode,
}

impl WaterInputs {
    pub fn dry() -> Self {
        Self::default()
    }

    pub fn rain(depth: FloatValue) -> Self {
        Self {
            precipitation: Some(depth),
            ..Self::default()
        }
    }
}
