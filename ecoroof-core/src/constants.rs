//! Physical constants shared by the surface balance models.

use crate::FloatValue;

/// Offset between Celsius and Kelvin.
pub const KELVIN: FloatValue = 273.15;

/// Stefan-Boltzmann constant (W/m^2/K^4).
pub const STEFAN_BOLTZMANN: FloatValue = 5.6697e-8;

/// Specific heat of air at constant pressure (J/kg/K).
pub const CP_AIR: FloatValue = 1005.0;

/// Gas constant of dry air (J/kg/K).
pub const R_AIR: FloatValue = 286.0;

/// Density of water used to convert latent fluxes to depths (kg/m^3).
pub const WATER_DENSITY: FloatValue = 990.0;

/// Thermal conductivity of air (W/m/K).
pub const K_AIR: FloatValue = 0.0267;

/// Kinematic viscosity of air at 300 K (m^2/s).
pub const NU_AIR: FloatValue = 15.66e-6;

/// Prandtl number of air.
pub const PRANDTL_AIR: FloatValue = 0.71;

/// Gravitational acceleration (m/s^2).
pub const GRAVITY: FloatValue = 9.81;

/// Latent heat used when ice sublimates or frost forms (J/kg).
pub const LATENT_HEAT_FROST: FloatValue = 2.838e6;

/// Lewis number for heat and vapour transfer from leaves.
pub const LEWIS_NUMBER: FloatValue = 1.0;
