//! Moisture exchange between the near-surface layer and the root zone.
//!
//! Two interchangeable formulations:
//!
//! - [`diffuse`]: relaxes the two layers toward equal moisture at fixed rates,
//!   faster downward than upward.
//! - [`UnsaturatedFlow`]: Darcy flow between the layer centres with
//!   van Genuchten-Mualem conductivity and capillary potential, plus gravity
//!   drainage out of the bottom of the root zone.
//!
//! Both conserve water: anything that leaves the two layers is returned as
//! runoff.

use ecoroof_core::diagnostics::RecurringWarning;
use ecoroof_core::state::MoistureState;
use ecoroof_core::FloatValue;
use serde::{Deserialize, Serialize};

use crate::parameters::MoistureTransportParameters;

/// Depths and moisture limits of the two soil layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilLayers {
    /// Near-surface layer thickness (m).
    pub top_depth: FloatValue,
    /// Root zone thickness (m).
    pub root_depth: FloatValue,
    /// Saturation moisture (m^3/m^3).
    pub saturation: FloatValue,
    /// Residual moisture (m^3/m^3).
    pub residual: FloatValue,
}

impl SoilLayers {
    pub fn thickness(&self) -> FloatValue {
        self.top_depth + self.root_depth
    }

    /// Highest moisture either layer holds after an update.
    pub fn ceiling(&self) -> FloatValue {
        0.9999 * self.saturation
    }

    /// Lowest moisture either layer holds after an update.
    pub fn floor(&self) -> FloatValue {
        1.00001 * self.residual
    }

    /// Lower bound used by the unsaturated-flow formulation.
    pub fn flow_floor(&self) -> FloatValue {
        1.01 * self.residual
    }

    /// $(\theta - \theta_r) / (\theta_s - \theta_r)$
    pub fn relative_saturation(&self, moisture: FloatValue) -> FloatValue {
        (moisture - self.residual) / (self.saturation - self.residual)
    }

    pub fn water_depth(&self, moisture: &MoistureState) -> FloatValue {
        moisture.water_depth(self.top_depth, self.root_depth)
    }
}

/// Relax the layers toward each other over `seconds`.
///
/// The exchanged depth is bounded by both the moisture difference and the
/// free capacity of the receiving layer, then scaled by the rate.
pub fn diffuse(
    moisture: &mut MoistureState,
    layers: &SoilLayers,
    parameters: &MoistureTransportParameters,
    seconds: FloatValue,
) {
    let ceiling = layers.ceiling();
    let (top_depth, root_depth) = (layers.top_depth, layers.root_depth);

    if moisture.top > moisture.root {
        let transfer = ((ceiling - moisture.root) * root_depth)
            .min((moisture.top - moisture.root) * top_depth)
            .max(0.0)
            * parameters.diffusion_down_rate
            * seconds;
        moisture.top -= transfer / top_depth;
        moisture.root += transfer / root_depth;
    } else if moisture.root > moisture.top {
        let transfer = ((ceiling - moisture.top) * top_depth)
            .min((moisture.root - moisture.top) * root_depth)
            .max(0.0)
            * parameters.diffusion_up_rate
            * seconds;
        moisture.top += transfer / top_depth;
        moisture.root -= transfer / root_depth;
    }
}

/// Layer named in saturation warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Top,
    Root,
}

/// van Genuchten-Mualem unsaturated flow between the two layers.
///
/// With relative saturation $S$, $m = 1 - 1/n$:
///
/// $$K(S) = K_s S^{\lambda} \left(1 - (1 - S^{1/m})^{m}\right)^2$$
///
/// $$\psi(S) = -\frac{1}{\alpha} \left(S^{-1/m} - 1\right)^{1/n}$$
///
/// The downward flux between layer centres a distance $\Delta z$ apart is
///
/// $$q = \bar{K} \left(\frac{\psi_{top} - \psi_{root}}{\Delta z} + 1\right)$$
#[derive(Debug, Clone)]
pub struct UnsaturatedFlow {
    alpha: FloatValue,
    n: FloatValue,
    pore_connectivity: FloatValue,
    saturated_conductivity: FloatValue,
    min_relative_saturation: FloatValue,
    min_drainage_rate: FloatValue,
    top_warning: RecurringWarning,
    root_warning: RecurringWarning,
}

impl UnsaturatedFlow {
    pub fn from_parameters(parameters: &MoistureTransportParameters) -> Self {
        let floor = parameters.min_relative_saturation;
        Self {
            alpha: parameters.van_genuchten_alpha,
            n: parameters.van_genuchten_n,
            pore_connectivity: parameters.pore_connectivity,
            saturated_conductivity: parameters.saturated_conductivity,
            min_relative_saturation: floor,
            min_drainage_rate: parameters.min_drainage_rate,
            top_warning: RecurringWarning::new(format!(
                "Relative saturation of the near-surface layer below {}, clamped",
                floor
            )),
            root_warning: RecurringWarning::new(format!(
                "Relative saturation of the root zone below {}, clamped",
                floor
            )),
        }
    }

    /// Unsaturated hydraulic conductivity (m/s).
    pub fn hydraulic_conductivity(&self, relative_saturation: FloatValue) -> FloatValue {
        let m = (self.n - 1.0) / self.n;
        let s = relative_saturation;
        let inner = 1.0 - (1.0 - s.powf(1.0 / m)).powf(m);
        self.saturated_conductivity * s.powf(self.pore_connectivity) * inner * inner
    }

    /// Capillary potential (m of water, negative below saturation).
    pub fn capillary_potential(&self, relative_saturation: FloatValue) -> FloatValue {
        let m = (self.n - 1.0) / self.n;
        -(1.0 / self.alpha)
            * (relative_saturation.powf(-1.0 / m) - 1.0)
                .max(0.0)
                .powf(1.0 / self.n)
    }

    fn clamped_saturation(&mut self, layer: Layer, layers: &SoilLayers, moisture: FloatValue) -> FloatValue {
        let s = layers.relative_saturation(moisture);
        if s < self.min_relative_saturation {
            match layer {
                Layer::Top => self.top_warning.record(s),
                Layer::Root => self.root_warning.record(s),
            }
            return self.min_relative_saturation;
        }
        s.min(1.0)
    }

    /// Advance the layers by `seconds`, returning the water lost to runoff and drainage (m).
    pub fn step(
        &mut self,
        moisture: &mut MoistureState,
        layers: &SoilLayers,
        seconds: FloatValue,
    ) -> FloatValue {
        let s_top = self.clamped_saturation(Layer::Top, layers, moisture.top);
        let s_root = self.clamped_saturation(Layer::Root, layers, moisture.root);

        let k_top = self.hydraulic_conductivity(s_top);
        let k_root = self.hydraulic_conductivity(s_root);
        let spacing = 0.5 * layers.thickness();
        let flux = 0.5
            * (k_top + k_root)
            * ((self.capillary_potential(s_top) - self.capillary_potential(s_root)) / spacing
                + 1.0);

        let (top_depth, root_depth) = (layers.top_depth, layers.root_depth);
        let lower = layers.flow_floor();
        let ceiling = layers.ceiling();
        let demand = flux * seconds;
        let mut runoff = 0.0;

        if demand > 0.0 {
            let moved = demand.min(((moisture.top - lower) * top_depth).max(0.0));
            let accepted = moved.min(((ceiling - moisture.root) * root_depth).max(0.0));
            moisture.top -= moved / top_depth;
            moisture.root += accepted / root_depth;
            runoff += moved - accepted;
        } else if demand < 0.0 {
            let moved = (-demand).min(((moisture.root - lower) * root_depth).max(0.0));
            let accepted = moved.min(((ceiling - moisture.top) * top_depth).max(0.0));
            moisture.root -= moved / root_depth;
            moisture.top += accepted / top_depth;
            runoff += moved - accepted;
        }

        // Gravity drainage below about one drop per hour is ignored
        let drainage_rate = if k_root * 3600.0 <= self.min_drainage_rate {
            0.0
        } else {
            k_root
        };
        let drained =
            (drainage_rate * seconds).min(((moisture.root - lower) * root_depth).max(0.0));
        moisture.root -= drained / root_depth;
        runoff += drained;
        runoff
    }

    /// Warnings raised when relative saturation fell below its floor.
    pub fn warnings(&self) -> [&RecurringWarning; 2] {
        [&self.top_warning, &self.root_warning]
    }
}
