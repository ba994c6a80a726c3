//! Vertical loads: embedment from shaft friction in a single layer
//!
//! For every load position and every layer the pile is assumed to draw all
//! of its vertical capacity from that one layer: L = N_Ed / (τ · U).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::soil::{DesignFactors, LoadCase, PileGeometry, SoilLayer};
use crate::trace::{Protocol, Traced};
use crate::types::*;

/// Which vertical action sets the depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoverningCase {
    Compression,
    Tension,
    /// Neither compression nor tension acts
    None,
}

impl fmt::Display for GoverningCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoverningCase::Compression => write!(f, "compression"),
            GoverningCase::Tension => write!(f, "tension"),
            GoverningCase::None => write!(f, "-"),
        }
    }
}

/// One position × layer row of the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalRow {
    pub position: String,
    /// Index of the layer in the profile (0-based)
    pub layer_index: usize,
    pub layer: String,
    /// Resistance per meter τ · U (kN/m)
    pub resistance_per_m_kn: f64,
    /// N_Ed,D = N_d · γ_D
    pub design_compression_kn: f64,
    pub compression_depth_m: f64,
    /// N_Ed,Z = N_z · γ_Z
    pub design_tension_kn: f64,
    pub tension_depth_m: f64,
    pub governing: GoverningCase,
    /// L_v = max(L_D, L_Z)
    pub governing_depth_m: f64,
}

/// Layer left out of the table because τ is not positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedLayer {
    pub layer_index: usize,
    pub layer: String,
    pub shaft_friction_kn_m2: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerticalTable {
    pub rows: Vec<VerticalRow>,
    pub excluded_layers: Vec<ExcludedLayer>,
}

impl VerticalTable {
    /// Rows of one position, in layer order
    pub fn rows_for<'a>(&'a self, position: &'a str) -> impl Iterator<Item = &'a VerticalRow> + 'a {
        self.rows.iter().filter(move |row| row.position == position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum VerticalError {
    #[error("Design factor {name} = {value} must be finite and > 0")]
    InvalidFactor { name: String, value: f64 },

    #[error("Pile perimeter U = {value} m must be finite and > 0")]
    InvalidPerimeter { value: f64 },

    #[error("No layer with shaft friction τ > 0")]
    NoLayers,

    #[error("At least one load position is required")]
    NoLoads,
}

/// Layer label, falling back to its position in the profile
pub fn layer_label(layer: &SoilLayer, index: usize) -> String {
    let name = layer.name.trim();
    if name.is_empty() {
        format!("Layer {}", index + 1)
    } else {
        name.to_string()
    }
}

/// Raw load for scaling: negative or missing values count as zero
fn raw_load(force: Force) -> f64 {
    let kn = force.get::<kilonewton>();
    if kn.is_finite() { kn.max(0.0) } else { 0.0 }
}

/// Depth from design load and resistance per meter, 0 without load
fn depth_for(design_kn: f64, resistance_per_m: f64) -> f64 {
    if design_kn <= 0.0 {
        return 0.0;
    }
    safe_div(design_kn, resistance_per_m).unwrap_or(0.0)
}

fn governing_case(design_compression: f64, design_tension: f64, l_d: f64, l_z: f64) -> (GoverningCase, f64) {
    if design_compression <= 0.0 && design_tension <= 0.0 {
        (GoverningCase::None, 0.0)
    } else if l_d >= l_z {
        (GoverningCase::Compression, l_d)
    } else {
        (GoverningCase::Tension, l_z)
    }
}

/// Single-layer table for all positions and layers
///
/// Loads are characteristic; γ_D and γ_Z are applied here.
pub fn single_layer_table(
    layers: &[SoilLayer],
    loads: &[LoadCase],
    factors: &DesignFactors,
    pile: &PileGeometry,
) -> Traced<VerticalTable, VerticalError> {
    let mut protocol = Protocol::titled("Vertical loads: single-layer approach (pile founded in one layer only)");
    protocol.line("L = N_Ed / (τ · U)");
    protocol.blank();

    for (name, value) in [("gamma_d", factors.gamma_d), ("gamma_z", factors.gamma_z)] {
        if !(value.is_finite() && value > 0.0) {
            let e = VerticalError::InvalidFactor {
                name: name.to_string(),
                value,
            };
            protocol.line(e.to_string());
            return Traced::fail(e, protocol);
        }
    }

    let perimeter = pile.perimeter_m();
    if !(perimeter.is_finite() && perimeter > 0.0) {
        let e = VerticalError::InvalidPerimeter { value: perimeter };
        protocol.line(e.to_string());
        return Traced::fail(e, protocol);
    }

    let mut excluded_layers = Vec::new();
    let mut active = Vec::new();
    for (index, layer) in layers.iter().enumerate() {
        let tau = layer.shaft_friction_kn_m2();
        let label = layer_label(layer, index);
        if tau.is_finite() && tau > 0.0 {
            active.push((index, label, layer.shaft_friction));
        } else {
            tracing::warn!(layer = %label, tau, "layer excluded from vertical table");
            excluded_layers.push(ExcludedLayer {
                layer_index: index,
                layer: label,
                shaft_friction_kn_m2: tau,
            });
        }
    }

    if active.is_empty() {
        protocol.line(VerticalError::NoLayers.to_string());
        return Traced::fail(VerticalError::NoLayers, protocol);
    }
    if loads.is_empty() {
        protocol.line(VerticalError::NoLoads.to_string());
        return Traced::fail(VerticalError::NoLoads, protocol);
    }

    protocol.line("Input:");
    protocol.line(format!("- perimeter U = {}", DisplayLength(pile.perimeter)));
    protocol.line(format!("- γD = {:.2}   γZ = {:.2}", factors.gamma_d, factors.gamma_z));
    protocol.blank();
    protocol.line("Layers (τ):");
    for (_, label, tau) in &active {
        protocol.line(format!("- {label}: τ = {}", DisplayPressure(*tau)));
    }
    for excluded in &excluded_layers {
        protocol.line(format!(
            "- {}: excluded (τ = {})",
            excluded.layer,
            format_decimal_de(excluded.shaft_friction_kn_m2, 1)
        ));
    }
    protocol.blank();
    protocol.heading("Table (per load position × per layer)");
    protocol.blank();

    let mut rows = Vec::with_capacity(loads.len() * active.len());
    for load in loads {
        let n_d = raw_load(load.compression);
        let n_z = raw_load(load.tension);
        let design_compression = n_d * factors.gamma_d;
        let design_tension = n_z * factors.gamma_z;

        protocol.line(format!("Load position: {}", load.position));
        protocol.line(format!("  Nd = {n_d:.1} kN -> NEd,D = {design_compression:.1} kN"));
        protocol.line(format!("  Nz = {n_z:.1} kN -> NEd,Z = {design_tension:.1} kN"));

        for (index, label, shaft_friction) in &active {
            let tau = shaft_friction.get::<kilopascal>();
            let resistance_per_m = tau * perimeter;
            let l_d = depth_for(design_compression, resistance_per_m);
            let l_z = depth_for(design_tension, resistance_per_m);
            let (governing, l_v) = governing_case(design_compression, design_tension, l_d, l_z);

            protocol.line(format!(
                "  - {label}: τ={tau:.1} => R'={resistance_per_m:.1} kN/m | L_D={l_d:.2} m | L_Z={l_z:.2} m | governing={governing} | L_v={l_v:.2} m"
            ));

            rows.push(VerticalRow {
                position: load.position.clone(),
                layer_index: *index,
                layer: label.clone(),
                resistance_per_m_kn: resistance_per_m,
                design_compression_kn: design_compression,
                compression_depth_m: l_d,
                design_tension_kn: design_tension,
                tension_depth_m: l_z,
                governing,
                governing_depth_m: l_v,
            });
        }
        protocol.blank();
    }

    protocol.heading("End of table (single-layer approach)");
    tracing::debug!(rows = rows.len(), excluded = excluded_layers.len(), "vertical table complete");

    Traced::ok(VerticalTable { rows, excluded_layers }, protocol)
}
