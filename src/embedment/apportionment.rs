//! Apportioning a governing depth across the real layer stack
//!
//! Each layer has a single-layer depth: the embedment needed if the pile
//! stood in that layer alone. Going down the profile, a layer contributes
//! the fraction `depth_used / single_layer_depth` of the total demand until
//! the demand is used up or the layers run out.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::embedment::horizontal::HorizontalRow;
use crate::physics::shaft_friction::{layer_label, VerticalTable};
use crate::soil::{LoadCase, SoilLayer, Support, Zone};
use crate::types::max_finite;

/// Mechanism behind a layer's single-layer depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanism {
    /// Horizontal force and moment (L_h)
    Horizontal,
    /// Shaft friction (L_v)
    Vertical,
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mechanism::Horizontal => write!(f, "horizontal/moment"),
            Mechanism::Vertical => write!(f, "vertical"),
        }
    }
}

/// Single-layer depth of one layer for one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDemand {
    pub layer_index: usize,
    pub horizontal_depth_m: f64,
    pub vertical_depth_m: f64,
    /// max(L_h, L_v) over the finite ones, NaN if neither is
    pub governing_depth_m: f64,
    pub mechanism: Option<Mechanism>,
    /// The horizontal check of this layer gave no result
    pub horizontal_failed: bool,
}

impl LayerDemand {
    pub fn new(layer_index: usize, horizontal_depth_m: f64, vertical_depth_m: f64) -> Self {
        let governing = max_finite(horizontal_depth_m, vertical_depth_m);
        let mechanism = governing.map(|_| {
            if vertical_depth_m.is_finite() && !(horizontal_depth_m > vertical_depth_m) {
                Mechanism::Vertical
            } else {
                Mechanism::Horizontal
            }
        });
        Self {
            layer_index,
            horizontal_depth_m,
            vertical_depth_m,
            governing_depth_m: governing.unwrap_or(f64::NAN),
            mechanism,
            horizontal_failed: false,
        }
    }

    /// Layer without thickness or unit weight: no governing depth at all
    pub fn unusable(layer_index: usize, horizontal_depth_m: f64, vertical_depth_m: f64) -> Self {
        Self {
            layer_index,
            horizontal_depth_m,
            vertical_depth_m,
            governing_depth_m: f64::NAN,
            mechanism: None,
            horizontal_failed: false,
        }
    }
}

/// Per-layer governing depths of one position
///
/// Failed horizontal rows and layers missing from the vertical table count
/// as non-finite and drop out of the maximum. A failed horizontal row is
/// remembered on the demand. Layers that do not participate get no
/// governing depth, whatever the vertical table says.
pub fn governing_depths(
    layers: &[SoilLayer],
    position: &str,
    horizontal: &[HorizontalRow],
    vertical: &VerticalTable,
) -> Vec<LayerDemand> {
    layers
        .iter()
        .enumerate()
        .map(|(index, layer)| {
            let row = horizontal
                .iter()
                .find(|row| row.position == position && row.layer_index == index);
            let l_h = row.map_or(f64::NAN, HorizontalRow::required_depth_m);
            let l_v = vertical
                .rows_for(position)
                .find(|row| row.layer_index == index)
                .map_or(f64::NAN, |row| row.governing_depth_m);
            if !layer.participates() {
                return LayerDemand::unusable(index, l_h, l_v);
            }
            LayerDemand {
                horizontal_failed: row.is_none_or(HorizontalRow::is_failed),
                ..LayerDemand::new(index, l_h, l_v)
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApportionmentRow {
    pub layer_index: usize,
    pub layer: String,
    pub thickness_m: f64,
    pub governing_depth_m: f64,
    /// Share of the demand taken by this layer in %, `None` when skipped
    pub share_pct: Option<f64>,
    /// Demand still open after this layer in %
    pub remaining_pct: f64,
    pub depth_used_m: f64,
    pub cumulative_depth_m: f64,
    pub mechanism: Option<Mechanism>,
    /// Depth rests on L_v alone because the horizontal check failed
    pub horizontal_failed: bool,
}

impl ApportionmentRow {
    pub fn is_skipped(&self) -> bool {
        self.share_pct.is_none()
    }
}

/// Realized embedment of one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApportionmentResult {
    pub position: String,
    pub support: Support,
    pub zone: Zone,
    pub rows: Vec<ApportionmentRow>,
    /// Sum of the depth used in all layers
    pub total_depth_m: f64,
    /// Fraction of the demand left open (0 when satisfied)
    pub remaining_fraction: f64,
    /// At least one layer had a positive governing depth
    pub demanded: bool,
    /// Demand used up within the profile
    pub satisfied: bool,
}

impl ApportionmentResult {
    /// Demand remains after the last layer
    pub fn is_under_satisfied(&self) -> bool {
        self.demanded && !self.satisfied
    }

    /// Some layer could not be evaluated (non-finite governing depth)
    pub fn has_unknown_layers(&self) -> bool {
        self.rows.iter().any(|row| !row.governing_depth_m.is_finite())
    }

    /// A layer that supplied depth had no horizontal result
    pub fn has_failed_mechanism(&self) -> bool {
        self.rows.iter().any(|row| row.horizontal_failed && !row.is_skipped())
    }
}

/// Consume layer thickness top to bottom until the demand is used up
pub fn apportion(
    load: &LoadCase,
    layers: &[SoilLayer],
    demands: &[LayerDemand],
    tolerance: f64,
) -> ApportionmentResult {
    let mut rest = 1.0_f64;
    let mut total = 0.0;
    let mut demanded = false;
    let mut rows = Vec::with_capacity(layers.len());

    for (index, layer) in layers.iter().enumerate() {
        let thickness = layer.thickness_m();
        let demand = demands.iter().find(|d| d.layer_index == index);
        let governing = demand.map_or(f64::NAN, |d| d.governing_depth_m);
        let mechanism = demand.and_then(|d| d.mechanism);
        let horizontal_failed = demand.is_some_and(|d| d.horizontal_failed);
        let label = layer_label(layer, index);

        let usable = layer.participates() && governing.is_finite() && governing > 0.0;
        if usable {
            demanded = true;
        }
        if !usable || rest <= 0.0 {
            if !governing.is_finite() {
                tracing::warn!(position = %load.position, layer = %label, "no governing depth for layer");
            }
            rows.push(ApportionmentRow {
                layer_index: index,
                layer: label,
                thickness_m: thickness,
                governing_depth_m: governing,
                share_pct: None,
                remaining_pct: rest * 100.0,
                depth_used_m: 0.0,
                cumulative_depth_m: total,
                mechanism,
                horizontal_failed,
            });
            continue;
        }

        let depth_used = thickness.min(governing * rest);
        let share = depth_used / governing;
        rest = (rest - share).max(0.0);
        total += depth_used;

        rows.push(ApportionmentRow {
            layer_index: index,
            layer: label,
            thickness_m: thickness,
            governing_depth_m: governing,
            share_pct: Some(share * 100.0),
            remaining_pct: rest * 100.0,
            depth_used_m: depth_used,
            cumulative_depth_m: total,
            mechanism,
            horizontal_failed,
        });

        if rest <= tolerance {
            break;
        }
    }

    let satisfied = rest <= tolerance;
    if demanded && !satisfied {
        tracing::warn!(
            position = %load.position,
            remaining_pct = rest * 100.0,
            "layer profile too thin for the required embedment"
        );
    }

    ApportionmentResult {
        position: load.position.clone(),
        support: load.support,
        zone: load.zone,
        rows,
        total_depth_m: total,
        remaining_fraction: rest,
        demanded,
        satisfied,
    }
}
