//! Call sites of the horizontal equilibrium solver
//!
//! `solve_for_layer` is the batch path: one load position against one layer,
//! with design factors applied here. `solve_standalone` is the single check
//! that takes decimal strings as typed and design values for H and M.

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::physics::equilibrium::*;
use crate::physics::shaft_friction::layer_label;
use crate::soil::{DesignFactors, LoadCase, PileGeometry, SoilLayer};
use crate::trace::{Protocol, Traced};
use crate::types::*;

/// Start step of the standalone check
pub const STANDALONE_DEPTH_STEP_M: f64 = 0.5;

/// Start depth of the standalone check
pub const STANDALONE_DEPTH_START_M: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HorizontalOutcome {
    /// H and M are both zero, no embedment needed for them
    NoDemand,
    Solved(EquilibriumResult),
    Failed(HorizontalError),
}

/// One position × layer result of the horizontal table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalRow {
    pub position: String,
    pub layer_index: usize,
    pub layer: String,
    pub action: DesignAction,
    pub outcome: HorizontalOutcome,
    pub protocol: Protocol,
}

impl HorizontalRow {
    /// L_h, NaN when the row failed
    pub fn required_depth_m(&self) -> f64 {
        match &self.outcome {
            HorizontalOutcome::NoDemand => 0.0,
            HorizontalOutcome::Solved(result) => result.required_depth_m,
            HorizontalOutcome::Failed(_) => f64::NAN,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, HorizontalOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&HorizontalError> {
        match &self.outcome {
            HorizontalOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Solver input for one layer: β from the slope band, c·α_c, δ from the wall friction mode
pub fn layer_input(
    layer: &SoilLayer,
    factors: &DesignFactors,
    pile: &PileGeometry,
    action: DesignAction,
) -> EquilibriumInput {
    let phi = layer.friction_angle;
    EquilibriumInput {
        beta_deg: layer.slope.effective_angle().get::<degree>(),
        phi_deg: phi.get::<degree>(),
        cohesion_kn_m2: factors.alpha_c * layer.cohesion.get::<kilopascal>(),
        unit_weight_kn_m3: layer.unit_weight.value(),
        delta_deg: factors.wall_friction.angle_for(phi).get::<degree>(),
        width_m: pile.width_m(),
        action,
    }
}

/// Factored horizontal action of a load case
pub fn design_action(load: &LoadCase, factors: &DesignFactors) -> DesignAction {
    DesignAction {
        h_kn: load.horizontal.get::<kilonewton>() * factors.eta,
        m_knm: load.moment.get::<kilonewton_meter>() * factors.eta,
    }
}

/// Horizontal embedment of one load position in one layer
pub fn solve_for_layer(
    layer: &SoilLayer,
    layer_index: usize,
    load: &LoadCase,
    factors: &DesignFactors,
    pile: &PileGeometry,
    config: &SolverConfig,
) -> HorizontalRow {
    let label = layer_label(layer, layer_index);
    let action = design_action(load, factors);
    let mut protocol = Protocol::new();
    protocol.line(format!(
        "{} / {label}: H_Ed = {}, M_Ed = {} (η = {:.2})",
        load.position,
        DisplayForce(kilonewtons(action.h_kn)),
        DisplayTorque(kilonewton_meters(action.m_knm)),
        factors.eta
    ));

    let row = |outcome: HorizontalOutcome, protocol: Protocol| HorizontalRow {
        position: load.position.clone(),
        layer_index,
        layer: label.clone(),
        action,
        outcome,
        protocol,
    };

    if !layer.participates() {
        let e = HorizontalError::invalid_input(
            "layer",
            format!(
                "thickness {} and unit weight {} must be > 0",
                DisplayLength(layer.thickness),
                DisplayUnitWeight(layer.unit_weight)
            ),
        );
        tracing::warn!(position = %load.position, layer = %label, "layer skipped for horizontal check");
        protocol.line(format!("Skipped: {e}"));
        return row(HorizontalOutcome::Failed(e), protocol);
    }

    if action.is_zero() {
        protocol.line("No horizontal force or moment: L_h = 0");
        return row(HorizontalOutcome::NoDemand, protocol);
    }

    let input = layer_input(layer, factors, pile, action);
    let traced = solve_equilibrium(&input, config);
    protocol.extend(traced.protocol);

    let outcome = match traced.outcome {
        Ok(result) => HorizontalOutcome::Solved(result),
        Err(e) => {
            tracing::warn!(position = %load.position, layer = %label, error = %e, "horizontal check failed");
            HorizontalOutcome::Failed(e)
        }
    };
    row(outcome, protocol)
}

/// Decimal strings of the standalone check, as typed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandaloneInput {
    pub beta_deg: String,
    pub phi_deg: String,
    pub cohesion_kn_m2: String,
    pub unit_weight_kn_m3: String,
    pub delta_deg: String,
    pub width_m: String,
    /// H_Ed, already factored
    pub h_kn: String,
    /// M_Ed, already factored
    pub m_knm: String,
    pub depth_start_m: Option<String>,
    pub depth_step_m: Option<String>,
}

fn parse_field(field: &str, raw: &str) -> Result<f64, HorizontalError> {
    parse_decimal(raw).map_err(|e| HorizontalError::invalid_input(field, e.to_string()))
}

fn parse_optional(field: &str, raw: Option<&str>, default: f64) -> Result<f64, HorizontalError> {
    parse_decimal_or(raw, default).map_err(|e| HorizontalError::invalid_input(field, e.to_string()))
}

fn parse_standalone(input: &StandaloneInput) -> Result<(EquilibriumInput, f64, f64), HorizontalError> {
    let equilibrium = EquilibriumInput {
        beta_deg: parse_field("beta_deg", &input.beta_deg)?,
        phi_deg: parse_field("phi_deg", &input.phi_deg)?,
        cohesion_kn_m2: parse_field("cohesion_kn_m2", &input.cohesion_kn_m2)?,
        unit_weight_kn_m3: parse_field("unit_weight_kn_m3", &input.unit_weight_kn_m3)?,
        delta_deg: parse_field("delta_deg", &input.delta_deg)?,
        width_m: parse_field("width_m", &input.width_m)?,
        action: DesignAction {
            h_kn: parse_field("h_kn", &input.h_kn)?,
            m_knm: parse_field("m_knm", &input.m_knm)?,
        },
    };
    let start = parse_optional("depth_start_m", input.depth_start_m.as_deref(), STANDALONE_DEPTH_START_M)?;
    let step = parse_optional("depth_step_m", input.depth_step_m.as_deref(), STANDALONE_DEPTH_STEP_M)?;
    Ok((equilibrium, start, step))
}

/// Single horizontal check from typed values
///
/// Start depth and step default to 3 m and 0.5 m unless given.
pub fn solve_standalone(
    input: &StandaloneInput,
    config: &SolverConfig,
) -> Traced<EquilibriumResult, HorizontalError> {
    match parse_standalone(input) {
        Ok((equilibrium, start, step)) => solve_equilibrium(&equilibrium, &config.with_depth_seed(start, step)),
        Err(e) => {
            let mut protocol = Protocol::titled("Vogt (1988): horizontally loaded pile in a slope");
            protocol.line(format!("Input rejected: {e}"));
            Traced::fail(e, protocol)
        }
    }
}
