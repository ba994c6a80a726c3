//! Embedment of a horizontally loaded pile in a slope (after Vogt, 1988)
//!
//! The pile rotates about a pivot at depth t. Above the pivot the passive
//! wedge must supply Eph_erf = (H·t + M) / (t/3). The depth search walks t
//! in the direction that closes the gap between available and required
//! resistance, reversing and halving the step on every overshoot until the
//! step drops to the tolerance. A depth increment Δt below the pivot then
//! accounts for the counter-pressure zone.
//!
//! The solver takes design actions (already multiplied by η). Adapters in
//! `embedment::horizontal` build its input from layers and load cases.

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::physics::earth_resistance::*;
use crate::trace::{Protocol, Traced};
use crate::types::numeric::safe_div_eps;

/// Horizontal force and moment at ground level, factored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignAction {
    /// H_Ed (kN)
    pub h_kn: f64,
    /// M_Ed (kNm)
    pub m_knm: f64,
}

impl DesignAction {
    pub fn is_zero(&self) -> bool {
        self.h_kn == 0.0 && self.m_knm == 0.0
    }
}

/// Everything one equilibrium search needs, in solver units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumInput {
    pub beta_deg: f64,
    pub phi_deg: f64,
    /// Effective cohesion (α_c already applied), kN/m²
    pub cohesion_kn_m2: f64,
    pub unit_weight_kn_m3: f64,
    pub delta_deg: f64,
    pub width_m: f64,
    pub action: DesignAction,
}

/// Converged horizontal equilibrium
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumResult {
    /// Pivot depth t
    pub pivot_depth_m: f64,
    /// Critical slip angle θ_min at t
    pub theta_min_deg: f64,
    /// Available resistance Eph at t
    pub eph_kn: f64,
    /// Required resistance Eph_erf at t
    pub eph_required_kn: f64,
    /// σEph = 2·Eph / t
    pub sigma_eph_kn_m2: f64,
    /// Δt below the pivot
    pub depth_correction_m: f64,
    /// L_h = t + Δt
    pub required_depth_m: f64,
    /// Eph₂ = σEph · 2 · Δt (check value)
    pub eph2_kn: f64,
    /// Wedge geometry at θ_min
    pub aux_length_m: f64,
    pub slip_length_m: f64,
    pub wedge_area_m2: f64,
    /// Depth steps taken
    pub iterations: usize,
    /// Signed step at termination, |Δt| ≤ tolerance
    pub final_step_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum HorizontalError {
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Numerical guard tripped in {stage}: {detail}")]
    GuardFailure { stage: String, detail: String },

    #[error("{stage} did not converge after {iterations} iterations (last depth {depth_m:.3} m)")]
    NotConverged {
        stage: String,
        iterations: usize,
        depth_m: f64,
    },
}

impl HorizontalError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        HorizontalError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn guard_failure(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        HorizontalError::GuardFailure {
            stage: stage.into(),
            detail: detail.into(),
        }
    }

    /// Short code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            HorizontalError::InvalidInput { .. } => "INVALID_INPUT",
            HorizontalError::GuardFailure { .. } => "GUARD_FAILURE",
            HorizontalError::NotConverged { .. } => "NOT_CONVERGED",
        }
    }
}

fn validate(input: &EquilibriumInput, config: &SolverConfig) -> Result<(), HorizontalError> {
    let fields = [
        ("beta_deg", input.beta_deg),
        ("phi_deg", input.phi_deg),
        ("cohesion_kn_m2", input.cohesion_kn_m2),
        ("unit_weight_kn_m3", input.unit_weight_kn_m3),
        ("delta_deg", input.delta_deg),
        ("width_m", input.width_m),
        ("h_kn", input.action.h_kn),
        ("m_knm", input.action.m_knm),
        ("depth_start_m", config.depth_start_m),
        ("depth_step_m", config.depth_step_m),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(HorizontalError::invalid_input(*field, "missing or not finite"));
    }

    for (field, value) in [
        ("width_m", input.width_m),
        ("unit_weight_kn_m3", input.unit_weight_kn_m3),
        ("depth_start_m", config.depth_start_m),
        ("depth_step_m", config.depth_step_m),
    ] {
        if value <= 0.0 {
            return Err(HorizontalError::invalid_input(field, format!("{value} must be > 0")));
        }
    }

    if !(0.0..90.0).contains(&input.phi_deg) {
        return Err(HorizontalError::invalid_input(
            "phi_deg",
            format!("{}° outside 0° ≤ φ < 90°", input.phi_deg),
        ));
    }
    if input.delta_deg.abs() >= 90.0 {
        return Err(HorizontalError::invalid_input(
            "delta_deg",
            format!("|{}°| must be below 90°", input.delta_deg),
        ));
    }
    Ok(())
}

/// Move t by dt, halving dt (same direction) while the move would leave t ≤ 0
fn advance(depth: f64, step: f64, tolerance: f64) -> Option<(f64, f64)> {
    let mut step = step;
    while depth + step <= 0.0 {
        step /= 2.0;
        if step.abs() <= tolerance {
            return None;
        }
    }
    Some((depth + step, step))
}

/// Find the pivot depth where Eph meets Eph_erf and add the depth increment
pub fn solve_equilibrium(
    input: &EquilibriumInput,
    config: &SolverConfig,
) -> Traced<EquilibriumResult, HorizontalError> {
    let mut protocol = Protocol::titled("Vogt (1988): horizontally loaded pile in a slope");

    if let Err(e) = validate(input, config) {
        protocol.line(format!("Input rejected: {e}"));
        return Traced::fail(e, protocol);
    }

    let EquilibriumInput {
        beta_deg,
        phi_deg,
        cohesion_kn_m2,
        unit_weight_kn_m3,
        delta_deg,
        width_m,
        action,
    } = *input;
    let DesignAction { h_kn, m_knm } = action;

    protocol.line(format!(
        "Input: β = {beta_deg:.2}°  φ = {phi_deg:.2}°  c = {cohesion_kn_m2:.2} kN/m²  γ = {unit_weight_kn_m3:.2} kN/m³  δ = {delta_deg:.2}°  b = {width_m:.3} m"
    ));
    protocol.line(format!(
        "Actions: H = {h_kn:.2} kN  M = {m_knm:.2} kNm  start t = {:.3} m  start Δt = {:.3} m",
        config.depth_start_m, config.depth_step_m
    ));
    protocol.blank();

    let params = WedgeParams::from_degrees(
        beta_deg,
        phi_deg,
        delta_deg,
        cohesion_kn_m2,
        unit_weight_kn_m3,
        width_m,
    );
    let eps = config.guard_epsilon;
    let tolerance = config.depth_tolerance_m;

    let mut depth = config.depth_start_m;
    let mut step = config.depth_step_m;

    for iteration in 1..=config.max_depth_iterations {
        let search = match minimize_resistance(&params, depth, config) {
            Ok(search) => search,
            Err(ThetaSearchError::NotConverged { iterations }) => {
                let e = HorizontalError::NotConverged {
                    stage: "slip-angle search".into(),
                    iterations,
                    depth_m: depth,
                };
                protocol.line(format!("t = {depth:.3} m: {e}"));
                return Traced::fail(e, protocol);
            }
            Err(e) => {
                let e = HorizontalError::guard_failure("slip-angle search", format!("t = {depth:.3} m: {e}"));
                protocol.line(format!("t = {depth:.3} m: {e}"));
                return Traced::fail(e, protocol);
            }
        };

        let wedge = search.critical;
        let eph = wedge.eph_kn;
        let eph_required = match safe_div_eps(h_kn * depth + m_knm, depth / 3.0, eps) {
            Ok(value) => value,
            Err(e) => {
                let e = HorizontalError::guard_failure("required resistance", e.to_string());
                protocol.line(format!("t = {depth:.3} m: {e}"));
                return Traced::fail(e, protocol);
            }
        };

        protocol.line(format!(
            "t = {depth:.3} m: θ_min = {:.2}°  Eph = {eph:.2} kN  Eph_erf = {eph_required:.2} kN  Δt = {step:.4} m",
            wedge.theta_deg
        ));

        let next = if step > 0.0 && eph < eph_required {
            // resistance short: go deeper
            Some((depth + step, step))
        } else if step < 0.0 && eph > eph_required {
            advance(depth, step, tolerance)
        } else {
            step = -step / 2.0;
            if step.abs() <= tolerance {
                let outcome = depth_correction(&wedge, depth, h_kn, eph_required, iteration, step, config);
                return finish(outcome, protocol, &wedge);
            }
            advance(depth, step, tolerance)
        };

        match next {
            Some((new_depth, new_step)) => {
                depth = new_depth;
                step = new_step;
            }
            None => {
                let e = HorizontalError::guard_failure(
                    "depth search",
                    format!("pivot depth cannot stay positive below t = {depth:.4} m"),
                );
                protocol.line(e.to_string());
                return Traced::fail(e, protocol);
            }
        }
    }

    let e = HorizontalError::NotConverged {
        stage: "depth search".into(),
        iterations: config.max_depth_iterations,
        depth_m: depth,
    };
    tracing::debug!(depth, "horizontal equilibrium hit the iteration cap");
    protocol.line(e.to_string());
    Traced::fail(e, protocol)
}

fn depth_correction(
    wedge: &WedgeForces,
    depth: f64,
    h_kn: f64,
    eph_required: f64,
    iterations: usize,
    final_step: f64,
    config: &SolverConfig,
) -> Result<EquilibriumResult, HorizontalError> {
    let eps = config.guard_epsilon;
    let eph = wedge.eph_kn;

    let sigma_eph = safe_div_eps(2.0 * eph, depth, eps)
        .map_err(|e| HorizontalError::guard_failure("σEph", e.to_string()))?;
    let correction = config.depth_correction_factor
        * safe_div_eps(eph - h_kn, sigma_eph, eps)
            .map_err(|e| HorizontalError::guard_failure("depth increment", e.to_string()))?;

    Ok(EquilibriumResult {
        pivot_depth_m: depth,
        theta_min_deg: wedge.theta_deg,
        eph_kn: eph,
        eph_required_kn: eph_required,
        sigma_eph_kn_m2: sigma_eph,
        depth_correction_m: correction,
        required_depth_m: depth + correction,
        eph2_kn: sigma_eph * 2.0 * correction,
        aux_length_m: wedge.aux_length_m,
        slip_length_m: wedge.slip_length_m,
        wedge_area_m2: wedge.area_m2,
        iterations,
        final_step_m: final_step,
    })
}

fn finish(
    outcome: Result<EquilibriumResult, HorizontalError>,
    mut protocol: Protocol,
    wedge: &WedgeForces,
) -> Traced<EquilibriumResult, HorizontalError> {
    protocol.blank();
    match outcome {
        Ok(result) => {
            protocol.line(format!(
                "Wedge at θ_min: A = {:.3} m  l = {:.3} m  F = {:.3} m²",
                wedge.aux_length_m, wedge.slip_length_m, wedge.area_m2
            ));
            protocol.line(format!("σEph = 2·Eph/t = {:.2} kN/m²", result.sigma_eph_kn_m2));
            protocol.line(format!(
                "Δt = 0.54·(Eph − H)/σEph = {:.3} m",
                result.depth_correction_m
            ));
            protocol.line(format!("Eph₂ = 2·σEph·Δt = {:.2} kN", result.eph2_kn));
            protocol.line(format!(
                "Required pile depth L_h = t + Δt = {:.3} m",
                result.required_depth_m
            ));
            tracing::debug!(
                iterations = result.iterations,
                pivot_depth_m = result.pivot_depth_m,
                required_depth_m = result.required_depth_m,
                "horizontal equilibrium converged"
            );
            Traced::ok(result, protocol)
        }
        Err(e) => {
            protocol.line(e.to_string());
            Traced::fail(e, protocol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sand_input(h_kn: f64, m_knm: f64) -> EquilibriumInput {
        EquilibriumInput {
            beta_deg: 0.0,
            phi_deg: 30.0,
            cohesion_kn_m2: 0.0,
            unit_weight_kn_m3: 19.0,
            delta_deg: 15.0,
            width_m: 0.19,
            action: DesignAction { h_kn, m_knm },
        }
    }

    #[test]
    fn test_sand_reference_case() {
        let traced = solve_equilibrium(&sand_input(14.0, 7.0), &SolverConfig::default());
        let result = traced.value().unwrap();

        assert_relative_eq!(result.pivot_depth_m, 1.546875, epsilon = 1e-9);
        assert_relative_eq!(result.theta_min_deg, 25.0, epsilon = 1e-9);
        assert_relative_eq!(result.eph_kn, 56.9217, epsilon = 1e-3);
        assert_relative_eq!(result.eph_required_kn, 55.5758, epsilon = 1e-3);
        assert_relative_eq!(result.depth_correction_m, 0.31493, epsilon = 1e-4);
        assert_relative_eq!(result.required_depth_m, 1.86181, epsilon = 1e-4);
        assert_eq!(result.iterations, 10);
        assert!(result.final_step_m.abs() <= 0.01);
        assert_relative_eq!(
            result.eph2_kn,
            result.sigma_eph_kn_m2 * 2.0 * result.depth_correction_m,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sloped_cohesive_case() {
        let input = EquilibriumInput {
            beta_deg: 15.0,
            phi_deg: 27.5,
            cohesion_kn_m2: 2.0,
            unit_weight_kn_m3: 19.0,
            delta_deg: 13.75,
            width_m: 0.19,
            action: DesignAction { h_kn: 9.8, m_knm: 4.2 },
        };
        let traced = solve_equilibrium(&input, &SolverConfig::default());
        let result = traced.value().unwrap();

        assert_relative_eq!(result.pivot_depth_m, 1.46875, epsilon = 1e-9);
        assert_relative_eq!(result.theta_min_deg, 20.0, epsilon = 1e-9);
        assert_relative_eq!(result.required_depth_m, 1.76523, epsilon = 1e-4);
    }

    #[test]
    fn test_converges_for_typical_soils() {
        let config = SolverConfig::default();
        for phi in [15.0, 25.0, 35.0] {
            for cohesion in [0.0, 25.0, 50.0] {
                for gamma in [15.0, 22.0] {
                    let input = EquilibriumInput {
                        beta_deg: 0.0,
                        phi_deg: phi,
                        cohesion_kn_m2: cohesion,
                        unit_weight_kn_m3: gamma,
                        delta_deg: phi / 2.0,
                        width_m: 0.2,
                        action: DesignAction { h_kn: 14.0, m_knm: 7.0 },
                    };
                    let traced = solve_equilibrium(&input, &config);
                    let result = traced
                        .value()
                        .unwrap_or_else(|| panic!("φ={phi} c={cohesion} γ={gamma}: {:?}", traced.error()));
                    assert!(result.final_step_m.abs() <= config.depth_tolerance_m);
                    assert!(result.iterations <= config.max_depth_iterations);
                    assert!(result.pivot_depth_m > 0.0);
                    assert!(result.required_depth_m > result.pivot_depth_m);
                }
            }
        }
    }

    #[test]
    fn test_stronger_soil_needs_less_depth() {
        let config = SolverConfig::default();
        let loose = solve_equilibrium(&sand_input(14.0, 7.0), &config);
        let mut dense_input = sand_input(14.0, 7.0);
        dense_input.phi_deg = 35.0;
        let dense = solve_equilibrium(&dense_input, &config);

        assert!(
            dense.value().unwrap().required_depth_m < loose.value().unwrap().required_depth_m
        );
    }

    #[test]
    fn test_invalid_inputs_are_rejected_with_protocol() {
        let config = SolverConfig::default();

        let mut input = sand_input(14.0, 7.0);
        input.width_m = 0.0;
        let traced = solve_equilibrium(&input, &config);
        assert!(matches!(
            traced.error(),
            Some(HorizontalError::InvalidInput { field, .. }) if field == "width_m"
        ));
        assert!(!traced.protocol.is_empty());

        let mut input = sand_input(14.0, 7.0);
        input.unit_weight_kn_m3 = f64::NAN;
        assert_eq!(
            solve_equilibrium(&input, &config).error().map(|e| e.error_code()),
            Some("INVALID_INPUT")
        );

        let mut input = sand_input(14.0, 7.0);
        input.phi_deg = 90.0;
        assert!(solve_equilibrium(&input, &config).error().is_some());
    }

    #[test]
    fn test_depth_iteration_cap_reports_non_convergence() {
        let config = SolverConfig {
            max_depth_iterations: 3,
            ..SolverConfig::default()
        };
        let traced = solve_equilibrium(&sand_input(14.0, 7.0), &config);
        assert!(matches!(
            traced.error(),
            Some(HorizontalError::NotConverged { iterations: 3, .. })
        ));
        // three depth lines were written before giving up
        assert!(traced.protocol.lines().iter().filter(|l| l.starts_with("t = ")).count() >= 3);
    }

    #[test]
    fn test_small_demand_keeps_pivot_positive() {
        // Cohesive soil with a small action: the retreat would overshoot to t = 0
        let input = EquilibriumInput {
            beta_deg: 0.0,
            phi_deg: 35.0,
            cohesion_kn_m2: 50.0,
            unit_weight_kn_m3: 15.0,
            delta_deg: 17.5,
            width_m: 0.2,
            action: DesignAction { h_kn: 14.0, m_knm: 7.0 },
        };
        let traced = solve_equilibrium(&input, &SolverConfig::default());
        let result = traced.value().unwrap();
        assert_relative_eq!(result.pivot_depth_m, 0.40625, epsilon = 1e-9);
        assert_relative_eq!(result.required_depth_m, 0.49861, epsilon = 1e-4);
    }
}
