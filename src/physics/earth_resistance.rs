//! Passive earth resistance of a sliding wedge in front of the pile
//!
//! For a pivot depth t and a trial slip-plane angle θ the wedge in front of
//! the pile is bounded by the sloping ground (β), the pile face and a planar
//! slip surface. Cohesion acts on the slip surface and on both side faces of
//! the wedge; the side faces also carry residual friction evaluated at the
//! third point of the depth.
//!
//! All values are raw `f64`: lengths in m, forces in kN, stresses in kN/m²,
//! unit weight in kN/m³, angles in radians unless the name says `_deg`.

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::types::numeric::{deg_to_rad, safe_div_eps, GuardError};

/// Soil and pile parameters of the wedge, fixed for one search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeParams {
    pub beta: f64,
    pub phi: f64,
    pub delta: f64,
    pub cohesion: f64,
    pub unit_weight: f64,
    pub width: f64,
}

impl WedgeParams {
    pub fn from_degrees(
        beta_deg: f64,
        phi_deg: f64,
        delta_deg: f64,
        cohesion: f64,
        unit_weight: f64,
        width: f64,
    ) -> Self {
        Self {
            beta: deg_to_rad(beta_deg),
            phi: deg_to_rad(phi_deg),
            delta: deg_to_rad(delta_deg),
            cohesion,
            unit_weight,
            width,
        }
    }
}

/// Forces of one trial wedge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WedgeForces {
    pub theta_deg: f64,

    /// Auxiliary length A = t / (tan θ + tan β)
    pub aux_length_m: f64,

    /// Slip-plane length l = A · cos θ
    pub slip_length_m: f64,

    /// Wedge area F = A · t / 2
    pub area_m2: f64,

    /// Cohesion on the slip plane plus twice the side-face terms
    pub cohesion_force_kn: f64,

    /// Wedge weight F · γ · b
    pub weight_force_kn: f64,

    /// Side-face cohesion F · c
    pub side_cohesion_kn: f64,

    /// Side-face residual friction F · t/3 · γ · (1 − sin φ) · tan φ
    pub side_friction_kn: f64,

    /// cos δ / sin(θ+φ) − sin δ / cos(θ+φ)
    pub denominator: f64,

    /// Earth resistance Ep
    pub ep_kn: f64,

    /// Horizontal component Eph = Ep · cos δ
    pub eph_kn: f64,
}

/// Evaluate the wedge for one trial angle θ at depth t
pub fn wedge_resistance(
    params: &WedgeParams,
    theta_deg: f64,
    depth: f64,
    epsilon: f64,
) -> Result<WedgeForces, GuardError> {
    let div = |n: f64, d: f64| safe_div_eps(n, d, epsilon);
    let WedgeParams {
        beta,
        phi,
        delta,
        cohesion,
        unit_weight,
        width,
    } = *params;

    let theta = deg_to_rad(theta_deg);

    let aux_length = div(depth, theta.tan() + beta.tan())?;
    let slip_length = aux_length * theta.cos();
    let area = aux_length * depth / 2.0;

    let slip_cohesion = slip_length * cohesion * width;
    let weight_force = area * unit_weight * width;
    let side_cohesion = area * cohesion;
    let side_friction = area * (depth / 3.0) * unit_weight * (1.0 - phi.sin()) * phi.tan();
    let cohesion_force = slip_cohesion + 2.0 * (side_cohesion + side_friction);

    let theta_phi = theta + phi;
    let term_c = cohesion_force * (div(theta.cos(), theta_phi.sin())? + div(theta.sin(), theta_phi.cos())?);
    let term_g = div(weight_force, theta_phi.cos())?;
    let denominator = div(delta.cos(), theta_phi.sin())? - div(delta.sin(), theta_phi.cos())?;

    let ep = div(term_c + term_g, denominator)?;

    Ok(WedgeForces {
        theta_deg,
        aux_length_m: aux_length,
        slip_length_m: slip_length,
        area_m2: area,
        cohesion_force_kn: cohesion_force,
        weight_force_kn: weight_force,
        side_cohesion_kn: side_cohesion,
        side_friction_kn: side_friction,
        denominator,
        ep_kn: ep,
        eph_kn: ep * delta.cos(),
    })
}

/// Outcome of the slip-angle search at one depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThetaSearch {
    /// Wedge with the smallest Ep found
    pub critical: WedgeForces,
    pub iterations: usize,
    pub final_step_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ThetaSearchError {
    #[error("Wedge at the start angle {theta_deg}° cannot be evaluated ({source})")]
    StartAngle {
        theta_deg: f64,
        #[source]
        source: GuardError,
    },

    #[error("Slip-angle search did not settle within {iterations} steps")]
    NotConverged { iterations: usize },
}

/// Find the slip angle with the smallest Ep at depth t
///
/// θ advances while Ep keeps dropping. A step that does not improve, cannot
/// be evaluated or would reach the upper bound halves the step instead. The
/// search ends once the step is at or below the tolerance. No angle at or
/// above the bound is evaluated, and the smallest Ep seen is kept throughout.
pub fn minimize_resistance(
    params: &WedgeParams,
    depth: f64,
    config: &SolverConfig,
) -> Result<ThetaSearch, ThetaSearchError> {
    let eps = config.guard_epsilon;
    let mut theta = config.theta_start_deg;
    let mut step = config.theta_step_deg;

    let mut critical = wedge_resistance(params, theta, depth, eps)
        .map_err(|source| ThetaSearchError::StartAngle { theta_deg: theta, source })?;

    let mut iterations = 0;
    while step.abs() > config.theta_tolerance_deg && theta < config.theta_max_deg {
        if iterations >= config.max_theta_iterations {
            return Err(ThetaSearchError::NotConverged { iterations });
        }
        iterations += 1;

        let next = theta + step;
        if next >= config.theta_max_deg {
            step /= 2.0;
            continue;
        }

        match wedge_resistance(params, next, depth, eps) {
            Ok(trial) if trial.ep_kn < critical.ep_kn => {
                theta = next;
                critical = trial;
            }
            _ => step /= 2.0,
        }
    }

    Ok(ThetaSearch {
        critical,
        iterations,
        final_step_deg: step,
    })
}
