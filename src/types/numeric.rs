//! Degree to radian conversion and guarded arithmetic for the solvers

use serde::{Deserialize, Serialize};

/// Denominators smaller than this are treated as singular
pub const GUARD_EPSILON: f64 = 1e-12;

/// A division that would produce a non-finite or meaningless value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("Guarded division failed: {numerator} / {denominator}")]
pub struct GuardError {
    pub numerator: f64,
    pub denominator: f64,
}

#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

/// Divide, failing on non-finite operands or |d| < [`GUARD_EPSILON`]
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> Result<f64, GuardError> {
    safe_div_eps(numerator, denominator, GUARD_EPSILON)
}

/// [`safe_div`] with a caller-supplied singularity threshold
pub fn safe_div_eps(numerator: f64, denominator: f64, epsilon: f64) -> Result<f64, GuardError> {
    if !numerator.is_finite() || !denominator.is_finite() || denominator.abs() < epsilon {
        return Err(GuardError {
            numerator,
            denominator,
        });
    }
    let value = numerator / denominator;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GuardError {
            numerator,
            denominator,
        })
    }
}

/// Larger of two values, ignoring whichever is not finite
///
/// Returns `None` when neither value is finite.
pub fn max_finite(a: f64, b: f64) -> Option<f64> {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => Some(a.max(b)),
        (true, false) => Some(a),
        (false, true) => Some(b),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_safe_div() {
        assert_relative_eq!(safe_div(26.13, 2.989).unwrap(), 8.742054, epsilon = 1e-6);
        assert!(safe_div(1.0, 0.0).is_err());
        assert!(safe_div(1.0, 1e-13).is_err());
        assert!(safe_div(f64::NAN, 1.0).is_err());
        assert!(safe_div(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_safe_div_custom_epsilon() {
        assert!(safe_div_eps(1.0, 1e-6, 1e-5).is_err());
        assert!(safe_div_eps(1.0, 1e-6, 1e-9).is_ok());
    }

    #[test]
    fn test_angle_conversion() {
        assert_relative_eq!(deg_to_rad(90.0), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(deg_to_rad(-15.0), -std::f64::consts::PI / 12.0);
    }

    #[test]
    fn test_max_finite() {
        assert_eq!(max_finite(1.98, 8.07), Some(8.07));
        assert_eq!(max_finite(f64::NAN, 8.07), Some(8.07));
        assert_eq!(max_finite(1.98, f64::NAN), Some(1.98));
        assert_eq!(max_finite(f64::NAN, f64::INFINITY), None);
    }
}
