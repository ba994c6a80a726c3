use serde::{Deserialize, Serialize};

use crate::types::*;

/// Slope angles up to this band limit are always evaluated at the limit
pub const SLOPE_BAND_LIMIT_DEG: f64 = 15.0;

/// Ground slope above the pile, entered as a band
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SlopeMode {
    /// 0° to 15°, evaluated at 15°
    #[default]
    UpTo15,
    /// Steeper than 15°, evaluated at the given angle
    Steeper(Angle),
}

impl SlopeMode {
    /// Slope angle β the solver uses
    pub fn effective_angle(&self) -> Angle {
        match self {
            SlopeMode::UpTo15 => degrees(SLOPE_BAND_LIMIT_DEG),
            SlopeMode::Steeper(angle) => *angle,
        }
    }
}

/// One layer of the soil profile, ordered top to bottom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilLayer {
    /// Name/identifier
    pub name: String,

    /// Layer thickness
    pub thickness: Thickness,

    /// Ground slope band
    pub slope: SlopeMode,

    /// Unit weight γ
    pub unit_weight: UnitWeight,

    /// Friction angle φ
    pub friction_angle: Angle,

    /// Cohesion c (before the cohesion factor α_c)
    pub cohesion: Cohesion,

    /// Shaft friction τ
    pub shaft_friction: ShaftFriction,
}

impl SoilLayer {
    pub fn new(name: impl Into<String>, thickness: Thickness) -> Self {
        Self {
            name: name.into(),
            thickness,
            slope: SlopeMode::default(),
            unit_weight: UnitWeight(f64::NAN),
            friction_angle: degrees(f64::NAN),
            cohesion: kn_per_m2(0.0),
            shaft_friction: kn_per_m2(f64::NAN),
        }
    }

    pub fn with_slope(mut self, slope: SlopeMode) -> Self {
        self.slope = slope;
        self
    }

    pub fn with_unit_weight(mut self, unit_weight: UnitWeight) -> Self {
        self.unit_weight = unit_weight;
        self
    }

    pub fn with_friction_angle(mut self, friction_angle: Angle) -> Self {
        self.friction_angle = friction_angle;
        self
    }

    pub fn with_cohesion(mut self, cohesion: Cohesion) -> Self {
        self.cohesion = cohesion;
        self
    }

    pub fn with_shaft_friction(mut self, shaft_friction: ShaftFriction) -> Self {
        self.shaft_friction = shaft_friction;
        self
    }

    pub fn thickness_m(&self) -> f64 {
        self.thickness.get::<meter>()
    }

    pub fn shaft_friction_kn_m2(&self) -> f64 {
        self.shaft_friction.get::<kilopascal>()
    }

    /// Thickness and unit weight are both finite and positive
    pub fn participates(&self) -> bool {
        let thickness = self.thickness_m();
        let gamma = self.unit_weight.value();
        thickness.is_finite() && thickness > 0.0 && gamma.is_finite() && gamma > 0.0
    }
}

/// Typical parameters for quick profiles (characteristic values)
pub mod typical_layers {
    use super::*;

    pub fn medium_dense_sand(thickness_m: f64) -> SoilLayer {
        SoilLayer::new("Sand, medium dense", meters(thickness_m))
            .with_unit_weight(UnitWeight(19.0))
            .with_friction_angle(degrees(32.5))
            .with_cohesion(kn_per_m2(0.0))
            .with_shaft_friction(kn_per_m2(25.0))
    }

    pub fn stiff_clay(thickness_m: f64) -> SoilLayer {
        SoilLayer::new("Clay, stiff", meters(thickness_m))
            .with_unit_weight(UnitWeight(20.0))
            .with_friction_angle(degrees(22.5))
            .with_cohesion(kn_per_m2(10.0))
            .with_shaft_friction(kn_per_m2(20.0))
    }

    pub fn topsoil(thickness_m: f64) -> SoilLayer {
        SoilLayer::new("Topsoil", meters(thickness_m))
            .with_unit_weight(UnitWeight(17.0))
            .with_friction_angle(degrees(27.5))
            .with_cohesion(kn_per_m2(2.0))
            .with_shaft_friction(kn_per_m2(5.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_slope_band() {
        assert_relative_eq!(SlopeMode::UpTo15.effective_angle().get::<degree>(), 15.0);
        assert_relative_eq!(
            SlopeMode::Steeper(degrees(22.0)).effective_angle().get::<degree>(),
            22.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_participation_requires_thickness_and_unit_weight() {
        assert!(typical_layers::topsoil(1.8).participates());
        assert!(!typical_layers::topsoil(0.0).participates());
        assert!(!typical_layers::topsoil(1.8).with_unit_weight(UnitWeight(0.0)).participates());
        assert!(!SoilLayer::new("empty", meters(2.0)).participates());
    }
}
