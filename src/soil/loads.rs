use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::*;

/// Which support of the table carries the load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Support {
    /// Short (front) support
    Short,
    /// Long (rear) support
    Long,
}

impl Support {
    /// Sort rank for tables: short before long
    pub fn rank(&self) -> u8 {
        match self {
            Support::Short => 0,
            Support::Long => 1,
        }
    }

    /// Key used in position identifiers
    pub fn key(&self) -> &'static str {
        match self {
            Support::Short => "kurz",
            Support::Long => "lang",
        }
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Support::Short => write!(f, "Short support"),
            Support::Long => write!(f, "Long support"),
        }
    }
}

/// Load zone of the field (edge effects on wind and snow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    Green,
    Yellow,
    Red,
}

impl Zone {
    /// Sort rank for tables: green, yellow, red
    pub fn rank(&self) -> u8 {
        match self {
            Zone::Green => 0,
            Zone::Yellow => 1,
            Zone::Red => 2,
        }
    }

    /// Most exposed zone of a group (red > yellow > green)
    pub fn worst(zones: impl IntoIterator<Item = Zone>) -> Option<Zone> {
        zones.into_iter().max_by_key(|z| z.rank())
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Green => write!(f, "green"),
            Zone::Yellow => write!(f, "yellow"),
            Zone::Red => write!(f, "red"),
        }
    }
}

/// Characteristic (unfactored) actions at one support position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadCase {
    /// Position identifier
    pub position: String,

    pub support: Support,

    pub zone: Zone,

    /// Compression N_d
    pub compression: Force,

    /// Tension N_z
    pub tension: Force,

    /// Horizontal force H
    pub horizontal: Force,

    /// Moment M
    pub moment: Moment,
}

impl LoadCase {
    pub fn new(position: impl Into<String>, support: Support, zone: Zone) -> Self {
        Self {
            position: position.into(),
            support,
            zone,
            compression: kilonewtons(0.0),
            tension: kilonewtons(0.0),
            horizontal: kilonewtons(0.0),
            moment: kilonewton_meters(0.0),
        }
    }

    pub fn with_vertical(mut self, compression: Force, tension: Force) -> Self {
        self.compression = compression;
        self.tension = tension;
        self
    }

    pub fn with_horizontal(mut self, horizontal: Force, moment: Moment) -> Self {
        self.horizontal = horizontal;
        self.moment = moment;
        self
    }
}

/// How the wall friction angle δ is chosen
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum WallFriction {
    /// δ = φ / 2
    #[default]
    HalfPhi,
    /// δ given directly
    Fixed(Angle),
}

impl WallFriction {
    pub fn angle_for(&self, friction_angle: Angle) -> Angle {
        match self {
            WallFriction::HalfPhi => friction_angle * 0.5,
            WallFriction::Fixed(delta) => *delta,
        }
    }
}

/// Partial factors and calculation options for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignFactors {
    /// γ_D on compression
    pub gamma_d: f64,
    /// γ_Z on tension
    pub gamma_z: f64,
    /// α_c on cohesion
    pub alpha_c: f64,
    /// η on horizontal force and moment
    pub eta: f64,
    pub wall_friction: WallFriction,
}

impl DesignFactors {
    pub const DEFAULT_ETA: f64 = 1.4;
    pub const DEFAULT_ALPHA_C: f64 = 1.0;

    pub fn new(gamma_d: f64, gamma_z: f64) -> Self {
        Self {
            gamma_d,
            gamma_z,
            alpha_c: Self::DEFAULT_ALPHA_C,
            eta: Self::DEFAULT_ETA,
            wall_friction: WallFriction::HalfPhi,
        }
    }

    /// First factor that is not finite and positive, by name
    pub fn first_invalid(&self) -> Option<(&'static str, f64)> {
        [
            ("gamma_d", self.gamma_d),
            ("gamma_z", self.gamma_z),
            ("alpha_c", self.alpha_c),
            ("eta", self.eta),
        ]
        .into_iter()
        .find(|(_, v)| !(v.is_finite() && *v > 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_worst_zone() {
        assert_eq!(Zone::worst([Zone::Green, Zone::Red, Zone::Yellow]), Some(Zone::Red));
        assert_eq!(Zone::worst([Zone::Green, Zone::Yellow]), Some(Zone::Yellow));
        assert_eq!(Zone::worst([]), None);
    }

    #[test]
    fn test_wall_friction_modes() {
        let phi = degrees(27.5);
        assert_relative_eq!(
            WallFriction::HalfPhi.angle_for(phi).get::<degree>(),
            13.75,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            WallFriction::Fixed(degrees(10.0)).angle_for(phi).get::<degree>(),
            10.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_factor_validation() {
        assert_eq!(DesignFactors::new(1.3, 1.5).first_invalid(), None);
        assert_eq!(DesignFactors::new(0.0, 1.5).first_invalid(), Some(("gamma_d", 0.0)));

        let mut factors = DesignFactors::new(1.3, 1.5);
        factors.eta = f64::NAN;
        assert_eq!(factors.first_invalid().map(|(name, _)| name), Some("eta"));
    }
}
