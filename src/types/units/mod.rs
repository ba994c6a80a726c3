mod display;

use serde::{Deserialize, Serialize};

pub use uom::si::f64::{Angle, Force, Length, Pressure, Torque};

pub use uom::si::{
    angle::{degree, radian},
    force::{kilonewton, newton},
    length::{centimeter, meter, millimeter},
    pressure::{kilopascal, pascal},
    torque::{kilonewton_meter, newton_meter},
};

pub use display::{
    DisplayAngle, DisplayForce, DisplayLength, DisplayPressure, DisplayTorque, DisplayUnitWeight,
};

/// Unit weight of soil in kN/m³
///
/// `uom` has no specific-weight quantity, so this stays a plain wrapper.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitWeight(pub f64);

impl UnitWeight {
    pub fn kn_per_m3(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Create a length from meters
#[inline]
pub fn meters(value: f64) -> Length {
    Length::new::<meter>(value)
}

/// Create a force from kilonewtons
#[inline]
pub fn kilonewtons(value: f64) -> Force {
    Force::new::<kilonewton>(value)
}

/// Create a moment from kilonewton-meters
#[inline]
pub fn kilonewton_meters(value: f64) -> Torque {
    Torque::new::<kilonewton_meter>(value)
}

/// Create a stress (cohesion, shaft friction) from kN/m²
#[inline]
pub fn kn_per_m2(value: f64) -> Pressure {
    Pressure::new::<kilopascal>(value)
}

/// Create an angle from degrees
#[inline]
pub fn degrees(value: f64) -> Angle {
    Angle::new::<degree>(value)
}
