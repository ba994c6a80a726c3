use std::fmt;
use uom::si::{
    angle::degree, force::kilonewton, length::meter, pressure::kilopascal,
    torque::kilonewton_meter,
};

use crate::types::units::*;

#[derive(Debug)]
pub struct DisplayForce(pub Force);
#[derive(Debug)]
pub struct DisplayTorque(pub Torque);
#[derive(Debug)]
pub struct DisplayAngle(pub Angle);
#[derive(Debug)]
pub struct DisplayLength(pub Length);
#[derive(Debug)]
pub struct DisplayPressure(pub Pressure);
#[derive(Debug)]
pub struct DisplayUnitWeight(pub UnitWeight);

impl fmt::Display for DisplayForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} kN", self.0.get::<kilonewton>())
    }
}

impl fmt::Display for DisplayTorque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} kNm", self.0.get::<kilonewton_meter>())
    }
}

impl fmt::Display for DisplayAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°", self.0.get::<degree>())
    }
}

impl fmt::Display for DisplayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} m", self.0.get::<meter>())
    }
}

impl fmt::Display for DisplayPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} kN/m²", self.0.get::<kilopascal>())
    }
}

impl fmt::Display for DisplayUnitWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} kN/m³", self.0.value())
    }
}
