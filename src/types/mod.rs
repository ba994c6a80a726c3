pub mod decimal;
pub mod numeric;
pub mod units;

pub use decimal::{format_decimal_de, parse_decimal, parse_decimal_or, DecimalError};
pub use numeric::{deg_to_rad, max_finite, safe_div, safe_div_eps, GuardError};
pub use units::*;

// Type aliases for domain clarity (zero cost)
pub type Depth = Length;
pub type Thickness = Length;
pub type Cohesion = Pressure;
pub type ShaftFriction = Pressure;
pub type Moment = Torque;
