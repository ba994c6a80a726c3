pub mod earth_resistance;
pub mod equilibrium;
pub mod shaft_friction;

pub use earth_resistance::*;
pub use equilibrium::*;
pub use shaft_friction::*;
