pub mod layer;
pub mod loads;
pub mod pile;

pub use layer::*;
pub use loads::*;
pub use pile::*;
