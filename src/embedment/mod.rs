pub mod apportionment;
pub mod horizontal;
pub mod run;
pub mod summary;

pub use apportionment::*;
pub use horizontal::*;
pub use run::*;
pub use summary::*;
