pub mod types;
pub mod soil;
pub mod physics;
pub mod embedment;
pub mod trace;
pub mod config;
pub mod input;
pub mod project_file;

pub use types::*;
