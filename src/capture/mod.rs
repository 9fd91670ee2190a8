//! The shared data model: value records produced by the engines, persisted
//! as capture files, and consumed by the reporter and comparison engine.

pub mod load;
pub mod types;

pub use load::load;
pub use types::*;
