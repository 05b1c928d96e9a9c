//! Type definitions

pub mod appointment;
pub mod messages;
pub mod plan;

pub use appointment::*;
pub use messages::*;
pub use plan::*;
