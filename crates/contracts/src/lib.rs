//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: sensor
//! samples, proximity results, and the collaborator traits the core talks to.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Timestamps are device seconds (`f64`) as reported by the sensor session
//! - Each stream is non-decreasing in time unless the session restarts

mod config;
mod error;
mod feedback;
mod point_cloud;
mod pose;
mod proximity;
mod session;

pub use config::*;
pub use error::*;
pub use feedback::*;
pub use point_cloud::*;
pub use pose::*;
pub use proximity::*;
pub use session::*;
