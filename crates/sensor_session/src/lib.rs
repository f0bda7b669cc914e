//! # Sensor Session
//!
//! Simulated depth-sensing device implementing the `SensorSession` contract.
//!
//! - Pose stream at `pose_rate_hz`, depth stream at `depth_rate_hz`, each on
//!   its own thread
//! - Bounded pose history with interpolated lookup-by-time
//! - Synthetic wall scene with optional depth noise
//! - Fault injection for pose lookups
//!
//! ```ignore
//! use sensor_session::MockSession;
//!
//! let session = Arc::new(MockSession::from_config(&config));
//! session.connect(listener)?;
//! ```

mod history;
mod scene;
mod session;

pub use history::PoseHistory;
pub use scene::{tracking_status, Scene};
pub use session::{MockSession, TRACKING_STATUS_EVENT};
