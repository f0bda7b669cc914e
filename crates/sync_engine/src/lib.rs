//! # Sync Engine
//!
//! Proximity core: pose and depth stream synchronizers, forward-gate
//! proximity detection, and the distance-band alert policy.
//!
//! Responsibilities:
//! - Serialize each stream's callbacks into its own shared state
//! - Pair every depth frame with the device pose at its timestamp
//! - Estimate the forward distance and request at most one tone per frame
//! - Expose consistent snapshots to the renderer
//!
//! ## Example
//!
//! ```ignore
//! use sync_engine::{Collaborators, StreamCoordinator};
//!
//! let coordinator = StreamCoordinator::new(session, Collaborators {
//!     renderer,
//!     tone,
//!     errors,
//!     diagnostics,
//! });
//! coordinator.start()?;
//!
//! let view = coordinator.render_view();
//! if let Some((cloud, pose)) = view.point_cloud() {
//!     // draw
//! }
//! ```

pub mod alert;
mod coordinator;
mod depth;
mod pose;
pub mod proximity;
mod state;

#[cfg(test)]
mod test_support;

pub use alert::{decide, AlertPolicy, CLOSE_TONE, FAR_TONE};
pub use coordinator::{Collaborators, StreamCoordinator, StreamListener};
pub use depth::{DepthOutcome, DepthSynchronizer, LOOKUP_FAILED_NOTICE};
pub use pose::{PoseSynchronizer, PoseUpdate};
pub use proximity::{detect, GATE_HALF_WIDTH_M};
pub use state::{
    DepthSnapshot, PoseSnapshot, RenderView, StreamClock, StreamLocks, TrackingRun,
};
