//! PointCloudFrame - depth stream payload
//!
//! Points are stored as packed native-endian `f32` triples inside a shared
//! `Bytes` buffer, so the renderer and the proximity detector read the same
//! allocation without copying. The layout is in-process only; it is never
//! written to disk or sent over the wire.

use bytemuck::{Pod, Zeroable};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Bytes per point (x, y, z: f32)
pub const POINT_STRIDE: usize = std::mem::size_of::<Point3>();

/// Single depth point in the device frame (meters; z points forward)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Point cloud frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloudFrame {
    /// Device timestamp (seconds)
    pub timestamp: f64,

    /// Packed xyz data (zero-copy)
    data: Bytes,
}

impl PointCloudFrame {
    /// Build a frame by copying points into a packed buffer
    pub fn from_points(timestamp: f64, points: &[Point3]) -> Self {
        Self {
            timestamp,
            data: Bytes::copy_from_slice(bytemuck::cast_slice(points)),
        }
    }

    /// Wrap an existing packed buffer
    ///
    /// # Errors
    /// Returns `InvalidPointCloud` when the buffer length is not a whole number of points.
    pub fn from_bytes(timestamp: f64, data: Bytes) -> Result<Self, ContractError> {
        if data.len() % POINT_STRIDE != 0 {
            return Err(ContractError::InvalidPointCloud {
                len: data.len(),
                stride: POINT_STRIDE,
            });
        }
        Ok(Self { timestamp, data })
    }

    /// Number of points in the frame
    #[inline]
    pub fn point_count(&self) -> usize {
        self.data.len() / POINT_STRIDE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate points in delivery order
    pub fn points(&self) -> impl Iterator<Item = Point3> + '_ {
        self.data
            .chunks_exact(POINT_STRIDE)
            .map(bytemuck::pod_read_unaligned::<Point3>)
    }

    /// Raw packed buffer (cheap clone)
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }
}
