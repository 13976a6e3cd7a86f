//! Engine-agnostic association between geocoded listings and building
//! footprints.
//!
//! Nothing in this crate fails: a miss is an empty result.

pub mod buildings;
pub mod config;
pub mod listings;

pub use buildings::*;
pub use config::*;
pub use listings::*;

use foundation::math::{LngLat, point_in_ring};

/// Even-odd ray casting over a ring of `[lng, lat]` vertices.
///
/// Boundary points may go either way; degenerate rings give an unspecified
/// answer without panicking.
pub fn point_in_polygon(point: LngLat, ring: &[LngLat]) -> bool {
    point_in_ring(point, ring)
}
