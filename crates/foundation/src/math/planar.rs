//! Planar geometry on raw WGS84 degrees.
//!
//! Everything here treats longitude/latitude as a flat Cartesian plane. That is
//! a deliberate city-scale approximation: no geodesic correction is applied.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Geographic position in degrees.
///
/// Serialized as `[lng, lat]`, the GeoJSON coordinate order.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Rounds both components to `decimals` places.
    pub fn rounded(self, decimals: i32) -> Self {
        Self::new(round_to(self.lng, decimals), round_to(self.lat, decimals))
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

/// Anything with a single geographic position.
pub trait Located {
    fn position(&self) -> LngLat;
}

impl Located for LngLat {
    fn position(&self) -> LngLat {
        *self
    }
}

pub fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// Euclidean distance in degree space.
pub fn planar_distance(a: LngLat, b: LngLat) -> f64 {
    (a.lng - b.lng).hypot(a.lat - b.lat)
}

/// Even-odd ray casting test of `point` against `ring`.
///
/// The ring may be closed (first == last) or open; both give the same answer.
/// Points exactly on an edge may land on either side. Rings with fewer than
/// three vertices never contain anything useful but do not panic.
pub fn point_in_ring(point: LngLat, ring: &[LngLat]) -> bool {
    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let Some(mut j) = ring.len().checked_sub(1) else {
        return false;
    };

    for (i, vi) in ring.iter().enumerate() {
        let vj = ring[j];
        // The straddle check guarantees vi.lat != vj.lat, so the division is safe.
        if (vi.lat > y) != (vj.lat > y)
            && x < (vj.lng - vi.lng) * (y - vi.lat) / (vj.lat - vi.lat) + vi.lng
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Arithmetic mean of the ring's vertices (closing vertex included).
///
/// Not area-weighted; adequate for simple building footprints.
pub fn ring_centroid(ring: &[LngLat]) -> Option<LngLat> {
    if ring.is_empty() {
        return None;
    }
    let (sx, sy) = ring
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.lng, sy + p.lat));
    let n = ring.len() as f64;
    Some(LngLat::new(sx / n, sy / n))
}

/// Canonicalize a float for deterministic ordering.
///
/// `-0.0` becomes `0.0` and every NaN collapses into one canonical NaN.
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Total ordering for distances and other sort keys.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}
