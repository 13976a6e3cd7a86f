use serde::{Deserialize, Serialize};

use crate::math::{LngLat, Vec2};

/// Geographic rectangle in WGS84 degrees, as reported by the map viewport.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        GeoBounds {
            north,
            south,
            east,
            west,
        }
    }

    /// Builds bounds from two opposite corners in any order.
    pub fn from_corners(a: LngLat, b: LngLat) -> Self {
        GeoBounds {
            north: a.lat.max(b.lat),
            south: a.lat.min(b.lat),
            east: a.lng.max(b.lng),
            west: a.lng.min(b.lng),
        }
    }

    /// Inclusive containment, matching a SQL `BETWEEN` on both axes.
    pub fn contains(&self, p: LngLat) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    pub fn center(&self) -> LngLat {
        LngLat::new((self.east + self.west) * 0.5, (self.north + self.south) * 0.5)
    }
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ScreenRect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        ScreenRect { min, max }
    }

    /// Square of half-size `buffer` pixels centred on `center`.
    pub fn around(center: Vec2, buffer: f64) -> Self {
        ScreenRect {
            min: Vec2::new(center.x - buffer, center.y - buffer),
            max: Vec2::new(center.x + buffer, center.y + buffer),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.min.midpoint(self.max)
    }

    /// The point of the rectangle closest to `p`.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}
