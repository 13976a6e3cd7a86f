use foundation::{Feature, ScreenRect, Vec2};

use crate::{LayerId, SourceId};

/// Screen-space region for feature queries.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum QueryRegion {
    Point(Vec2),
    Rect(ScreenRect),
}

impl QueryRegion {
    /// Square of half-width `buffer_px` around `center`.
    pub fn around(center: Vec2, buffer_px: f64) -> Self {
        QueryRegion::Rect(ScreenRect::around(center, buffer_px))
    }

    pub fn as_rect(&self) -> ScreenRect {
        match *self {
            QueryRegion::Point(p) => ScreenRect::new(p, p),
            QueryRegion::Rect(r) => r,
        }
    }
}

/// A feature hit by a rendered-feature query.
///
/// The feature id is only meaningful for the frame it was queried in.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub feature: Feature,
    pub layer: LayerId,
    pub source: SourceId,
}
