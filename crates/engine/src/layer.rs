use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FilterExpr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Style layer type, as far as the viewer cares.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerType {
    Background,
    Fill,
    Line,
    Symbol,
    FillExtrusion,
    Circle,
}

/// Linear RGBA in `[0, 1]`.
pub type Rgba = [f32; 4];

pub const fn rgb8(r: u8, g: u8, b: u8) -> Rgba {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Extrusion height, either constant or read from a feature property.
#[derive(Debug, Clone, PartialEq)]
pub enum Height {
    Constant(f64),
    Property(String),
}

impl Height {
    pub fn property(key: impl Into<String>) -> Self {
        Height::Property(key.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    FillExtrusion {
        color: Rgba,
        height: Height,
        base: Height,
        opacity: f32,
    },
    Circle {
        radius_px: f64,
        color: Rgba,
        opacity: f32,
    },
}

impl Paint {
    pub fn layer_type(&self) -> LayerType {
        match self {
            Paint::FillExtrusion { .. } => LayerType::FillExtrusion,
            Paint::Circle { .. } => LayerType::Circle,
        }
    }
}

/// A layer the viewer adds on top of the style.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: LayerId,
    pub source: SourceId,
    pub source_layer: Option<String>,
    pub min_zoom: Option<f64>,
    pub filter: FilterExpr,
    pub paint: Paint,
}

impl LayerSpec {
    pub fn new(id: LayerId, source: SourceId, paint: Paint) -> Self {
        Self {
            id,
            source,
            source_layer: None,
            min_zoom: None,
            filter: FilterExpr::All(Vec::new()),
            paint,
        }
    }

    pub fn with_source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    pub fn with_min_zoom(mut self, zoom: f64) -> Self {
        self.min_zoom = Some(zoom);
        self
    }

    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = filter;
        self
    }
}
