//! Capability boundary to the external 3D map engine.
//!
//! The viewer core never renders. It talks to an engine through [`MapEngine`]:
//! style readiness, layer and source management, feature queries, projection,
//! cursor control and event subscriptions. Events are queued by the engine and
//! drained by the owner, one batch per tick.
//!
//! [`headless::HeadlessEngine`] implements the whole surface in memory.

pub mod error;
pub mod event;
pub mod filter;
pub mod headless;
pub mod layer;
pub mod query;

pub use error::*;
pub use event::*;
pub use filter::*;
pub use layer::*;
pub use query::*;

use foundation::{FeatureCollection, GeoBounds, LngLat, Vec2};

/// Camera state as reported by the engine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub center: LngLat,
    pub zoom: f64,
}

impl Camera {
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

/// Mouse cursor shapes the viewer asks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// Everything the viewer needs from a map engine.
///
/// Single-threaded: the owner holds the engine exclusively and calls it from
/// one task.
pub trait MapEngine {
    fn load_style(&mut self, url: &str) -> Result<(), EngineError>;
    fn is_style_loaded(&self) -> bool;
    /// Style layers in draw order.
    fn style_layers(&self) -> Vec<(LayerId, LayerType)>;

    fn has_layer(&self, id: &LayerId) -> bool;
    /// Inserts `spec` below `before` when given, else on top.
    fn add_layer(&mut self, spec: LayerSpec, before: Option<&LayerId>) -> Result<(), EngineError>;
    fn set_filter(&mut self, id: &LayerId, filter: FilterExpr) -> Result<(), EngineError>;

    fn has_source(&self, id: &SourceId) -> bool;
    fn add_source(&mut self, id: SourceId, data: FeatureCollection) -> Result<(), EngineError>;
    fn set_source_data(
        &mut self,
        id: &SourceId,
        data: FeatureCollection,
    ) -> Result<(), EngineError>;

    /// Features currently rendered in `region` on any of `layers`, top-most first.
    fn query_rendered_features(&self, region: QueryRegion, layers: &[LayerId])
    -> Vec<RenderedFeature>;
    fn project(&self, position: LngLat) -> Vec2;
    fn unproject(&self, point: Vec2) -> LngLat;
    /// Visible rectangle, `None` before the first frame.
    fn bounds(&self) -> Option<GeoBounds>;
    fn camera(&self) -> Camera;
    fn set_cursor(&mut self, cursor: Cursor);

    /// Subscribes to `kind`, optionally scoped to one layer.
    fn on(&mut self, kind: EventKind, layer: Option<&LayerId>) -> HandlerId;
    /// Returns false when `handler` was not attached.
    fn off(&mut self, handler: HandlerId) -> bool;
    fn drain_events(&mut self) -> Vec<MapEvent>;
}
