//! In-memory engine for tests and the command-line tools.
//!
//! Web Mercator projection over a fixed-size viewport, rendered-feature
//! queries that honour layer filters and minimum zoom, and explicit event
//! simulation (style load, idle, camera moves, clicks, hover).

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use foundation::math::point_in_ring;
use foundation::{Feature, FeatureCollection, GeoBounds, Geometry, LngLat, ScreenRect, Vec2};

use crate::{
    Camera, Cursor, EngineError, EventKind, FilterExpr, HandlerId, LayerId, LayerSpec, LayerType,
    MapEngine, MapEvent, Paint, QueryRegion, RenderedFeature, SourceId,
};

pub const TILE_SIZE: f64 = 512.0;
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Source holding the style's own vector data (buildings, roads).
pub const STYLE_SOURCE: &str = "composite";

#[derive(Debug, Clone)]
struct HeadlessLayer {
    id: LayerId,
    layer_type: LayerType,
    source: Option<SourceId>,
    filter: FilterExpr,
    min_zoom: Option<f64>,
    paint: Option<Paint>,
}

impl HeadlessLayer {
    fn style(id: &str, layer_type: LayerType) -> Self {
        Self {
            id: LayerId::new(id),
            layer_type,
            source: None,
            filter: FilterExpr::default(),
            min_zoom: None,
            paint: None,
        }
    }

    fn from_spec(spec: LayerSpec) -> Self {
        Self {
            id: spec.id,
            layer_type: spec.paint.layer_type(),
            source: Some(spec.source),
            filter: spec.filter,
            min_zoom: spec.min_zoom,
            paint: Some(spec.paint),
        }
    }
}

#[derive(Debug)]
pub struct HeadlessEngine {
    viewport: Vec2,
    camera: Camera,
    style_url: Option<String>,
    style_loaded: bool,
    layers: Vec<HeadlessLayer>,
    sources: BTreeMap<SourceId, FeatureCollection>,
    handlers: BTreeMap<HandlerId, (EventKind, Option<LayerId>)>,
    next_handler: u64,
    queue: Vec<MapEvent>,
    hovered: BTreeSet<LayerId>,
    cursor: Cursor,
}

impl HeadlessEngine {
    pub fn new(viewport: Vec2, camera: Camera) -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(SourceId::new(STYLE_SOURCE), FeatureCollection::default());
        Self {
            viewport,
            camera,
            style_url: None,
            style_loaded: false,
            layers: Vec::new(),
            sources,
            handlers: BTreeMap::new(),
            next_handler: 1,
            queue: Vec::new(),
            hovered: BTreeSet::new(),
            cursor: Cursor::Default,
        }
    }

    /// Replaces the style's building data.
    pub fn with_buildings(mut self, buildings: FeatureCollection) -> Self {
        self.sources.insert(SourceId::new(STYLE_SOURCE), buildings);
        self
    }

    pub fn style_url(&self) -> Option<&str> {
        self.style_url.as_deref()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn layer_filter(&self, id: &LayerId) -> Option<&FilterExpr> {
        self.layer(id).map(|l| &l.filter)
    }

    pub fn layer_paint(&self, id: &LayerId) -> Option<&Paint> {
        self.layer(id).and_then(|l| l.paint.as_ref())
    }

    pub fn source_data(&self, id: &SourceId) -> Option<&FeatureCollection> {
        self.sources.get(id)
    }

    /// Number of live subscriptions for `(kind, layer)`.
    pub fn handler_count(&self, kind: EventKind, layer: Option<&LayerId>) -> usize {
        self.handlers
            .values()
            .filter(|(k, l)| *k == kind && l.as_ref() == layer)
            .count()
    }

    pub fn total_handlers(&self) -> usize {
        self.handlers.len()
    }

    /// Completes a pending `load_style` and notifies `StyleLoad` subscribers.
    pub fn finish_style_load(&mut self) {
        if self.style_url.is_none() {
            return;
        }
        self.style_loaded = true;
        self.emit_global(EventKind::StyleLoad);
    }

    pub fn emit_idle(&mut self) {
        self.emit_global(EventKind::Idle);
    }

    /// Moves the camera, emitting `Move` then `MoveEnd`.
    pub fn jump_to(&mut self, camera: Camera) {
        self.camera = camera;
        self.emit_global(EventKind::Move);
        self.emit_global(EventKind::MoveEnd);
    }

    /// Pointer click at a screen position.
    pub fn click(&mut self, point: Vec2) {
        let lng_lat = self.unproject(point);
        let subs: Vec<(HandlerId, Option<LayerId>)> = self
            .handlers
            .iter()
            .filter(|(_, (k, _))| *k == EventKind::Click)
            .map(|(h, (_, l))| (*h, l.clone()))
            .collect();

        for (handler, layer) in subs {
            let mut ev = MapEvent::new(handler, EventKind::Click, layer.clone());
            if let Some(layer) = &layer {
                let hits = self.query_rendered_features(
                    QueryRegion::Point(point),
                    std::slice::from_ref(layer),
                );
                if hits.is_empty() {
                    continue;
                }
            }
            ev.point = Some(point);
            ev.lng_lat = Some(lng_lat);
            self.queue.push(ev);
        }
    }

    /// Moves the pointer, emitting enter/leave for hover-subscribed layers.
    pub fn hover(&mut self, point: Vec2) {
        let watched: BTreeSet<LayerId> = self
            .handlers
            .values()
            .filter(|(k, _)| matches!(k, EventKind::MouseEnter | EventKind::MouseLeave))
            .filter_map(|(_, l)| l.clone())
            .collect();

        let lng_lat = self.unproject(point);
        for layer in watched {
            let hits = self.query_rendered_features(
                QueryRegion::Point(point),
                std::slice::from_ref(&layer),
            );
            let was = self.hovered.contains(&layer);
            let kind = match (was, hits.is_empty()) {
                (false, false) => EventKind::MouseEnter,
                (true, true) => EventKind::MouseLeave,
                _ => continue,
            };
            if kind == EventKind::MouseEnter {
                self.hovered.insert(layer.clone());
            } else {
                self.hovered.remove(&layer);
            }

            let subs: Vec<HandlerId> = self
                .handlers
                .iter()
                .filter(|(_, (k, l))| *k == kind && l.as_ref() == Some(&layer))
                .map(|(h, _)| *h)
                .collect();
            for handler in subs {
                let mut ev = MapEvent::new(handler, kind, Some(layer.clone()));
                ev.point = Some(point);
                ev.lng_lat = Some(lng_lat);
                self.queue.push(ev);
            }
        }
    }

    fn emit_global(&mut self, kind: EventKind) {
        let camera = self.camera;
        let subs: Vec<HandlerId> = self
            .handlers
            .iter()
            .filter(|(_, (k, l))| *k == kind && l.is_none())
            .map(|(h, _)| *h)
            .collect();
        for handler in subs {
            let mut ev = MapEvent::new(handler, kind, None);
            ev.camera = Some(camera);
            self.queue.push(ev);
        }
    }

    fn layer(&self, id: &LayerId) -> Option<&HeadlessLayer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    fn layer_mut(&mut self, id: &LayerId) -> Option<&mut HeadlessLayer> {
        self.layers.iter_mut().find(|l| &l.id == id)
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.camera.zoom)
    }

    fn hits(&self, layer: &HeadlessLayer, feature: &Feature, rect: &ScreenRect) -> bool {
        let Some(geometry) = &feature.geometry else {
            return false;
        };
        match geometry {
            Geometry::Point(p) => {
                let s = self.project(*p);
                let radius = match layer.paint {
                    Some(Paint::Circle { radius_px, .. }) => radius_px,
                    _ => 0.0,
                };
                s.distance(rect.clamp(s)) <= radius
            }
            Geometry::LineString(v) => v.iter().any(|p| rect.contains(self.project(*p))),
            Geometry::Polygon(rings) => self.polygon_hits(rings, rect),
            Geometry::MultiPolygon(polys) => polys.iter().any(|r| self.polygon_hits(r, rect)),
        }
    }

    fn polygon_hits(&self, rings: &[Vec<LngLat>], rect: &ScreenRect) -> bool {
        let Some(outer) = rings.first() else {
            return false;
        };
        if outer.iter().any(|p| rect.contains(self.project(*p))) {
            return true;
        }
        let probes = [
            rect.min,
            rect.max,
            Vec2::new(rect.min.x, rect.max.y),
            Vec2::new(rect.max.x, rect.min.y),
            rect.center(),
        ];
        probes
            .iter()
            .any(|p| point_in_ring(self.unproject(*p), outer))
    }
}

fn mercator(p: LngLat) -> (f64, f64) {
    let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (p.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn inverse_mercator(x: f64, y: f64) -> LngLat {
    let lng = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    LngLat::new(lng, lat)
}

impl MapEngine for HeadlessEngine {
    fn load_style(&mut self, url: &str) -> Result<(), EngineError> {
        if url.trim().is_empty() {
            return Err(EngineError::Style("empty style URL".to_string()));
        }
        self.style_url = Some(url.to_string());
        self.style_loaded = false;
        self.hovered.clear();
        self.layers = vec![
            HeadlessLayer::style("background", LayerType::Background),
            HeadlessLayer::style("road", LayerType::Line),
            HeadlessLayer::style("road-label", LayerType::Symbol),
            HeadlessLayer::style("poi-label", LayerType::Symbol),
        ];
        tracing::debug!(url, "headless style load started");
        Ok(())
    }

    fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    fn style_layers(&self) -> Vec<(LayerId, LayerType)> {
        self.layers
            .iter()
            .map(|l| (l.id.clone(), l.layer_type))
            .collect()
    }

    fn has_layer(&self, id: &LayerId) -> bool {
        self.layer(id).is_some()
    }

    fn add_layer(&mut self, spec: LayerSpec, before: Option<&LayerId>) -> Result<(), EngineError> {
        if !self.style_loaded {
            return Err(EngineError::StyleNotLoaded);
        }
        if self.has_layer(&spec.id) {
            return Err(EngineError::DuplicateLayer(spec.id));
        }
        if !self.sources.contains_key(&spec.source) {
            return Err(EngineError::UnknownSource(spec.source));
        }
        let index = match before {
            Some(b) => self
                .layers
                .iter()
                .position(|l| &l.id == b)
                .ok_or_else(|| EngineError::UnknownLayer(b.clone()))?,
            None => self.layers.len(),
        };
        self.layers.insert(index, HeadlessLayer::from_spec(spec));
        Ok(())
    }

    fn set_filter(&mut self, id: &LayerId, filter: FilterExpr) -> Result<(), EngineError> {
        let layer = self
            .layer_mut(id)
            .ok_or_else(|| EngineError::UnknownLayer(id.clone()))?;
        layer.filter = filter;
        Ok(())
    }

    fn has_source(&self, id: &SourceId) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, id: SourceId, data: FeatureCollection) -> Result<(), EngineError> {
        if !self.style_loaded {
            return Err(EngineError::StyleNotLoaded);
        }
        if self.sources.contains_key(&id) {
            return Err(EngineError::DuplicateSource(id));
        }
        self.sources.insert(id, data);
        Ok(())
    }

    fn set_source_data(
        &mut self,
        id: &SourceId,
        data: FeatureCollection,
    ) -> Result<(), EngineError> {
        let slot = self
            .sources
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownSource(id.clone()))?;
        *slot = data;
        Ok(())
    }

    fn query_rendered_features(
        &self,
        region: QueryRegion,
        layers: &[LayerId],
    ) -> Vec<RenderedFeature> {
        if !self.style_loaded {
            return Vec::new();
        }
        let rect = region.as_rect();
        let mut out = Vec::new();
        for layer in self.layers.iter().rev() {
            if !layers.is_empty() && !layers.contains(&layer.id) {
                continue;
            }
            if let Some(min) = layer.min_zoom
                && self.camera.zoom < min
            {
                continue;
            }
            let Some(source) = &layer.source else {
                continue;
            };
            let Some(data) = self.sources.get(source) else {
                continue;
            };
            for feature in &data.features {
                if layer.filter.matches(feature) && self.hits(layer, feature, &rect) {
                    out.push(RenderedFeature {
                        feature: feature.clone(),
                        layer: layer.id.clone(),
                        source: source.clone(),
                    });
                }
            }
        }
        out
    }

    fn project(&self, position: LngLat) -> Vec2 {
        let ws = self.world_size();
        let (cx, cy) = mercator(self.camera.center);
        let (x, y) = mercator(position);
        Vec2::new(
            (x - cx) * ws + self.viewport.x * 0.5,
            (y - cy) * ws + self.viewport.y * 0.5,
        )
    }

    fn unproject(&self, point: Vec2) -> LngLat {
        let ws = self.world_size();
        let (cx, cy) = mercator(self.camera.center);
        inverse_mercator(
            (point.x - self.viewport.x * 0.5) / ws + cx,
            (point.y - self.viewport.y * 0.5) / ws + cy,
        )
    }

    fn bounds(&self) -> Option<GeoBounds> {
        if !self.style_loaded {
            return None;
        }
        let nw = self.unproject(Vec2::new(0.0, 0.0));
        let se = self.unproject(self.viewport);
        Some(GeoBounds::from_corners(nw, se))
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn on(&mut self, kind: EventKind, layer: Option<&LayerId>) -> HandlerId {
        let id = HandlerId(self.next_handler);
        self.next_handler += 1;
        self.handlers.insert(id, (kind, layer.cloned()));
        id
    }

    fn off(&mut self, handler: HandlerId) -> bool {
        self.handlers.remove(&handler).is_some()
    }

    fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.queue)
    }
}
