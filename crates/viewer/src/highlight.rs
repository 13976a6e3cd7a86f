//! Layers the viewer installs on top of the base style, and their filters.

use engine::{
    EngineError, FilterExpr, Height, LayerId, LayerSpec, LayerType, MapEngine, Paint, SourceId,
    rgb8,
};
use foundation::{FeatureCollection, FeatureId};

/// Extruded base buildings from the style's vector tiles.
pub const BASE_LAYER: &str = "3d-buildings";
/// Buildings holding at least one listing.
pub const PROPERTY_LAYER: &str = "property-buildings";
pub const SELECTED_LAYER: &str = "selected-building";
/// Translucent column rising from the selected building's roof.
pub const SELECTED_LIGHT_LAYER: &str = "selected-building-light";
pub const MARKER_LAYER: &str = "property-markers";
pub const MARKER_SOURCE: &str = "property-markers";

pub const BUILDING_SOURCE: &str = "composite";
pub const BUILDING_SOURCE_LAYER: &str = "building";
pub const BASE_MIN_ZOOM: f64 = 15.0;
const LIGHT_COLUMN_HEIGHT: f64 = 50_000.0;

pub fn layer(id: &str) -> LayerId {
    LayerId::new(id)
}

fn building_layer(id: &str, paint: Paint) -> LayerSpec {
    LayerSpec::new(layer(id), SourceId::new(BUILDING_SOURCE), paint)
        .with_source_layer(BUILDING_SOURCE_LAYER)
}

fn extrusion(color: [f32; 4], opacity: f32) -> Paint {
    Paint::FillExtrusion {
        color,
        height: Height::property("height"),
        base: Height::property("min_height"),
        opacity,
    }
}

pub fn base_layer_spec() -> LayerSpec {
    building_layer(BASE_LAYER, extrusion(rgb8(0xc9, 0xc9, 0xc9), 1.0))
        .with_filter(FilterExpr::property_eq("extrude", "true"))
        .with_min_zoom(BASE_MIN_ZOOM)
}

pub fn property_layer_spec() -> LayerSpec {
    building_layer(PROPERTY_LAYER, extrusion(rgb8(0x1e, 0x90, 0xff), 1.0))
        .with_filter(property_filter(&[]))
}

pub fn selected_layer_spec() -> LayerSpec {
    building_layer(SELECTED_LAYER, extrusion(rgb8(0xe7, 0x4c, 0x3c), 0.85))
        .with_filter(selection_filter(None))
}

pub fn selected_light_layer_spec() -> LayerSpec {
    building_layer(
        SELECTED_LIGHT_LAYER,
        Paint::FillExtrusion {
            color: rgb8(0xc0, 0x39, 0x2b),
            height: Height::Constant(LIGHT_COLUMN_HEIGHT),
            base: Height::property("height"),
            opacity: 0.35,
        },
    )
    .with_filter(selection_filter(None))
}

/// Invisible hit targets, one per listing.
pub fn marker_layer_spec(radius_px: f64) -> LayerSpec {
    LayerSpec::new(
        layer(MARKER_LAYER),
        SourceId::new(MARKER_SOURCE),
        Paint::Circle {
            radius_px,
            color: rgb8(0x1e, 0x90, 0xff),
            opacity: 0.0,
        },
    )
}

pub fn property_filter(ids: &[FeatureId]) -> FilterExpr {
    FilterExpr::IdIn(ids.to_vec())
}

/// `None` resets a selection layer to match nothing.
pub fn selection_filter(id: Option<&FeatureId>) -> FilterExpr {
    match id {
        Some(id) => FilterExpr::IdEq(id.clone()),
        None => FilterExpr::MatchNone,
    }
}

/// First symbol layer in draw order; building layers go below it so labels
/// stay readable.
pub fn first_label_layer<E: MapEngine + ?Sized>(engine: &E) -> Option<LayerId> {
    engine
        .style_layers()
        .into_iter()
        .find(|(_, t)| *t == LayerType::Symbol)
        .map(|(id, _)| id)
}

/// Adds any missing viewer layers. Safe to call again after a style reload.
pub fn install_layers<E: MapEngine + ?Sized>(
    engine: &mut E,
    marker_radius_px: f64,
) -> Result<(), EngineError> {
    let label = first_label_layer(engine);
    for spec in [
        base_layer_spec(),
        property_layer_spec(),
        selected_layer_spec(),
        selected_light_layer_spec(),
    ] {
        if !engine.has_layer(&spec.id) {
            engine.add_layer(spec, label.as_ref())?;
        }
    }

    let source = SourceId::new(MARKER_SOURCE);
    if !engine.has_source(&source) {
        engine.add_source(source, FeatureCollection::default())?;
    }
    let markers = marker_layer_spec(marker_radius_px);
    if !engine.has_layer(&markers.id) {
        engine.add_layer(markers, None)?;
    }
    Ok(())
}

/// Points both selection layers at `id`; `None` returns them to idle.
pub fn highlight_selection<E: MapEngine + ?Sized>(
    engine: &mut E,
    id: Option<&FeatureId>,
) -> Result<(), EngineError> {
    engine.set_filter(&layer(SELECTED_LAYER), selection_filter(id))?;
    engine.set_filter(&layer(SELECTED_LIGHT_LAYER), selection_filter(id))
}
