//! Runs the viewer controller against a headless engine loaded from files.

use std::path::Path;

use engine::headless::HeadlessEngine;
use engine::{Camera, MapEngine};
use foundation::math::Located;
use foundation::{FeatureCollection, FeatureId, LngLat, Time, Vec2};
use listings::{Listing, StaticListingSource};
use serde_json::Value;
use tracing::debug;
use viewer::{BuildingSelection, DisplayPanel, MapController, ViewerConfig};

pub const VIEWPORT: Vec2 = Vec2 {
    x: 1280.0,
    y: 960.0,
};

/// Panel that keeps what it was last asked to show.
#[derive(Debug, Default)]
pub struct CollectingPanel {
    pub last: Option<(Vec<Listing>, Option<LngLat>)>,
}

impl DisplayPanel for CollectingPanel {
    fn show(&mut self, listings: &[Listing], coordinates: Option<LngLat>) {
        self.last = Some((listings.to_vec(), coordinates));
    }
}

type Offline = MapController<HeadlessEngine, StaticListingSource, CollectingPanel>;

pub struct OfflineScene {
    listings: Vec<Listing>,
    buildings: FeatureCollection,
    camera: Camera,
    config: ViewerConfig,
}

impl OfflineScene {
    /// Buildings without an `extrude` property are marked extrudable so the
    /// base layer renders them.
    pub fn new(listings: Vec<Listing>, mut buildings: FeatureCollection, config: ViewerConfig) -> Self {
        for feature in &mut buildings.features {
            feature
                .properties
                .entry("extrude")
                .or_insert_with(|| Value::from("true"));
        }
        Self {
            listings,
            buildings,
            camera: config.camera.into(),
            config,
        }
    }

    pub fn load(listings: &Path, buildings: &Path, config: ViewerConfig) -> Result<Self, String> {
        let listings: Vec<Listing> = read_json(listings)?;
        let buildings: FeatureCollection = read_json(buildings)?;
        Ok(Self::new(listings, buildings, config))
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.camera.zoom = zoom;
        self
    }

    /// Moves the camera to the mean listing position, keeping the zoom.
    pub fn centered_on_listings(mut self) -> Self {
        if self.listings.is_empty() {
            return self;
        }
        let n = self.listings.len() as f64;
        let (lng, lat) = self.listings.iter().fold((0.0, 0.0), |(lng, lat), l| {
            let p = l.position();
            (lng + p.lng, lat + p.lat)
        });
        self.camera.center = LngLat::new(lng / n, lat / n);
        self
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    fn start(&self) -> Result<Offline, String> {
        let engine =
            HeadlessEngine::new(VIEWPORT, self.camera).with_buildings(self.buildings.clone());
        let mut controller = MapController::new(
            engine,
            StaticListingSource::default(),
            CollectingPanel::default(),
            self.config.clone(),
        )
        .map_err(|e| format!("failed to start map controller: {e}"))?;

        controller.engine_mut().finish_style_load();
        controller.process_events(Time::ZERO);
        if !controller.is_ready() {
            return Err("style did not finish loading".to_string());
        }
        controller.set_listings(self.listings.clone(), Time::ZERO);
        controller.poll(Time::from_millis(self.config.recolor_debounce_ms));
        debug!(
            buildings = self.buildings.len(),
            listings = self.listings.len(),
            "offline scene ready"
        );
        Ok(controller)
    }

    /// Ids of the buildings highlighted as containing listings.
    pub fn matched_buildings(&self) -> Result<Vec<FeatureId>, String> {
        Ok(self.start()?.property_buildings().to_vec())
    }

    /// Clicks at `at` and returns the resulting selection, if the click
    /// qualified.
    pub fn select_at(&self, at: LngLat) -> Result<Option<BuildingSelection>, String> {
        let mut controller = self.start()?;
        let point = controller.engine().project(at);
        controller.engine_mut().click(point);
        controller.process_events(Time::ZERO);
        Ok(controller.selection().current().cloned())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::{Feature, Geometry};
    use matching::MatchTier;
    use pretty_assertions::assert_eq;

    const C1: LngLat = LngLat {
        lng: 32.8552,
        lat: 39.8472,
    };
    const C2: LngLat = LngLat {
        lng: 32.8560,
        lat: 39.8472,
    };

    fn footprint(id: u64, c: LngLat) -> Feature {
        let h = 0.0002;
        let ring = vec![
            LngLat::new(c.lng - h, c.lat - h),
            LngLat::new(c.lng + h, c.lat - h),
            LngLat::new(c.lng + h, c.lat + h),
            LngLat::new(c.lng - h, c.lat + h),
            LngLat::new(c.lng - h, c.lat - h),
        ];
        Feature::new(Some(FeatureId::Num(id)), Some(Geometry::Polygon(vec![ring])))
    }

    fn scene() -> OfflineScene {
        let listings = vec![
            Listing::at(1, LngLat::new(C1.lng + 0.00005, C1.lat)),
            Listing::at(2, LngLat::new(C1.lng - 0.0001, C1.lat + 0.00005)),
        ];
        let buildings = FeatureCollection::new(vec![footprint(7, C1), footprint(8, C2)]);
        OfflineScene::new(listings, buildings, ViewerConfig::default())
            .with_camera(Camera::new(C1, 17.0))
    }

    #[test]
    fn buildings_are_marked_extrudable() {
        let s = scene();
        for f in &s.buildings.features {
            assert_eq!(f.property("extrude"), Some(&Value::from("true")));
        }
    }

    #[test]
    fn centers_on_listing_mean() {
        let s = scene().centered_on_listings();
        let c = s.camera().center;
        assert!((c.lng - (C1.lng - 0.000025)).abs() < 1e-9);
        assert!((c.lat - (C1.lat + 0.000025)).abs() < 1e-9);
        assert_eq!(s.camera().zoom, 17.0);
    }

    #[test]
    fn zoom_then_center_keeps_both() {
        let s = scene().with_zoom(16.5).centered_on_listings();
        assert_eq!(s.camera().zoom, 16.5);
        assert!((s.camera().center.lng - (C1.lng - 0.000025)).abs() < 1e-9);

        let untouched = scene().with_zoom(18.0);
        assert_eq!(untouched.camera(), Camera::new(C1, 18.0));
    }

    #[test]
    fn matches_only_buildings_with_listings() {
        assert_eq!(scene().matched_buildings().unwrap(), vec![FeatureId::Num(7)]);
    }

    #[test]
    fn selecting_a_building_returns_its_listings() {
        let selection = scene().select_at(C1).unwrap().expect("building under click");
        assert_eq!(selection.building, Some(FeatureId::Num(7)));
        assert_eq!(selection.tier, MatchTier::Footprint);
        let ids: Vec<i64> = selection.matched_listings.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn click_on_empty_ground_selects_nothing() {
        let away = LngLat::new(C1.lng, C1.lat - 0.003);
        assert!(scene().select_at(away).unwrap().is_none());
    }
}
