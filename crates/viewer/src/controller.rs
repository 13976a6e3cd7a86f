//! The coordinator: owns the engine handle and drives fetch, recolor and
//! selection from engine events.
//!
//! Everything runs on one task. Callers feed wall-clock time in through
//! [`MapController::tick`] (or the `process_events` / `poll` / `fetch`
//! steps it is made of); debounced work fires on the first tick past its
//! deadline.

use engine::{
    Camera, Cursor, EngineError, EventKind, LayerId, MapEngine, MapEvent, QueryRegion, SourceId,
};
use foundation::math::round_to;
use foundation::{FeatureId, GeoBounds, LngLat, Time, Vec2};
use listings::{FetchOutcome, Listing, ListingSource, ViewportFetcher};
use matching::find_buildings_for_listings;
use runtime::{Debounce, ReadinessGate};
use tracing::{debug, info, warn};

use crate::config::{EmptyClickPolicy, ViewerConfig};
use crate::highlight::{
    self, BASE_LAYER, MARKER_LAYER, MARKER_SOURCE, PROPERTY_LAYER, layer, property_filter,
};
use crate::markers::marker_features;
use crate::router::EventRouter;
use crate::selection::{BuildingSelection, ClickTarget, DisplayPanel, SelectionState};

/// Where an engine subscription is dispatched.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// One-shot readiness subscription.
    StyleLoad,
    /// One-shot: the first idle triggers the initial fetch.
    FirstIdle,
    Move,
    MoveEnd,
    BuildingClick,
    MarkerClick,
    HoverEnter(LayerId),
    HoverLeave(LayerId),
}

/// Work that needs a loaded style.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Deferred {
    InstallLayers,
    Recolor,
}

pub struct MapController<E, S, P> {
    engine: E,
    fetcher: ViewportFetcher<S>,
    panel: P,
    config: ViewerConfig,
    router: EventRouter<Route>,
    listings: Vec<Listing>,
    selection: SelectionState,
    property_buildings: Vec<FeatureId>,
    fetch_debounce: Debounce<()>,
    recolor_debounce: Debounce<()>,
    readiness: ReadinessGate<Deferred>,
    fetch_now: bool,
    hovered: Vec<LayerId>,
    camera_readout: Camera,
}

impl<E, S, P> MapController<E, S, P>
where
    E: MapEngine,
    S: ListingSource,
    P: DisplayPanel,
{
    /// Takes ownership of `engine`, starts the style load and subscribes to
    /// the events the viewer reacts to.
    pub fn new(
        mut engine: E,
        source: S,
        panel: P,
        config: ViewerConfig,
    ) -> Result<Self, EngineError> {
        engine.load_style(&config.style_url)?;
        let camera_readout = readout(engine.camera());

        let mut controller = Self {
            fetcher: ViewportFetcher::new(source, config.locale.clone()),
            panel,
            router: EventRouter::new(),
            listings: Vec::new(),
            selection: SelectionState::Idle,
            property_buildings: Vec::new(),
            fetch_debounce: Debounce::new(config.fetch_debounce_ms),
            recolor_debounce: Debounce::new(config.recolor_debounce_ms),
            readiness: ReadinessGate::new(),
            fetch_now: false,
            hovered: Vec::new(),
            camera_readout,
            config,
            engine,
        };

        for (kind, route) in [
            (EventKind::Idle, Route::FirstIdle),
            (EventKind::Move, Route::Move),
            (EventKind::MoveEnd, Route::MoveEnd),
            (EventKind::Click, Route::BuildingClick),
        ] {
            controller.router.attach(&mut controller.engine, kind, None, route);
        }
        controller.when_ready(Deferred::InstallLayers);

        info!(style = %controller.config.style_url, "map controller started");
        Ok(controller)
    }

    /// Unsubscribes everything and hands the engine back.
    pub fn shutdown(mut self) -> E {
        self.router.detach_all(&mut self.engine);
        self.fetch_debounce.cancel();
        self.recolor_debounce.cancel();
        self.readiness.release();
        info!("map controller shut down");
        self.engine
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn fetcher(&self) -> &ViewportFetcher<S> {
        &self.fetcher
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Building ids currently painted by the property layer.
    pub fn property_buildings(&self) -> &[FeatureId] {
        &self.property_buildings
    }

    /// Center (4 decimals) and zoom (2 decimals) for display.
    pub fn camera_readout(&self) -> Camera {
        self.camera_readout
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_style_loaded() && self.engine.has_layer(&layer(BASE_LAYER))
    }

    /// Drains engine events, runs due work, and fetches when a fetch is due.
    pub async fn tick(&mut self, now: Time) {
        self.process_events(now);
        if let Some(bounds) = self.poll(now) {
            self.fetch(bounds, now).await;
        }
    }

    pub fn process_events(&mut self, now: Time) {
        for event in self.engine.drain_events() {
            self.handle_event(event, now);
        }
    }

    pub fn handle_event(&mut self, event: MapEvent, now: Time) {
        let Some(route) = self.router.resolve(&event).cloned() else {
            debug!(handler = ?event.handler, kind = ?event.kind, "ignoring event from detached handler");
            return;
        };

        match route {
            Route::StyleLoad => self.on_style_load(),
            Route::FirstIdle => {
                self.router.detach(&mut self.engine, EventKind::Idle, None);
                self.fetch_now = true;
            }
            Route::Move => {
                let camera = event.camera.unwrap_or_else(|| self.engine.camera());
                self.camera_readout = readout(camera);
            }
            Route::MoveEnd => {
                self.fetch_debounce.schedule(now, ());
            }
            Route::BuildingClick => self.on_building_click(&event),
            Route::MarkerClick => self.on_marker_click(&event),
            Route::HoverEnter(layer) => {
                if !self.hovered.contains(&layer) {
                    self.hovered.push(layer);
                }
                self.engine.set_cursor(Cursor::Pointer);
            }
            Route::HoverLeave(layer) => {
                self.hovered.retain(|l| l != &layer);
                if self.hovered.is_empty() {
                    self.engine.set_cursor(Cursor::Default);
                }
            }
        }
    }

    /// Runs due debounced work. Returns the bounds to fetch for, if a fetch
    /// is due and the viewport is known.
    pub fn poll(&mut self, now: Time) -> Option<GeoBounds> {
        if self.recolor_debounce.poll(now).is_some() {
            self.when_ready(Deferred::Recolor);
        }

        let debounced = self.fetch_debounce.poll(now).is_some();
        let immediate = std::mem::take(&mut self.fetch_now);
        if !(debounced || immediate) {
            return None;
        }
        let bounds = self.engine.bounds();
        if bounds.is_none() {
            debug!("viewport bounds unavailable; skipping fetch");
        }
        bounds
    }

    pub async fn fetch(&mut self, bounds: GeoBounds, now: Time) -> bool {
        let outcome = self.fetcher.fetch(bounds).await;
        self.apply_fetch(outcome, now)
    }

    /// Returns true when the active listing set changed.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome, now: Time) -> bool {
        match outcome {
            FetchOutcome::Replaced(listings) => self.set_listings(listings, now),
            FetchOutcome::Skipped => false,
            FetchOutcome::Failed(err) => {
                debug!(error = %err, kept = self.listings.len(), "keeping previous listings");
                false
            }
        }
    }

    /// Replaces the active set wholesale. An identical set is a no-op.
    pub fn set_listings(&mut self, listings: Vec<Listing>, now: Time) -> bool {
        if listings == self.listings {
            debug!(count = listings.len(), "listing set unchanged");
            return false;
        }
        self.listings = listings;
        self.sync_markers();
        self.recolor_debounce.schedule(now, ());
        true
    }

    /// Coordinator entry point for every qualifying click.
    pub fn select(&mut self, target: ClickTarget) {
        let selection = BuildingSelection::resolve(&target, &self.listings, &self.config.matching);
        info!(
            building = ?selection.building,
            tier = ?selection.tier,
            count = selection.matched_listings.len(),
            "building selected"
        );
        self.publish(selection);
    }

    /// Highlight layers always follow the published building, including
    /// none at all.
    fn publish(&mut self, selection: BuildingSelection) {
        if let Err(err) =
            highlight::highlight_selection(&mut self.engine, selection.building.as_ref())
        {
            warn!(error = %err, "failed to update selection layers");
        }
        self.panel.show(&selection.matched_listings, selection.coordinates);
        self.selection = SelectionState::Selected(selection);
    }

    fn on_building_click(&mut self, event: &MapEvent) {
        let (Some(point), Some(lng_lat)) = (event.point, event.lng_lat) else {
            return;
        };
        let building = self
            .engine
            .query_rendered_features(QueryRegion::Point(point), &[layer(BASE_LAYER)])
            .into_iter()
            .next()
            .map(|hit| hit.feature);

        match building {
            Some(feature) if feature.id.is_some() => {
                self.select(ClickTarget::new(Some(feature), lng_lat));
            }
            Some(_) => debug!("clicked building has no id"),
            None => self.on_empty_click(point, lng_lat),
        }
    }

    fn on_marker_click(&mut self, event: &MapEvent) {
        let (Some(point), Some(lng_lat)) = (event.point, event.lng_lat) else {
            return;
        };
        let building = self
            .engine
            .query_rendered_features(QueryRegion::Point(point), &[layer(BASE_LAYER)])
            .into_iter()
            .next()
            .map(|hit| hit.feature);
        self.select(ClickTarget::new(building, lng_lat));
    }

    fn on_empty_click(&mut self, point: Vec2, lng_lat: LngLat) {
        if self.config.empty_click == EmptyClickPolicy::Sticky {
            return;
        }
        // A marker under the pointer gets its own click route.
        let on_marker = !self
            .engine
            .query_rendered_features(QueryRegion::Point(point), &[layer(MARKER_LAYER)])
            .is_empty();
        if on_marker {
            return;
        }
        debug!(lng = lng_lat.lng, lat = lng_lat.lat, "empty click clears selection");
        self.publish(BuildingSelection::empty_at(lng_lat));
    }

    fn on_style_load(&mut self) {
        self.router.detach(&mut self.engine, EventKind::StyleLoad, None);
        for action in self.readiness.release() {
            self.run(action);
        }
    }

    fn when_ready(&mut self, action: Deferred) {
        let ready = match action {
            Deferred::InstallLayers => self.engine.is_style_loaded(),
            Deferred::Recolor => self.is_ready(),
        };
        if ready {
            self.run(action);
        } else if self.readiness.defer(action) {
            debug!("engine not ready; waiting for style load");
            self.router.attach(&mut self.engine, EventKind::StyleLoad, None, Route::StyleLoad);
        }
    }

    fn run(&mut self, action: Deferred) {
        let result = match action {
            Deferred::InstallLayers => self.install_layers(),
            Deferred::Recolor => self.recolor(),
        };
        if let Err(err) = result {
            warn!(error = %err, ?action, "deferred map update failed");
        }
    }

    fn install_layers(&mut self) -> Result<(), EngineError> {
        highlight::install_layers(&mut self.engine, self.config.marker_radius_px)?;
        let property = layer(PROPERTY_LAYER);
        self.router.attach(
            &mut self.engine,
            EventKind::MouseEnter,
            Some(&property),
            Route::HoverEnter(property.clone()),
        );
        self.router.attach(
            &mut self.engine,
            EventKind::MouseLeave,
            Some(&property),
            Route::HoverLeave(property.clone()),
        );
        self.sync_markers();
        debug!("viewer layers installed");
        Ok(())
    }

    /// Pushes one marker per listing and re-attaches the marker routes.
    fn sync_markers(&mut self) {
        let source = SourceId::new(MARKER_SOURCE);
        let markers = layer(MARKER_LAYER);
        if !self.engine.has_source(&source) || !self.engine.has_layer(&markers) {
            return;
        }
        if let Err(err) = self
            .engine
            .set_source_data(&source, marker_features(&self.listings))
        {
            warn!(error = %err, "failed to update listing markers");
            return;
        }
        for (kind, route) in [
            (EventKind::Click, Route::MarkerClick),
            (EventKind::MouseEnter, Route::HoverEnter(markers.clone())),
            (EventKind::MouseLeave, Route::HoverLeave(markers.clone())),
        ] {
            self.router.attach(&mut self.engine, kind, Some(&markers), route);
        }
    }

    fn recolor(&mut self) -> Result<(), EngineError> {
        let base = [layer(BASE_LAYER)];
        let engine = &self.engine;
        let ids = find_buildings_for_listings(
            &self.listings,
            |at, buffer_px| {
                let region = QueryRegion::around(engine.project(at), buffer_px);
                engine
                    .query_rendered_features(region, &base)
                    .into_iter()
                    .map(|hit| hit.feature)
                    .collect()
            },
            &self.config.matching,
        );
        self.engine.set_filter(&layer(PROPERTY_LAYER), property_filter(&ids))?;
        info!(
            listings = self.listings.len(),
            buildings = ids.len(),
            "recolored property buildings"
        );
        self.property_buildings = ids;
        Ok(())
    }
}

fn readout(camera: Camera) -> Camera {
    Camera::new(camera.center.rounded(4), round_to(camera.zoom, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{SELECTED_LAYER, SELECTED_LIGHT_LAYER};
    use engine::headless::HeadlessEngine;
    use engine::FilterExpr;
    use foundation::math::Located;
    use foundation::{Feature, FeatureCollection, Geometry};
    use listings::{BoxFuture, FetchError, StaticListingSource, ViewportBoundsQuery};
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

    fn t(ms: u64) -> Time {
        Time::from_millis(ms)
    }

    #[derive(Debug, Default)]
    struct RecordingPanel {
        shown: Vec<(Vec<i64>, Option<LngLat>)>,
    }

    impl DisplayPanel for RecordingPanel {
        fn show(&mut self, listings: &[Listing], coordinates: Option<LngLat>) {
            self.shown.push((listings.iter().map(|l| l.id).collect(), coordinates));
        }
    }

    struct FailingSource;

    impl ListingSource for FailingSource {
        fn query<'a>(
            &'a self,
            _query: &'a ViewportBoundsQuery,
        ) -> BoxFuture<'a, Result<Vec<Listing>, FetchError>> {
            Box::pin(async { Err(FetchError::Transport("connection refused".to_string())) })
        }
    }

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
            .with_property("extrude", "true")
            .with_property("height", 24.0)
    }

    fn listings() -> Vec<Listing> {
        vec![
            Listing::at(1, LngLat::new(C1.lng + 0.00005, C1.lat + 0.00005)),
            Listing::at(2, LngLat::new(C1.lng - 0.0001, C1.lat)),
            Listing::at(3, C2),
            Listing::at(4, LngLat::new(32.8572, 39.8462)),
        ]
    }

    fn engine() -> HeadlessEngine {
        HeadlessEngine::new(Vec2::new(800.0, 600.0), Camera::new(C1, 17.0)).with_buildings(
            FeatureCollection::new(vec![footprint(101, C1), footprint(102, C2)]),
        )
    }

    fn controller_with<S: ListingSource>(
        source: S,
        policy: EmptyClickPolicy,
    ) -> MapController<HeadlessEngine, S, RecordingPanel> {
        let config = ViewerConfig {
            empty_click: policy,
            ..ViewerConfig::default()
        };
        MapController::new(engine(), source, RecordingPanel::default(), config).unwrap()
    }

    type Harness = MapController<HeadlessEngine, StaticListingSource, RecordingPanel>;

    fn started(policy: EmptyClickPolicy) -> Harness {
        let mut c = controller_with(StaticListingSource::new(listings()), policy);
        c.engine_mut().finish_style_load();
        c.process_events(t(0));
        c
    }

    fn ids(listings: &[Listing]) -> Vec<i64> {
        listings.iter().map(|l| l.id).collect()
    }

    fn click_at(c: &mut Harness, at: LngLat) {
        let p = c.engine().project(at);
        c.engine_mut().click(p);
        c.process_events(t(0));
    }

    fn hover_at(c: &mut Harness, p: Vec2) -> Cursor {
        c.engine_mut().hover(p);
        c.process_events(t(0));
        c.engine().cursor()
    }

    #[test]
    fn layers_are_installed_on_style_load() {
        let mut c = controller_with(StaticListingSource::default(), EmptyClickPolicy::Sticky);
        assert!(!c.is_ready());
        c.engine_mut().finish_style_load();
        c.process_events(t(0));
        assert!(c.is_ready());
        assert!(c.engine().has_layer(&layer(MARKER_LAYER)));
        // The readiness subscription is one-shot.
        assert_eq!(c.engine().handler_count(EventKind::StyleLoad, None), 0);
    }

    #[tokio::test]
    async fn first_idle_fetches_exactly_once() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.engine_mut().emit_idle();
        c.engine_mut().emit_idle();
        c.tick(t(10)).await;
        assert_eq!(c.fetcher().issued(), 1);
        assert_eq!(ids(c.listings()), vec![1, 2, 3, 4]);

        c.engine_mut().emit_idle();
        c.tick(t(20)).await;
        assert_eq!(c.fetcher().issued(), 1);
    }

    #[test]
    fn move_end_fetch_is_debounced() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.engine_mut().jump_to(Camera::new(C1, 17.0));
        c.process_events(t(0));
        c.engine_mut().jump_to(Camera::new(C2, 17.0));
        c.process_events(t(300));

        assert_eq!(c.poll(t(1000)), None);
        let bounds = c.poll(t(1100)).expect("debounced fetch due");
        assert!(bounds.contains(C2));
        assert_eq!(c.poll(t(5000)), None);
    }

    #[test]
    fn camera_readout_is_rounded() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.engine_mut()
            .jump_to(Camera::new(LngLat::new(32.856789, 39.847123), 16.456));
        c.process_events(t(0));
        let r = c.camera_readout();
        assert_eq!(r.center, LngLat::new(32.8568, 39.8471));
        assert_eq!(r.zoom, 16.46);
    }

    #[test]
    fn listing_change_recolors_after_debounce() {
        let mut c = started(EmptyClickPolicy::Sticky);
        assert!(c.set_listings(listings(), t(0)));
        assert_eq!(c.poll(t(50)), None);
        assert!(c.property_buildings().is_empty());

        c.poll(t(100));
        let expected = vec![FeatureId::Num(101), FeatureId::Num(102)];
        assert_eq!(c.property_buildings(), expected.as_slice());
        assert_eq!(
            c.engine().layer_filter(&layer(PROPERTY_LAYER)),
            Some(&FilterExpr::IdIn(expected))
        );
        let markers = c.engine().source_data(&SourceId::new(MARKER_SOURCE)).unwrap();
        assert_eq!(markers.len(), 4);
    }

    #[test]
    fn unchanged_listing_set_is_ignored() {
        let mut c = started(EmptyClickPolicy::Sticky);
        assert!(c.set_listings(listings(), t(0)));
        c.poll(t(100));
        assert!(!c.set_listings(listings(), t(200)));
        assert!(c.apply_fetch(FetchOutcome::Replaced(vec![]), t(300)));
        assert!(!c.apply_fetch(FetchOutcome::Skipped, t(400)));
    }

    #[test]
    fn recolor_waits_for_style_load() {
        let mut c = controller_with(StaticListingSource::default(), EmptyClickPolicy::Sticky);
        c.set_listings(listings(), t(0));
        c.poll(t(100));
        assert!(c.property_buildings().is_empty());

        c.engine_mut().finish_style_load();
        c.process_events(t(150));
        assert_eq!(
            c.property_buildings(),
            &[FeatureId::Num(101), FeatureId::Num(102)]
        );
        // Markers created at install time reflect the listings set earlier.
        let markers = c.engine().source_data(&SourceId::new(MARKER_SOURCE)).unwrap();
        assert_eq!(markers.len(), 4);
    }

    #[test]
    fn building_click_selects_listings_inside_footprint() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.set_listings(listings(), t(0));
        // Off the markers, inside building 101.
        click_at(&mut c, LngLat::new(C1.lng + 0.00015, C1.lat - 0.00015));

        let selection = c.selection().current().expect("selected");
        assert_eq!(selection.building, Some(FeatureId::Num(101)));
        assert_eq!(selection.tier, MatchTier::Footprint);
        assert_eq!(ids(&selection.matched_listings), vec![1, 2]);

        let anchor = selection.coordinates.unwrap();
        assert!((anchor.lng - (C1.lng - 0.00004)).abs() < 1e-9);
        assert_eq!(c.panel().shown.len(), 1);
        assert_eq!(c.panel().shown[0].0, vec![1, 2]);
        for l in [SELECTED_LAYER, SELECTED_LIGHT_LAYER] {
            assert_eq!(
                c.engine().layer_filter(&layer(l)),
                Some(&FilterExpr::IdEq(FeatureId::Num(101)))
            );
        }
    }

    #[test]
    fn every_click_replaces_the_selection() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.set_listings(listings(), t(0));
        click_at(&mut c, LngLat::new(C1.lng + 0.00015, C1.lat - 0.00015));
        click_at(&mut c, LngLat::new(C2.lng + 0.00015, C2.lat - 0.00015));
        let selection = c.selection().current().unwrap();
        assert_eq!(selection.building, Some(FeatureId::Num(102)));
        assert_eq!(ids(&selection.matched_listings), vec![3]);
    }

    #[test]
    fn marker_click_without_building_uses_click_point() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.set_listings(listings(), t(0));
        click_at(&mut c, LngLat::new(32.8572, 39.8462));

        let selection = c.selection().current().unwrap();
        assert_eq!(selection.building, None);
        assert_eq!(selection.tier, MatchTier::Radius);
        assert_eq!(ids(&selection.matched_listings), vec![3, 4]);
        assert_eq!(
            c.engine().layer_filter(&layer(SELECTED_LAYER)),
            Some(&FilterExpr::MatchNone)
        );
    }

    #[test]
    fn marker_click_without_building_drops_previous_highlight() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.set_listings(listings(), t(0));
        click_at(&mut c, LngLat::new(C1.lng + 0.00015, C1.lat - 0.00015));
        assert_eq!(c.selection().highlighted_building(), Some(&FeatureId::Num(101)));

        click_at(&mut c, LngLat::new(32.8572, 39.8462));
        assert_eq!(c.selection().highlighted_building(), None);
        assert_eq!(c.panel().shown.last().unwrap().0, vec![3, 4]);
        for l in [SELECTED_LAYER, SELECTED_LIGHT_LAYER] {
            assert_eq!(
                c.engine().layer_filter(&layer(l)),
                Some(&FilterExpr::MatchNone)
            );
        }
    }

    #[test]
    fn empty_click_is_sticky_by_default() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.set_listings(listings(), t(0));
        click_at(&mut c, LngLat::new(C1.lng + 0.00015, C1.lat - 0.00015));
        c.engine_mut().click(Vec2::new(5.0, 5.0));
        c.process_events(t(0));
        assert_eq!(c.panel().shown.len(), 1);
        assert_eq!(c.selection().highlighted_building(), Some(&FeatureId::Num(101)));
    }

    #[test]
    fn empty_click_can_clear() {
        let mut c = started(EmptyClickPolicy::Clear);
        c.set_listings(listings(), t(0));
        click_at(&mut c, LngLat::new(C1.lng + 0.00015, C1.lat - 0.00015));
        c.engine_mut().click(Vec2::new(5.0, 5.0));
        c.process_events(t(0));

        let cleared = c.selection().current().expect("empty selection");
        assert!(cleared.matched_listings.is_empty());
        assert_eq!(cleared.building, None);
        assert_eq!(cleared.tier, MatchTier::Empty);
        let (last, at) = c.panel().shown.last().unwrap();
        assert!(last.is_empty());
        assert_eq!(*at, cleared.coordinates);
        assert_eq!(*at, Some(c.engine().unproject(Vec2::new(5.0, 5.0))));
        for l in [SELECTED_LAYER, SELECTED_LIGHT_LAYER] {
            assert_eq!(
                c.engine().layer_filter(&layer(l)),
                Some(&FilterExpr::MatchNone)
            );
        }

        // A bare marker is not an empty click.
        click_at(&mut c, LngLat::new(32.8572, 39.8462));
        assert_eq!(c.panel().shown.last().unwrap().0, vec![3, 4]);
    }

    // A click on a footprint anchors at the footprint centroid, so the
    // published coordinates are the centroid rather than the raw click point.
    #[test]
    fn clicks_with_no_listings_publish_empty_selection() {
        let mut c = started(EmptyClickPolicy::Sticky);
        click_at(&mut c, LngLat::new(C1.lng + 0.00015, C1.lat - 0.00015));
        let selection = c.selection().current().unwrap();
        assert!(selection.matched_listings.is_empty());
        assert_eq!(selection.tier, MatchTier::Empty);
        let anchor = selection.coordinates.unwrap();
        assert!((anchor.lng - (C1.lng - 0.00004)).abs() < 1e-9);
        assert_eq!(c.panel().shown, vec![(vec![], selection.coordinates)]);
    }

    #[test]
    fn marker_resync_does_not_stack_handlers() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.set_listings(listings(), t(0));
        c.set_listings(listings()[..2].to_vec(), t(10));
        let markers = layer(MARKER_LAYER);
        assert_eq!(c.engine().handler_count(EventKind::Click, Some(&markers)), 1);
        assert_eq!(c.engine().handler_count(EventKind::MouseEnter, Some(&markers)), 1);
        let data = c.engine().source_data(&SourceId::new(MARKER_SOURCE)).unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn hover_cursor_tracks_interactive_layers() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.set_listings(listings(), t(0));
        c.poll(t(100));

        let on_building = c.engine().project(LngLat::new(C1.lng + 0.00015, C1.lat - 0.00015));
        let on_marker = c.engine().project(listings()[0].position());
        assert_eq!(hover_at(&mut c, on_building), Cursor::Pointer);
        assert_eq!(hover_at(&mut c, on_marker), Cursor::Pointer);
        // Leaving the marker while still over the building keeps the pointer.
        assert_eq!(hover_at(&mut c, on_building), Cursor::Pointer);
        assert_eq!(hover_at(&mut c, Vec2::new(5.0, 5.0)), Cursor::Default);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_listings() {
        let mut c = controller_with(FailingSource, EmptyClickPolicy::Sticky);
        c.engine_mut().finish_style_load();
        c.process_events(t(0));
        c.set_listings(listings(), t(0));

        let bounds = c.engine().bounds().unwrap();
        assert!(!c.fetch(bounds, t(10)).await);
        assert_eq!(ids(c.listings()), vec![1, 2, 3, 4]);
        assert_eq!(c.fetcher().issued(), 1);
    }

    #[test]
    fn shutdown_releases_all_subscriptions() {
        let mut c = started(EmptyClickPolicy::Sticky);
        c.set_listings(listings(), t(0));
        let engine = c.shutdown();
        assert_eq!(engine.total_handlers(), 0);
    }
}
