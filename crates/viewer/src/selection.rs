use foundation::math::ring_centroid;
use foundation::{Feature, FeatureId, Geometry, LngLat};
use listings::Listing;
use matching::{MatchConfig, MatchTier, match_listings_for_building};

/// Receives the listings of the selected building.
pub trait DisplayPanel {
    fn show(&mut self, listings: &[Listing], coordinates: Option<LngLat>);
}

/// What a click landed on, after routing.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickTarget {
    /// Top-most base building under the pointer, if any.
    pub building: Option<Feature>,
    pub point: LngLat,
}

impl ClickTarget {
    pub fn new(building: Option<Feature>, point: LngLat) -> Self {
        Self { building, point }
    }

    pub fn footprint(&self) -> Option<&Geometry> {
        self.building.as_ref().and_then(|f| f.geometry.as_ref())
    }

    /// Vertex mean of a polygon footprint's outer ring, else the click point.
    pub fn anchor(&self) -> LngLat {
        self.footprint()
            .and_then(Geometry::outer_ring)
            .and_then(ring_centroid)
            .unwrap_or(self.point)
    }

    pub fn building_id(&self) -> Option<&FeatureId> {
        self.building.as_ref().and_then(|f| f.id.as_ref())
    }
}

/// The single active selection. Replaced on every qualifying click.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingSelection {
    pub coordinates: Option<LngLat>,
    pub matched_listings: Vec<Listing>,
    pub building: Option<FeatureId>,
    pub tier: MatchTier,
}

impl BuildingSelection {
    pub fn resolve(target: &ClickTarget, listings: &[Listing], cfg: &MatchConfig) -> Self {
        let anchor = target.anchor();
        let m = match_listings_for_building(target.footprint(), anchor, listings, cfg);
        Self {
            coordinates: Some(anchor),
            matched_listings: m.listings,
            building: target.building_id().cloned(),
            tier: m.tier,
        }
    }

    /// Nothing selected at `point`; used by the clearing empty-click policy.
    pub fn empty_at(point: LngLat) -> Self {
        Self {
            coordinates: Some(point),
            matched_listings: Vec::new(),
            building: None,
            tier: MatchTier::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(BuildingSelection),
}

impl SelectionState {
    pub fn current(&self) -> Option<&BuildingSelection> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Selected(s) => Some(s),
        }
    }

    pub fn highlighted_building(&self) -> Option<&FeatureId> {
        self.current().and_then(|s| s.building.as_ref())
    }
}
