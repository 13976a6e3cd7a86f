use std::collections::BTreeSet;

use foundation::feature::{Feature, Geometry};
use foundation::ids::FeatureId;
use foundation::math::{LngLat, Located, planar_distance, ring_centroid};
use tracing::debug;

use crate::config::MatchConfig;

/// Outcome of probing the rendered buildings around one listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingBuilding {
    /// Index into the listing slice that was probed.
    pub listing_index: usize,
    /// Closest qualifying building and its centroid distance in degrees.
    pub building: Option<(FeatureId, f64)>,
}

/// Probes the buildings rendered around every listing.
///
/// `probe(position, buffer_px)` must return the building features rendered in
/// a `2 * buffer_px` square around the listing's projected screen position.
/// Among the polygon features returned, the one whose vertex-mean centroid is
/// closest to the listing and strictly within `building_threshold_deg` wins.
/// A winner without an engine id counts as no match.
pub fn associate_listings<L, P>(
    listings: &[L],
    mut probe: P,
    cfg: &MatchConfig,
) -> Vec<ListingBuilding>
where
    L: Located,
    P: FnMut(LngLat, f64) -> Vec<Feature>,
{
    let mut out = Vec::with_capacity(listings.len());

    for (listing_index, listing) in listings.iter().enumerate() {
        let at = listing.position();
        let candidates = probe(at, cfg.probe_buffer_px);

        let mut best: Option<(&Feature, f64)> = None;
        for feature in &candidates {
            let Some(ring) = feature.geometry.as_ref().and_then(Geometry::outer_ring) else {
                continue;
            };
            let Some(center) = ring_centroid(ring) else {
                continue;
            };
            let distance = planar_distance(at, center);
            if distance >= cfg.building_threshold_deg {
                continue;
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((feature, distance));
            }
        }

        let building = best.and_then(|(f, d)| f.id.clone().map(|id| (id, d)));
        match &building {
            Some((id, d)) => {
                debug!(listing_index, building = %id, distance = *d, "listing matched to building")
            }
            None if !candidates.is_empty() => {
                debug!(listing_index, lng = at.lng, lat = at.lat, "no building within threshold")
            }
            None => {}
        }
        out.push(ListingBuilding {
            listing_index,
            building,
        });
    }

    out
}

/// Ids of every rendered building that holds at least one listing.
///
/// Ids are unique and appear in the order their first listing was probed, so
/// each physical building is recolored once.
pub fn find_buildings_for_listings<L, P>(
    listings: &[L],
    probe: P,
    cfg: &MatchConfig,
) -> Vec<FeatureId>
where
    L: Located,
    P: FnMut(LngLat, f64) -> Vec<Feature>,
{
    let mut seen: BTreeSet<FeatureId> = BTreeSet::new();
    associate_listings(listings, probe, cfg)
        .into_iter()
        .filter_map(|m| m.building.map(|(id, _)| id))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
