use foundation::feature::Geometry;
use foundation::math::{LngLat, Located, planar_distance, stable_total_cmp_f64};
use tracing::debug;

use crate::config::MatchConfig;
use crate::point_in_polygon;

/// Which resolution tier produced a building's listings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchTier {
    /// Listings inside the footprint's outer ring.
    Footprint,
    /// Listings within `radius_deg` of the centroid.
    Radius,
    /// The nearest `fallback_count` listings.
    Nearest,
    /// Nothing to match against.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingMatch<L> {
    pub tier: MatchTier,
    pub listings: Vec<L>,
}

/// Tiered listing lookup for a selected building.
///
/// 1. Footprint containment, when `footprint` is a polygon and hits anything.
/// 2. Every listing strictly within `radius_deg` of `centroid`, in input order.
/// 3. The `fallback_count` nearest listings, ascending by distance; ties keep
///    input order.
///
/// The first non-empty tier wins. An empty `listings` slice yields
/// [`MatchTier::Empty`].
pub fn match_listings_for_building<L: Located + Clone>(
    footprint: Option<&Geometry>,
    centroid: LngLat,
    listings: &[L],
    cfg: &MatchConfig,
) -> BuildingMatch<L> {
    if listings.is_empty() {
        return BuildingMatch {
            tier: MatchTier::Empty,
            listings: Vec::new(),
        };
    }

    if let Some(ring) = footprint.and_then(Geometry::outer_ring) {
        let inside: Vec<L> = listings
            .iter()
            .filter(|l| point_in_polygon(l.position(), ring))
            .cloned()
            .collect();
        if !inside.is_empty() {
            debug!(count = inside.len(), "listings inside building footprint");
            return BuildingMatch {
                tier: MatchTier::Footprint,
                listings: inside,
            };
        }
    }

    let nearby: Vec<L> = listings
        .iter()
        .filter(|l| planar_distance(l.position(), centroid) < cfg.radius_deg)
        .cloned()
        .collect();
    if !nearby.is_empty() {
        debug!(
            count = nearby.len(),
            radius_deg = cfg.radius_deg,
            "listings within search radius"
        );
        return BuildingMatch {
            tier: MatchTier::Radius,
            listings: nearby,
        };
    }

    let mut ranked: Vec<(f64, &L)> = listings
        .iter()
        .map(|l| (planar_distance(l.position(), centroid), l))
        .collect();
    // `sort_by` is stable, so equal distances keep input order.
    ranked.sort_by(|(da, _), (db, _)| stable_total_cmp_f64(*da, *db));
    ranked.truncate(cfg.fallback_count);
    debug!(count = ranked.len(), "no listings in range, using nearest");

    BuildingMatch {
        tier: MatchTier::Nearest,
        listings: ranked.into_iter().map(|(_, l)| l.clone()).collect(),
    }
}

/// Listings to show for a building. See [`match_listings_for_building`].
pub fn find_listings_for_building<L: Located + Clone>(
    footprint: Option<&Geometry>,
    centroid: LngLat,
    listings: &[L],
    cfg: &MatchConfig,
) -> Vec<L> {
    match_listings_for_building(footprint, centroid, listings, cfg).listings
}

#[cfg(test)]
mod tests {
    use super::{MatchTier, find_listings_for_building, match_listings_for_building};
    use crate::config::MatchConfig;
    use foundation::feature::Geometry;
    use foundation::math::{LngLat, Located};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Pin {
        id: u32,
        at: LngLat,
    }

    impl Located for Pin {
        fn position(&self) -> LngLat {
            self.at
        }
    }

    fn pin(id: u32, lng: f64, lat: f64) -> Pin {
        Pin {
            id,
            at: LngLat::new(lng, lat),
        }
    }

    fn square(center: LngLat, half: f64) -> Geometry {
        let (x, y) = (center.lng, center.lat);
        Geometry::Polygon(vec![vec![
            LngLat::new(x - half, y - half),
            LngLat::new(x + half, y - half),
            LngLat::new(x + half, y + half),
            LngLat::new(x - half, y + half),
            LngLat::new(x - half, y - half),
        ]])
    }

    fn ids(pins: &[Pin]) -> Vec<u32> {
        pins.iter().map(|p| p.id).collect()
    }

    #[test]
    fn footprint_tier_short_circuits_radius() {
        let center = LngLat::new(32.85, 39.84);
        let inside = pin(1, 32.85, 39.84);
        // 0.0015 deg away: inside the radius tier, outside the footprint.
        let near = pin(2, 32.8515, 39.84);
        let building = square(center, 0.0005);

        let got = match_listings_for_building(
            Some(&building),
            center,
            &[inside, near],
            &MatchConfig::default(),
        );
        assert_eq!(got.tier, MatchTier::Footprint);
        assert_eq!(ids(&got.listings), vec![1]);
    }

    #[test]
    fn radius_tier_keeps_input_order() {
        let center = LngLat::new(32.85, 39.84);
        let listings = vec![
            pin(1, 32.8519, 39.84),
            pin(2, 32.86, 39.84),
            pin(3, 32.8501, 39.84),
        ];
        let got = match_listings_for_building(None, center, &listings, &MatchConfig::default());
        assert_eq!(got.tier, MatchTier::Radius);
        assert_eq!(ids(&got.listings), vec![1, 3]);
    }

    #[test]
    fn empty_footprint_hit_falls_through_to_radius() {
        let center = LngLat::new(32.85, 39.84);
        let building = square(center, 0.0001);
        let listings = vec![pin(7, 32.851, 39.84)];
        let got =
            match_listings_for_building(Some(&building), center, &listings, &MatchConfig::default());
        assert_eq!(got.tier, MatchTier::Radius);
        assert_eq!(ids(&got.listings), vec![7]);
    }

    #[test]
    fn nearest_tier_returns_three_closest_ascending() {
        let click = LngLat::new(32.0, 39.0);
        let listings = vec![
            pin(1, 32.05, 39.0),
            pin(2, 32.01, 39.0),
            pin(3, 32.03, 39.0),
            pin(4, 32.02, 39.0),
            pin(5, 32.04, 39.0),
        ];
        let got = match_listings_for_building(None, click, &listings, &MatchConfig::default());
        assert_eq!(got.tier, MatchTier::Nearest);
        assert_eq!(ids(&got.listings), vec![2, 4, 3]);
    }

    #[test]
    fn nearest_tier_breaks_ties_by_input_order() {
        let click = LngLat::new(0.0, 0.0);
        let listings = vec![
            pin(1, 0.0, 1.0),
            pin(2, 1.0, 0.0),
            pin(3, 0.0, -1.0),
            pin(4, -1.0, 0.0),
        ];
        let got = find_listings_for_building(None, click, &listings, &MatchConfig::default());
        assert_eq!(ids(&got), vec![1, 2, 3]);
    }

    #[test]
    fn nearest_tier_with_fewer_than_three_returns_all() {
        let click = LngLat::new(0.0, 0.0);
        let listings = vec![pin(1, 2.0, 0.0), pin(2, 1.0, 0.0)];
        let got = find_listings_for_building(None, click, &listings, &MatchConfig::default());
        assert_eq!(ids(&got), vec![2, 1]);
    }

    #[test]
    fn fallback_count_is_configurable() {
        let click = LngLat::new(0.0, 0.0);
        let listings: Vec<Pin> = (1..=6).map(|i| pin(i, i as f64, 0.0)).collect();
        let cfg = MatchConfig {
            fallback_count: 5,
            ..MatchConfig::default()
        };
        let got = find_listings_for_building(None, click, &listings, &cfg);
        assert_eq!(ids(&got), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_listing_set_matches_nothing() {
        let center = LngLat::new(32.85, 39.84);
        let building = square(center, 0.001);
        let got = match_listings_for_building::<Pin>(
            Some(&building),
            center,
            &[],
            &MatchConfig::default(),
        );
        assert_eq!(got.tier, MatchTier::Empty);
        assert!(got.listings.is_empty());
    }

    #[test]
    fn repeated_calls_are_identical() {
        let center = LngLat::new(32.0, 39.0);
        let listings: Vec<Pin> = (0..10)
            .map(|i| pin(i, 32.0 + (i as f64) * 0.013, 39.0 - (i as f64) * 0.007))
            .collect();
        let cfg = MatchConfig::default();
        let a = find_listings_for_building(None, center, &listings, &cfg);
        let b = find_listings_for_building(None, center, &listings, &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn ankara_scenario() {
        let listing1 = pin(1, 32.85, 39.84);
        let listing2 = pin(2, 32.90, 39.90);
        let listings = vec![listing1.clone(), listing2.clone()];
        let cfg = MatchConfig::default();

        let building = square(LngLat::new(32.85, 39.84), 0.0003);
        let got = find_listings_for_building(
            Some(&building),
            LngLat::new(32.85, 39.84),
            &listings,
            &cfg,
        );
        assert_eq!(got, vec![listing1.clone()]);

        // About 5 km from listing 1, nothing within the radius tier.
        let far = LngLat::new(32.908, 39.87);
        let got = find_listings_for_building(None, far, &listings, &cfg);
        assert_eq!(got, vec![listing2, listing1]);
    }
}
