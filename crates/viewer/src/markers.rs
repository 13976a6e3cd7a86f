//! Invisible per-listing click targets.

use foundation::{Feature, FeatureCollection, FeatureId, Geometry};
use foundation::math::Located;
use listings::Listing;

pub const LISTING_ID_PROPERTY: &str = "listing_id";

/// One point feature per listing, keyed by listing id.
pub fn marker_features(listings: &[Listing]) -> FeatureCollection {
    FeatureCollection::new(
        listings
            .iter()
            .map(|l| {
                let id = u64::try_from(l.id)
                    .map(FeatureId::Num)
                    .unwrap_or_else(|_| FeatureId::Str(l.id.to_string()));
                Feature::new(Some(id), Some(Geometry::Point(l.position())))
                    .with_property(LISTING_ID_PROPERTY, l.id)
                    .with_property("listing_number", l.listing_number.clone())
            })
            .collect(),
    )
}
