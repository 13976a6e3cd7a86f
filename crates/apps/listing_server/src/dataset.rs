//! In-memory listing table and the viewport query over it.

use std::path::Path;

use listings::Listing;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A stored row. Everything but the id may be null.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredListing {
    pub id: i64,
    #[serde(default)]
    pub listing_number: Option<Value>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub room_count: Option<String>,
    #[serde(default)]
    pub gross_area: Option<f64>,
    #[serde(default)]
    pub net_area: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl StoredListing {
    /// Coalesced API record; `None` when the row has no coordinates.
    pub fn to_listing(&self) -> Option<Listing> {
        let (latitude, longitude) = (self.latitude?, self.longitude?);
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Some(Listing {
            id: self.id,
            listing_number: match &self.listing_number {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
            latitude,
            longitude,
            price: self.price.map(|p| p.round() as i64).unwrap_or(0),
            property_type: text(&self.property_type),
            room_count: text(&self.room_count),
            gross_area: self.gross_area.unwrap_or(0.0),
            net_area: self.net_area.unwrap_or(0.0),
            address: text(&self.address),
            neighborhood: text(&self.neighborhood),
            district: text(&self.district),
            city: text(&self.city),
        })
    }
}

/// Bounding box, applied only when all four edges are known.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    fn contains(&self, l: &Listing) -> bool {
        l.latitude >= self.south
            && l.latitude <= self.north
            && l.longitude >= self.west
            && l.longitude <= self.east
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub bbox: Option<BoundingBox>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
}

fn same_text(column: &str, wanted: &Option<String>) -> bool {
    match wanted {
        Some(w) => column.to_lowercase() == w.to_lowercase(),
        None => true,
    }
}

#[derive(Debug, Default)]
pub struct Dataset {
    rows: Vec<Listing>,
}

impl Dataset {
    /// Drops rows without coordinates and sorts by id.
    pub fn from_rows(rows: Vec<StoredListing>) -> Self {
        let total = rows.len();
        let mut rows: Vec<Listing> = rows.iter().filter_map(StoredListing::to_listing).collect();
        rows.sort_by_key(|l| l.id);
        if rows.len() < total {
            tracing::info!(dropped = total - rows.len(), "rows without coordinates skipped");
        }
        Self { rows }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, DatasetError> {
        let rows: Vec<StoredListing> = serde_json::from_slice(bytes)?;
        Ok(Self::from_rows(rows))
    }

    pub async fn load(path: &Path) -> Result<Self, DatasetError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_json(&bytes)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Matching rows ordered by id, at most `limit`.
    pub fn query(&self, q: &ListingQuery, limit: usize) -> Vec<Listing> {
        self.rows
            .iter()
            .filter(|l| q.bbox.is_none_or(|b| b.contains(l)))
            .filter(|l| same_text(&l.city, &q.city))
            .filter(|l| same_text(&l.district, &q.district))
            .filter(|l| same_text(&l.neighborhood, &q.neighborhood))
            .take(limit)
            .cloned()
            .collect()
    }
}
