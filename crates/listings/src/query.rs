use foundation::GeoBounds;
use serde::{Deserialize, Serialize};

/// Administrative filter applied to every viewport query.
///
/// Configured once; the viewer never changes it at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleFilter {
    pub city: String,
    pub district: String,
    pub neighborhood: String,
}

impl Default for LocaleFilter {
    fn default() -> Self {
        Self {
            city: "Ankara".to_string(),
            district: "Çankaya".to_string(),
            neighborhood: "Oran".to_string(),
        }
    }
}

/// One listing query: the visible rectangle plus the locale filter.
///
/// Built fresh per fetch, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportBoundsQuery {
    pub bounds: GeoBounds,
    pub locale: LocaleFilter,
}

impl ViewportBoundsQuery {
    pub fn new(bounds: GeoBounds, locale: LocaleFilter) -> Self {
        Self { bounds, locale }
    }

    /// Query-string pairs in the order the endpoint documents them.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("north", self.bounds.north.to_string()),
            ("south", self.bounds.south.to_string()),
            ("east", self.bounds.east.to_string()),
            ("west", self.bounds.west.to_string()),
            ("city", self.locale.city.clone()),
            ("district", self.locale.district.clone()),
            ("neighborhood", self.locale.neighborhood.clone()),
        ]
    }
}
