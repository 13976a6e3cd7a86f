use foundation::{Feature, FeatureId};
use serde_json::Value;

/// Layer filter, the subset of engine filter expressions the viewer uses.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Matches no feature. Used for empty highlight layers.
    MatchNone,
    IdEq(FeatureId),
    IdIn(Vec<FeatureId>),
    PropertyEq { key: String, value: Value },
    /// Conjunction; empty matches everything.
    All(Vec<FilterExpr>),
}

impl FilterExpr {
    pub fn property_eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::PropertyEq {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            FilterExpr::MatchNone => false,
            FilterExpr::IdEq(id) => feature.id.as_ref() == Some(id),
            FilterExpr::IdIn(ids) => feature.id.as_ref().is_some_and(|id| ids.contains(id)),
            FilterExpr::PropertyEq { key, value } => feature.property(key) == Some(value),
            FilterExpr::All(parts) => parts.iter().all(|p| p.matches(feature)),
        }
    }
}

impl Default for FilterExpr {
    fn default() -> Self {
        FilterExpr::All(Vec::new())
    }
}
