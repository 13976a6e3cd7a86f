use serde::{Deserialize, Serialize};

/// Engine-assigned feature identifier.
///
/// Map engines hand out either numeric or string ids. They are only valid for
/// the frame they were read in and must never be persisted across style loads.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Num(u64),
    Str(String),
}

impl From<u64> for FeatureId {
    fn from(n: u64) -> Self {
        FeatureId::Num(n)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        FeatureId::Str(s.to_string())
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureId::Num(n) => write!(f, "{n}"),
            FeatureId::Str(s) => f.write_str(s),
        }
    }
}
