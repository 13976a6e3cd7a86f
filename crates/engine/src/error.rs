use crate::{LayerId, SourceId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("style is not loaded yet")]
    StyleNotLoaded,
    #[error("unknown layer `{0}`")]
    UnknownLayer(LayerId),
    #[error("layer `{0}` already exists")]
    DuplicateLayer(LayerId),
    #[error("unknown source `{0}`")]
    UnknownSource(SourceId),
    #[error("source `{0}` already exists")]
    DuplicateSource(SourceId),
    #[error("style could not be loaded: {0}")]
    Style(String),
}
