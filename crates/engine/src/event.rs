use foundation::{LngLat, Vec2};

use crate::{Camera, LayerId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    StyleLoad,
    Idle,
    Move,
    MoveEnd,
    Click,
    MouseEnter,
    MouseLeave,
}

/// One delivery to one subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEvent {
    pub handler: HandlerId,
    pub kind: EventKind,
    pub layer: Option<LayerId>,
    pub point: Option<Vec2>,
    pub lng_lat: Option<LngLat>,
    pub camera: Option<Camera>,
}

impl MapEvent {
    pub fn new(handler: HandlerId, kind: EventKind, layer: Option<LayerId>) -> Self {
        Self {
            handler,
            kind,
            layer,
            point: None,
            lng_lat: None,
            camera: None,
        }
    }
}
