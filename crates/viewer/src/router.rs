//! Subscription bookkeeping between the engine and the controller.
//!
//! At most one handler is attached per `(event kind, layer)` pair. Attaching
//! again detaches the previous handler first, so re-syncing markers or
//! reloading the style never stacks duplicate callbacks. Events whose handler
//! is no longer attached resolve to nothing.

use std::collections::BTreeMap;

use engine::{EventKind, HandlerId, LayerId, MapEngine, MapEvent};

type RouteKey = (EventKind, Option<LayerId>);

#[derive(Debug)]
pub struct EventRouter<R> {
    by_key: BTreeMap<RouteKey, HandlerId>,
    routes: BTreeMap<HandlerId, (RouteKey, R)>,
}

impl<R> Default for EventRouter<R> {
    fn default() -> Self {
        Self {
            by_key: BTreeMap::new(),
            routes: BTreeMap::new(),
        }
    }
}

impl<R> EventRouter<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach<E: MapEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        kind: EventKind,
        layer: Option<&LayerId>,
        route: R,
    ) -> HandlerId {
        self.detach(engine, kind, layer);
        let handler = engine.on(kind, layer);
        let key = (kind, layer.cloned());
        self.by_key.insert(key.clone(), handler);
        self.routes.insert(handler, (key, route));
        handler
    }

    /// Returns true when a handler was attached for the pair.
    pub fn detach<E: MapEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        kind: EventKind,
        layer: Option<&LayerId>,
    ) -> bool {
        let key = (kind, layer.cloned());
        let Some(handler) = self.by_key.remove(&key) else {
            return false;
        };
        self.routes.remove(&handler);
        if !engine.off(handler) {
            tracing::debug!(?handler, ?kind, "engine had already dropped handler");
        }
        true
    }

    pub fn detach_all<E: MapEngine + ?Sized>(&mut self, engine: &mut E) {
        for handler in self.routes.keys() {
            engine.off(*handler);
        }
        self.routes.clear();
        self.by_key.clear();
    }

    /// Route for an event, `None` when its handler was detached.
    pub fn resolve(&self, event: &MapEvent) -> Option<&R> {
        self.routes.get(&event.handler).map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
