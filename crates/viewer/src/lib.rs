//! Map-centric listing browser core.
//!
//! Drives a [`engine::MapEngine`]: keeps the listing set in sync with the
//! viewport, paints buildings that hold listings, and resolves clicks into a
//! [`BuildingSelection`] published to a [`DisplayPanel`].

pub mod config;
pub mod controller;
pub mod highlight;
pub mod markers;
pub mod router;
pub mod selection;

pub use config::{CameraConfig, ConfigError, EmptyClickPolicy, ViewerConfig};
pub use controller::{MapController, Route};
pub use router::EventRouter;
pub use selection::{BuildingSelection, ClickTarget, DisplayPanel, SelectionState};
