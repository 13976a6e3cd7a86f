//! Geographic and screen-space primitives shared by every crate: positions,
//! bounds, GeoJSON-shaped features and host time.

pub mod bounds;
pub mod feature;
pub mod ids;
pub mod math;
pub mod time;

pub use bounds::*;
pub use feature::*;
pub use ids::*;
pub use math::*;
pub use time::*;
