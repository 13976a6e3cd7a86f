//! Listing records and their viewport-driven retrieval.
//!
//! - `model`: the listing record and its lenient wire decoding
//! - `query`: viewport bounds + fixed locale filter
//! - `source`: the query capability trait and its error type
//! - `http`: `reqwest`-backed source for the `/api/properties` endpoint
//! - `fetcher`: single-flight wrapper that drops overlapping fetches

pub mod fetcher;
pub mod http;
pub mod model;
pub mod query;
pub mod source;

pub use fetcher::*;
pub use http::*;
pub use model::*;
pub use query::*;
pub use source::*;
