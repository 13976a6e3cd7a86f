//! Offline runs of the viewer core over files, for the `estate` command.

pub mod offline;
pub mod parse;

pub use offline::{CollectingPanel, OfflineScene};
pub use parse::{parse_bbox, parse_lng_lat};
