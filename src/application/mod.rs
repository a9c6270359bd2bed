//! Application layer - Use cases and orchestration

pub mod fetch;
pub mod resolve;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{run, PlannedTrack, RunReport, TagCounts};
pub use resolve::{resolve_record, Resolution, ResolvedTrack};
pub use search::search_items;
