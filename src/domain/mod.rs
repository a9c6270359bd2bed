//! Domain layer - Record resolution and naming rules

pub mod media;
pub mod metadata;
pub mod naming;
pub mod policy;
pub mod record;
pub mod value;

pub use media::{MediaFilter, PickedMedia};
pub use metadata::TrackTags;
pub use policy::{RetagPolicy, TagOutcome};
pub use record::RecordLocation;
