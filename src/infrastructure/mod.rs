//! Infrastructure layer - HTTP, files and tags

pub mod client;
pub mod dump;
pub mod id3;
pub mod settings;

pub use client::{DigitalLibrary, HttpLibrary};
pub use dump::JsonDumper;
pub use id3::{Id3Writer, TagWriter};
pub use settings::{FileConfig, Settings};
