//! cdm-audio - CONTENTdm audio downloader
//!
//! Searches a CONTENTdm digital library, resolves each matching record
//! (including compound objects) to its audio file, downloads it into an
//! `<artist>/<album>/<title>` tree and writes ID3 tags into MP3s.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::CdmError;
