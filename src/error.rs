//! Error types for cdm-audio

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cdm-audio
#[derive(Debug, Error)]
pub enum CdmError {
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Request failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Invalid JSON from {url}: {message}")]
    Json { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tagging error for {path}: {message}")]
    Tagging { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

impl CdmError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CdmError::Config(_) | CdmError::TomlDeserialize(_) => 2,
            CdmError::Search(_) => 3,
            _ => 1,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            CdmError::HttpStatus { status, .. } => {
                matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            CdmError::Transport { message, .. } => {
                let lowered = message.to_ascii_lowercase();
                lowered.contains("timed out")
                    || lowered.contains("timeout")
                    || lowered.contains("connection reset")
            }
            _ => false,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            CdmError::Search(msg) => {
                format!(
                    "Search failed: {}\n\n\
                    Suggestions:\n\
                    • Check that --base points at a CONTENTdm site (e.g., https://dla.contentdm.oclc.org)\n\
                    • Check the collection alias given with --collection\n\
                    • Retry with --verbose to see each request",
                    msg
                )
            }
            CdmError::Config(msg) => {
                if msg.contains("config file") {
                    format!(
                        "{}\n\n\
                        Suggestions:\n\
                        • Pass an existing file with --config <FILE>\n\
                        • Unset CDM_AUDIO_CONFIG to run with built-in defaults",
                        msg
                    )
                } else {
                    msg.clone()
                }
            }
            CdmError::TomlDeserialize(e) => {
                format!(
                    "Invalid config file: {}\n\n\
                    Valid keys: base, collection, size, max, delay, output_root, \
                    college_name, retag, media, retries, dump_dir",
                    e
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using CdmError
pub type Result<T> = std::result::Result<T, CdmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CdmError::Config("bad".to_string()).exit_code(), 2);
        assert_eq!(CdmError::Search("down".to_string()).exit_code(), 3);
        let err = CdmError::HttpStatus {
            status: 500,
            url: "http://x".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_search_suggestions() {
        let err = CdmError::Search("HTTP 404".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("--base"));
        assert!(msg.contains("--collection"));
        assert!(msg.contains("Suggestions"));
    }

    #[test]
    fn test_missing_config_file_suggestions() {
        let err = CdmError::Config("config file not found: /tmp/x.toml".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("--config"));
        assert!(msg.contains("CDM_AUDIO_CONFIG"));
    }

    #[test]
    fn test_transient_classification() {
        let status = |code| CdmError::HttpStatus {
            status: code,
            url: String::new(),
        };
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(404).is_transient());
        assert!(!status(403).is_transient());

        let timeout = CdmError::Transport {
            url: String::new(),
            message: "Connection timed out".to_string(),
        };
        assert!(timeout.is_transient());
        let dns = CdmError::Transport {
            url: String::new(),
            message: "Dns Failed: resolve".to_string(),
        };
        assert!(!dns.is_transient());
    }

    #[test]
    fn test_other_errors_fallback() {
        let err = CdmError::Config("size must be at least 1".to_string());
        assert_eq!(err.display_with_suggestions(), "size must be at least 1");
    }
}
