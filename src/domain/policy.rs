//! ID3 retag policy and outcomes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to treat tags that already exist in a downloaded MP3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetagPolicy {
    /// Leave the file's tags alone
    Skip,
    /// Fill in frames that are missing or empty
    #[default]
    Update,
    /// Replace every frame we know about
    Overwrite,
}

impl FromStr for RetagPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(RetagPolicy::Skip),
            "update" => Ok(RetagPolicy::Update),
            "overwrite" => Ok(RetagPolicy::Overwrite),
            _ => Err(format!(
                "Invalid retag policy: '{}'. Valid policies are: skip, update, overwrite",
                s
            )),
        }
    }
}

/// What tagging did to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Skipped,
    Updated,
    Overwritten,
}

impl fmt::Display for TagOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TagOutcome::Skipped => "skipped",
            TagOutcome::Updated => "updated",
            TagOutcome::Overwritten => "overwritten",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("skip".parse::<RetagPolicy>().unwrap(), RetagPolicy::Skip);
        assert_eq!("Overwrite".parse::<RetagPolicy>().unwrap(), RetagPolicy::Overwrite);
        let err = "replace".parse::<RetagPolicy>().unwrap_err();
        assert!(err.contains("skip, update, overwrite"));
    }

    #[test]
    fn test_default_is_update() {
        assert_eq!(RetagPolicy::default(), RetagPolicy::Update);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(TagOutcome::Overwritten.to_string(), "overwritten");
    }
}
