//! Event allow-list loaded from YAML at startup.
//!
//! The file lists the Segment event names that are eligible for metrics:
//!
//! ```yaml
//! events:
//!   - Viewed Dashboard
//!   - Signed Up
//! ```
//!
//! Matching is exact and case-sensitive against the raw event name.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the allow-list.
#[derive(Debug, Error)]
pub enum AllowlistError {
    #[error("failed to read allow-list file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse allow-list YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// On-disk shape of the allow-list file.
#[derive(Debug, Deserialize)]
struct AllowlistFile {
    #[serde(default)]
    events: Vec<String>,
}

/// Immutable set of permitted event names.
#[derive(Debug, Clone, Default)]
pub struct EventWhitelist {
    events: HashSet<String>,
}

impl EventWhitelist {
    pub fn new<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            events: events.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the allow-list from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AllowlistError> {
        let file: AllowlistFile = serde_yaml::from_str(yaml)?;
        Ok(Self::new(file.events))
    }

    /// Read and parse the allow-list file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AllowlistError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| AllowlistError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, event_name: &str) -> bool {
        self.events.contains(event_name)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
