//! Analyzer configuration
//!
//! Operational limits only. The rubric itself is fixed, see
//! [`crate::rubric`].

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

fn default_timeout_ms() -> u64 {
    30_000
}

/// Limits applied to one analysis run, loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Wall-clock budget for the async entry points, in milliseconds.
    /// `0` disables the limit.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Only the first `max_pages` pages are classified into sections.
    /// `0` means every page.
    #[serde(default)]
    pub max_pages: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_pages: 0,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse analyzer config")
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn page_limit(&self) -> Option<u32> {
        (self.max_pages > 0).then_some(self.max_pages)
    }
}
