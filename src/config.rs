//! Profiler configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid:
//!
//! ```toml
//! event_log_capacity = 4096
//!
//! [report]
//! unit = "ms"
//! sort = "total"
//! filter = "^heavy_calc"
//! ```

use crate::error::{ProfilerError, Result};
use crate::report::{ReportOptions, SortOrder, TimeUnit};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted `event_log_capacity`
pub const MAX_EVENT_LOG_CAPACITY: usize = 1 << 24;

/// Report section of the configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Unit for every time column (default: microseconds)
    pub unit: TimeUnit,

    /// Row order (default: path order)
    pub sort: SortOrder,

    /// Regex restricting which paths are reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Configuration for a profiling context and its reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Events reserved up front in each context's raw event log
    ///
    /// Sized to the number of scopes expected between two `reduce` calls, so
    /// the hot path does not reallocate. Default: 1024.
    pub event_log_capacity: usize,

    pub report: ReportConfig,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: 1024,
            report: ReportConfig::default(),
        }
    }
}

impl ProfilerConfig {
    /// Large event reserve for workers that reduce rarely
    pub fn high_volume() -> Self {
        Self {
            event_log_capacity: 1 << 16,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ProfilerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded profiler config");
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.event_log_capacity > MAX_EVENT_LOG_CAPACITY {
            return Err(ProfilerError::InvalidConfig(format!(
                "event_log_capacity must be <= {}, got {}",
                MAX_EVENT_LOG_CAPACITY, self.event_log_capacity
            )));
        }
        if let Some(pattern) = &self.report.filter {
            regex::Regex::new(pattern)?;
        }
        Ok(())
    }

    /// Report options described by the `report` section
    pub fn report_options(&self) -> Result<ReportOptions> {
        let options = ReportOptions::new(self.report.unit, self.report.sort);
        match &self.report.filter {
            Some(pattern) => options.with_filter(pattern),
            None => Ok(options),
        }
    }
}
