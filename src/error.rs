//! Error types for the cold-path surface (config, reports, export)
//!
//! The instrumentation hot path (`begin_scope`/`end_scope`/`reduce`/`fold`)
//! has no error returns. Everything here belongs to loading configuration and
//! rendering snapshots.

use thiserror::Error;

/// Errors produced outside the instrumentation hot path
#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid path filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for fallible profiler operations
pub type Result<T> = std::result::Result<T, ProfilerError>;
