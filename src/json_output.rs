//! JSON output format for statistics snapshots
//!
//! Rows follow the same filter and order as the text report. Times are
//! integral nanoseconds so consumers can pick their own unit.

use crate::error::Result;
use crate::report::{self, ReportOptions};
use crate::stats::StatsTable;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Statistics for a single path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPathStats {
    /// Stored labels, outermost first
    pub path: Vec<String>,
    /// Labels counted beyond the stored depth
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub truncated: usize,
    pub visits: u64,
    pub total_ns: u64,
    pub avg_ns: u64,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Summary totals over every reported path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSummary {
    pub paths: usize,
    pub total_visits: u64,
}

/// Root JSON output structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Bound on stored path depth
    pub max_depth: usize,
    pub entries: Vec<JsonPathStats>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build from a statistics table
    pub fn from_table<const D: usize>(table: &StatsTable<D>, options: &ReportOptions) -> Self {
        let entries: Vec<JsonPathStats> = report::rows(table, options)
            .into_iter()
            .map(|(path, stat)| JsonPathStats {
                path: path.labels().map(|id| id.as_str().to_string()).collect(),
                truncated: path.truncated(),
                visits: stat.visit_count,
                total_ns: stat.total_duration.as_nanos() as u64,
                avg_ns: stat.average().as_nanos() as u64,
            })
            .collect();

        let summary = JsonSummary {
            paths: entries.len(),
            total_visits: entries.iter().map(|e| e.visits).sum(),
        };

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "scopeprof-json-v1".to_string(),
            max_depth: D,
            entries,
            summary,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write `table` as pretty-printed JSON
pub fn write_json<W: Write, const D: usize>(
    writer: &mut W,
    table: &StatsTable<D>,
    options: &ReportOptions,
) -> Result<()> {
    let output = JsonOutput::from_table(table, options);
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    tracing::debug!(paths = output.summary.paths, "wrote JSON report");
    Ok(())
}
