//! Human-readable statistics report
//!
//! One line per path:
//!
//! ```text
//! WHAT: AVG_TIME (TOTAL_TIME / TIMES_EXECUTED)
//! All times in microseconds
//! heavy_calc: 1520.250 (3040.500 / 2)
//! heavy_calc/big_wave/...(3): 12.000 (48.000 / 4)
//! ```
//!
//! Paths that overflowed the stored depth end in `/...(N)` where `N` is the
//! number of labels that were counted but not stored.

use crate::error::Result;
use crate::path_encoder::PathEncoder;
use crate::stats::{Stat, StatsTable};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;
use std::time::Duration;

/// Unit used for every time column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum TimeUnit {
    #[serde(rename = "ns")]
    #[value(name = "ns")]
    Nanos,
    #[default]
    #[serde(rename = "us")]
    #[value(name = "us")]
    Micros,
    #[serde(rename = "ms")]
    #[value(name = "ms")]
    Millis,
    #[serde(rename = "s")]
    #[value(name = "s")]
    Secs,
}

impl TimeUnit {
    /// `duration` expressed in this unit
    pub fn convert(self, duration: Duration) -> f64 {
        let nanos = duration.as_nanos() as f64;
        match self {
            TimeUnit::Nanos => nanos,
            TimeUnit::Micros => nanos / 1_000.0,
            TimeUnit::Millis => nanos / 1_000_000.0,
            TimeUnit::Secs => nanos / 1_000_000_000.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TimeUnit::Nanos => "nanoseconds",
            TimeUnit::Micros => "microseconds",
            TimeUnit::Millis => "milliseconds",
            TimeUnit::Secs => "seconds",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            TimeUnit::Nanos => "ns",
            TimeUnit::Micros => "us",
            TimeUnit::Millis => "ms",
            TimeUnit::Secs => "s",
        }
    }
}

/// Row order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Table order: shallower paths first, then by label
    #[default]
    Path,
    /// Largest total time first
    Total,
    /// Most visits first
    Visits,
}

/// Rendering options
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub unit: TimeUnit,
    pub sort: SortOrder,
    /// Only paths whose rendered form matches are shown
    pub filter: Option<Regex>,
}

impl ReportOptions {
    pub fn new(unit: TimeUnit, sort: SortOrder) -> Self {
        Self {
            unit,
            sort,
            filter: None,
        }
    }

    /// Restrict rows to paths matching `pattern`
    pub fn with_filter(mut self, pattern: &str) -> Result<Self> {
        self.filter = Some(Regex::new(pattern)?);
        Ok(self)
    }
}

/// Filtered and ordered rows of `table`
pub fn rows<'a, const D: usize>(
    table: &'a StatsTable<D>,
    options: &ReportOptions,
) -> Vec<(&'a PathEncoder<D>, &'a Stat)> {
    let mut rows: Vec<_> = table
        .iter()
        .filter(|(path, _)| match &options.filter {
            Some(re) => re.is_match(&path.to_string()),
            None => true,
        })
        .collect();

    match options.sort {
        SortOrder::Path => {}
        SortOrder::Total => rows.sort_by(|a, b| b.1.total_duration.cmp(&a.1.total_duration)),
        SortOrder::Visits => rows.sort_by(|a, b| b.1.visit_count.cmp(&a.1.visit_count)),
    }

    rows
}

/// One report line, without the trailing newline
pub fn format_row<const D: usize>(path: &PathEncoder<D>, stat: &Stat, unit: TimeUnit) -> String {
    format!(
        "{}: {:.3} ({:.3} / {})",
        path,
        unit.convert(stat.average()),
        unit.convert(stat.total_duration),
        stat.visit_count
    )
}

/// Full report as a string
pub fn render<const D: usize>(table: &StatsTable<D>, options: &ReportOptions) -> String {
    let rows = rows(table, options);
    if rows.is_empty() {
        return "No profiling data collected.\n".to_string();
    }

    let mut out = String::new();
    out.push_str("WHAT: AVG_TIME (TOTAL_TIME / TIMES_EXECUTED)\n");
    let _ = writeln!(out, "All times in {}", options.unit.name());
    for (path, stat) in rows {
        out.push_str(&format_row(path, stat, options.unit));
        out.push('\n');
    }
    out
}

/// Write the report to `writer`
pub fn write_report<W: Write, const D: usize>(
    writer: &mut W,
    table: &StatsTable<D>,
    options: &ReportOptions,
) -> Result<()> {
    writer.write_all(render(table, options).as_bytes())?;
    tracing::debug!(paths = table.len(), unit = options.unit.abbreviation(), "wrote text report");
    Ok(())
}
