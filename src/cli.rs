//! CLI argument parsing for the scopeprof demo

use crate::report::{SortOrder, TimeUnit};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for statistics tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "scopeprof")]
#[command(version)]
#[command(
    about = "Run a synthetic workload under the call-path profiler and print its statistics",
    long_about = None
)]
pub struct Cli {
    /// Worker threads that run the workload and fold into the global table
    #[arg(short = 't', long = "threads", value_name = "N", default_value = "2")]
    pub threads: usize,

    /// Outer iterations of the workload per run
    #[arg(short = 'i', long = "iterations", value_name = "N", default_value = "50")]
    pub iterations: usize,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Time unit for text reports (overrides the config file)
    #[arg(long = "unit", value_enum)]
    pub unit: Option<TimeUnit>,

    /// Row order (overrides the config file)
    #[arg(long = "sort", value_enum)]
    pub sort: Option<SortOrder>,

    /// Only report paths matching this regex (e.g., --filter 'huge_power')
    #[arg(short = 'e', long = "filter", value_name = "REGEX")]
    pub filter: Option<String>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
