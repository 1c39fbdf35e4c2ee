use anyhow::{Context, Result};
use clap::Parser;
use scopeprof::cli::{Cli, OutputFormat};
use scopeprof::report::{self, ReportOptions};
use scopeprof::{demo, json_output, ProfilerConfig, StatsTable};
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Config file (or defaults) with command-line overrides applied
fn load_config(args: &Cli) -> Result<ProfilerConfig> {
    let mut config = match &args.config {
        Some(path) => ProfilerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ProfilerConfig::default(),
    };

    if let Some(unit) = args.unit {
        config.report.unit = unit;
    }
    if let Some(sort) = args.sort {
        config.report.sort = sort;
    }
    if let Some(filter) = &args.filter {
        config.report.filter = Some(filter.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn print_text(
    out: &mut impl Write,
    title: &str,
    table: &StatsTable,
    options: &ReportOptions,
) -> Result<()> {
    writeln!(out, "\n{}:", title)?;
    report::write_report(out, table, options)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;
    let options = config.report_options()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let text = args.format == OutputFormat::Text;

    // Two runs on the main thread: the second table shows accumulation, not
    // double counting.
    let (lucky, stats) = demo::profile_local_run(args.iterations);
    if text {
        writeln!(out, "Lucky number: {}", lucky)?;
        print_text(&mut out, "Stats after the first run", &stats, &options)?;
    }

    let (lucky, stats) = demo::profile_local_run(args.iterations);
    if text {
        writeln!(out, "\nSecond lucky number: {}", lucky)?;
        print_text(&mut out, "Stats after the second run", &stats, &options)?;
    }

    let global = demo::profile_workers(args.iterations, args.threads);
    match args.format {
        OutputFormat::Text => print_text(
            &mut out,
            &format!("All-thread stats (main + {} workers)", args.threads),
            &global,
            &options,
        )?,
        // JSON mode emits a single document for the merged table
        OutputFormat::Json => json_output::write_json(&mut out, &global, &options)?,
    }

    Ok(())
}
