//! Fix Command
//!
//! Corrects denomination shifts in every series of the source directory
//! and writes the results under the output prefix.

use crate::error::Error;
use crate::models::AppConfig;
use crate::services::{BatchRunner, CsvStore, RunReport, SeriesCorrector};
use crate::utils::parse_series_filter;
use std::path::PathBuf;
use tracing::info;

/// Run the fix command
pub fn run(
    config: AppConfig,
    series_arg: Option<String>,
    dry_run: bool,
    report_path: Option<PathBuf>,
) -> Result<(), Error> {
    let start_time = std::time::Instant::now();

    config.validate()?;
    config.warn_if_suspicious();

    println!("🔧 Starting denomination fix...");
    println!("  Source: {}", config.paths.source_directory.display());
    println!("  Output: {}", config.paths.output_directory.display());
    println!("  Prefix: {}", config.paths.output_prefix);
    println!("  Factor: {}", config.correction.correction_factor);
    println!("  Margin: {:.2}%", config.correction.tolerance_margin * 100.0);
    if let Some(ref series) = series_arg {
        println!("  Series: {}", series);
    } else {
        println!("  Series: ALL");
    }
    if dry_run {
        println!("  ⚠️  Running in DRY RUN mode - no files will be written");
    }
    println!();

    let series_filter = parse_series_filter(series_arg)?;

    let store = CsvStore::new(config.paths.clone());
    let runner = BatchRunner::new(SeriesCorrector::new(config.correction.clone()))
        .with_series_filter(series_filter)
        .with_dry_run(dry_run);

    let summary = runner.run(&store)?;
    summary.print_summary(dry_run);

    let duration = start_time.elapsed();
    println!("  ⏱️  Total time: {:.2}s", duration.as_secs_f64());

    if let Some(path) = report_path {
        RunReport::new(&config, &summary, dry_run).save(&path)?;
        println!("  📝 Report: {}", path.display());
    }

    info!(
        processed = summary.series_processed,
        failed = summary.failures.len(),
        "Denomination fix finished"
    );
    Ok(())
}
