//! Batch correction over every series in the source directory
//!
//! Each series is loaded, corrected and written on its own. A series that
//! fails to load, holds bad data or cannot be written is recorded and the
//! batch moves on to the next one.

use crate::error::Error;
use crate::models::AppConfig;
use crate::services::csv_store::CsvStore;
use crate::services::series_corrector::SeriesCorrector;
use crate::utils::should_process_series;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Result for one series that went through correction
#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport {
    pub series: String,
    pub rows: usize,
    pub rescaled: Vec<usize>,
    pub forward_filled: Vec<usize>,
    /// Path written, `None` in dry-run mode
    pub output: Option<String>,
}

/// A series that could not be corrected
#[derive(Debug, Clone, Serialize)]
pub struct SeriesFailure {
    pub series: String,
    pub kind: String,
    pub message: String,
}

/// Statistics for a batch run
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub series_processed: usize,
    pub series_written: usize,
    pub rows_rescaled: usize,
    pub rows_forward_filled: usize,
    pub series_reports: Vec<SeriesReport>,
    pub failures: Vec<SeriesFailure>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn record_success(&mut self, report: SeriesReport) {
        self.rows_rescaled += report.rescaled.len();
        self.rows_forward_filled += report.forward_filled.len();
        if report.output.is_some() {
            self.series_written += 1;
        }
        self.series_reports.push(report);
    }

    fn record_failure(&mut self, series_id: &str, error: &Error) {
        self.failures.push(SeriesFailure {
            series: series_id.to_string(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        });
    }

    pub fn print_summary(&self, dry_run: bool) {
        let mode_str = if dry_run { " (Dry Run)" } else { "" };
        println!("\n📊 Denomination Fix Summary{}:", mode_str);
        println!("  ✅ Series processed: {}", self.series_processed);
        if dry_run {
            println!("  ⏭️  Series written: 0 (dry run)");
        } else {
            println!("  ✅ Series written: {}", self.series_written);
        }
        println!("  🔧 Rows rescaled: {}", self.rows_rescaled);
        println!("  🩹 Rows forward-filled: {}", self.rows_forward_filled);

        if self.has_failures() {
            println!("  ⚠️  Failed series: {}", self.failures.len());
            for failure in &self.failures[0..std::cmp::min(5, self.failures.len())] {
                println!("    ❌ {}", failure.message);
            }
            if self.failures.len() > 5 {
                println!("    ... and {} more failures", self.failures.len() - 5);
            }
        }

        if dry_run && (self.rows_rescaled > 0 || self.rows_forward_filled > 0) {
            println!("\n💡 To write corrected files, run again without --dry-run");
        }
    }
}

/// Drives the corrector over every discovered series
#[derive(Debug, Clone)]
pub struct BatchRunner {
    corrector: SeriesCorrector,
    series_filter: Option<Vec<String>>,
    dry_run: bool,
}

impl BatchRunner {
    pub fn new(corrector: SeriesCorrector) -> Self {
        Self {
            corrector,
            series_filter: None,
            dry_run: false,
        }
    }

    /// Only process the given identifiers (upper-cased, with or without extension)
    pub fn with_series_filter(mut self, series_filter: Option<Vec<String>>) -> Self {
        self.series_filter = series_filter;
        self
    }

    /// Correct without writing anything
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the batch.
    ///
    /// Only directory-level problems are returned as errors; per-series
    /// failures end up in the summary.
    pub fn run(&self, store: &CsvStore) -> Result<BatchSummary, Error> {
        let series_ids = store.list_series()?;
        info!(
            source = %store.paths().source_directory.display(),
            count = series_ids.len(),
            "Discovered series"
        );

        if !self.dry_run {
            store.ensure_output_dir()?;
        }

        let series_limit = self.corrector.config().effective_iteration_limit();

        let mut summary = BatchSummary::new();
        for series_id in &series_ids {
            if !should_process_series(series_id, &self.series_filter) {
                continue;
            }
            if series_limit > 0 && summary.series_processed >= series_limit {
                warn!(limit = series_limit, "Debug iteration limit reached, remaining series skipped");
                break;
            }

            summary.series_processed += 1;
            match self.process_series(store, series_id) {
                Ok(report) => summary.record_success(report),
                Err(e) => {
                    warn!(series = %series_id, error = %e, "Skipping series");
                    summary.record_failure(series_id, &e);
                }
            }
        }

        if summary.has_failures() {
            warn!(
                failed = summary.failures.len(),
                processed = summary.series_processed,
                "Batch completed with failures"
            );
        } else {
            info!(processed = summary.series_processed, "Batch completed successfully");
        }

        Ok(summary)
    }

    fn process_series(&self, store: &CsvStore, series_id: &str) -> Result<SeriesReport, Error> {
        let original = store.load_series(series_id)?;
        let outcome = self.corrector.correct(series_id, &original)?;

        let output = if self.dry_run {
            None
        } else {
            let path = store.persist_series(series_id, &outcome.series)?;
            Some(path.display().to_string())
        };

        info!(
            series = series_id,
            rows = original.len(),
            rescaled = outcome.rescaled.len(),
            forward_filled = outcome.forward_filled.len(),
            "Corrected series"
        );

        Ok(SeriesReport {
            series: series_id.to_string(),
            rows: original.len(),
            rescaled: outcome.rescaled,
            forward_filled: outcome.forward_filled,
            output,
        })
    }
}

/// JSON record of a batch run
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub dry_run: bool,
    pub config: &'a AppConfig,
    pub summary: &'a BatchSummary,
}

impl<'a> RunReport<'a> {
    pub fn new(config: &'a AppConfig, summary: &'a BatchSummary, dry_run: bool) -> Self {
        Self {
            generated_at: Utc::now(),
            dry_run,
            config,
            summary,
        }
    }

    /// Save report to file
    pub fn save(&self, report_path: &Path) -> Result<(), Error> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(report_path, content).map_err(|e| {
            Error::Io(format!("Failed to write report {}: {}", report_path.display(), e))
        })?;
        info!(path = %report_path.display(), "Saved run report");
        Ok(())
    }
}
