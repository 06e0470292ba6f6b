//! Series Corrector
//!
//! Walks a price series from the newest row to the oldest and undoes
//! denomination shifts. Each row is compared with the already-corrected row
//! one day later, so a run of shifted rows is fixed link by link.

use crate::error::Error;
use crate::models::{CorrectionConfig, PriceRow, Series};
use crate::services::factor_test::{factor_relative_difference, is_approximate_factor};
use serde::Serialize;
use tracing::{debug, info};

/// What the scan did to a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowDecision {
    /// Newest row, nothing to compare against
    Newest,
    /// Open/high/low/close multiplied by the correction factor
    Rescaled,
    /// Zero close replaced by the next day's corrected prices
    ForwardFilled,
    Unchanged,
}

/// Corrected series plus the rows that were touched
#[derive(Debug, Clone)]
pub struct CorrectionOutcome {
    pub series: Series,
    /// Row indices that were rescaled, newest first
    pub rescaled: Vec<usize>,
    /// Row indices that were forward-filled, newest first
    pub forward_filled: Vec<usize>,
}

impl CorrectionOutcome {
    pub fn changed_rows(&self) -> usize {
        self.rescaled.len() + self.forward_filled.len()
    }
}

/// Applies the denomination correction to whole series
///
/// Holds only configuration, so one corrector can be reused across series
/// without any state leaking from one scan into the next.
#[derive(Debug, Clone)]
pub struct SeriesCorrector {
    config: CorrectionConfig,
}

impl SeriesCorrector {
    pub fn new(config: CorrectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    /// Correct one series, returning a new series of the same length.
    ///
    /// The input is never modified. Fails with `DataFormat` if a close price
    /// is NaN or infinite.
    pub fn correct(&self, series_id: &str, original: &[PriceRow]) -> Result<CorrectionOutcome, Error> {
        let factor = self.config.correction_factor;
        let margin = self.config.tolerance_margin;

        let mut corrected: Series = original.to_vec();
        let mut rescaled = Vec::new();
        let mut forward_filled = Vec::new();

        for (step, idx) in (0..original.len()).rev().enumerate() {
            let today = &original[idx];
            if !today.close.is_finite() {
                return Err(Error::DataFormat {
                    series: series_id.to_string(),
                    row: idx,
                    column: crate::constants::csv_column::CLOSE.to_string(),
                    reason: format!("close price {} is not a finite number", today.close),
                });
            }

            if step == 0 {
                if self.config.debug {
                    debug!(series = series_id, row = idx, date = %today.date, "Newest row, kept as is");
                }
                continue;
            }

            // Read the successor from the corrected copy so corrections chain
            let tomorrow_close = corrected[idx + 1].close;

            let decision = if is_approximate_factor(today.close, tomorrow_close, factor, margin) {
                corrected[idx] = today.scaled(factor);
                rescaled.push(idx);
                RowDecision::Rescaled
            } else if today.has_missing_close() {
                info!(series = series_id, row = idx, date = %today.date, "Price was missing, copied from next day");
                corrected[idx] = today.with_prices_from(&corrected[idx + 1]);
                forward_filled.push(idx);
                RowDecision::ForwardFilled
            } else {
                RowDecision::Unchanged
            };

            if self.config.debug {
                debug!(
                    series = series_id,
                    row = idx,
                    date = %today.date,
                    today_close = today.close,
                    tomorrow_close,
                    relative_difference = ?factor_relative_difference(today.close, tomorrow_close, factor),
                    margin,
                    decision = ?decision,
                    new_close = corrected[idx].close,
                    "Row compared with next day"
                );
            }
        }

        Ok(CorrectionOutcome {
            series: corrected,
            rescaled,
            forward_filled,
        })
    }
}

/// Correct a series with the given configuration, keeping only the result
pub fn correct_series(original: &[PriceRow], config: &CorrectionConfig) -> Result<Series, Error> {
    SeriesCorrector::new(config.clone())
        .correct("<unnamed>", original)
        .map(|outcome| outcome.series)
}
