pub mod batch;
pub mod csv_store;
pub mod factor_test;
pub mod series_corrector;

pub use batch::{BatchRunner, BatchSummary, RunReport, SeriesFailure, SeriesReport};
pub use csv_store::CsvStore;
pub use factor_test::{factor_relative_difference, is_approximate_factor};
pub use series_corrector::{correct_series, CorrectionOutcome, RowDecision, SeriesCorrector};
