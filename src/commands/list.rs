use crate::error::Error;
use crate::models::AppConfig;
use crate::services::CsvStore;

/// Print every discovered series with its row count
pub fn run(config: AppConfig) -> Result<(), Error> {
    config.paths.validate()?;
    let store = CsvStore::new(config.paths);
    let series_ids = store.list_series()?;

    println!(
        "📋 {} series in {}\n",
        series_ids.len(),
        store.paths().source_directory.display()
    );

    for series_id in &series_ids {
        match store.load_series(series_id) {
            Ok(series) => {
                let first = series.first().map(|r| r.date.as_str()).unwrap_or("-");
                let last = series.last().map(|r| r.date.as_str()).unwrap_or("-");
                println!("  ✅ {:<30} {:>7} rows  {} → {}", series_id, series.len(), first, last);
            }
            Err(e) => println!("  ❌ {:<30} {}", series_id, e),
        }
    }

    Ok(())
}
