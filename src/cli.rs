use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::error::Error;
use crate::models::AppConfig;

#[derive(Parser)]
#[command(name = "denomfix")]
#[command(about = "Repair currency denomination shifts in OHLCV price files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Correct every series in the source directory
    Fix {
        #[command(flatten)]
        overrides: ConfigOverrides,

        /// Comma-separated series to process (file names, extension optional)
        #[arg(long)]
        series: Option<String>,

        /// Report corrections without writing any files
        #[arg(long)]
        dry_run: bool,

        /// Write a JSON report of the run to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List the series found in the source directory
    List {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

/// Flags that override environment and default settings
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Directory holding the source price files
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Directory for corrected files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Prefix for corrected file names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Suspected denomination ratio
    #[arg(long)]
    pub factor: Option<f64>,

    /// Allowed relative error as a fraction (0.05 = 5%)
    #[arg(long)]
    pub margin: Option<f64>,

    /// Trace every row decision
    #[arg(long)]
    pub debug: bool,

    /// Max series processed in debug mode (0 = all)
    #[arg(long)]
    pub iteration_limit: Option<usize>,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(source) = self.source {
            config.paths.source_directory = source;
        }
        if let Some(output) = self.output {
            config.paths.output_directory = output;
        }
        if let Some(prefix) = self.prefix {
            config.paths.output_prefix = prefix;
        }
        if let Some(factor) = self.factor {
            config.correction.correction_factor = factor;
        }
        if let Some(margin) = self.margin {
            config.correction.tolerance_margin = margin;
        }
        if self.debug {
            config.correction.debug = true;
        }
        if let Some(limit) = self.iteration_limit {
            config.correction.iteration_limit = limit;
        }
        config
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .try_init();
}

pub fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    let env_config = AppConfig::from_env()?;

    match cli.command {
        Commands::Fix {
            overrides,
            series,
            dry_run,
            report,
        } => {
            let config = overrides.apply(env_config);
            init_tracing(config.correction.debug);
            commands::fix::run(config, series, dry_run, report)
        }
        Commands::List { overrides } => {
            let config = overrides.apply(env_config);
            init_tracing(config.correction.debug);
            commands::list::run(config)
        }
    }
}
