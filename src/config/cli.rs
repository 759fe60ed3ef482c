use crate::config::toml_config::{RendererKind, ScrapeConfig};
use crate::domain::model::Difficulty;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "sudoku-etl")]
#[command(about = "Scrape daily NYT sudoku puzzles into a local JSON store")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// First date to scrape (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last date to scrape, inclusive (defaults to today)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    #[arg(long, value_enum)]
    pub difficulty: Option<Difficulty>,

    /// Puzzle JSON file to read and update
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long, value_enum)]
    pub renderer: Option<RendererKind>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Seconds to wait for the givens to appear
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Pause between scrapes in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    #[arg(long)]
    pub chrome_executable: Option<PathBuf>,

    /// Pixel size of one board cell
    #[arg(long)]
    pub cell_size: Option<f64>,

    /// Show what would be scraped without launching a browser
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, help = "Log process CPU and memory usage")]
    pub monitor: bool,
}

impl CliConfig {
    /// Loads the config file (if any) and layers the command line on top.
    pub fn resolve(&self) -> Result<ScrapeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                ScrapeConfig::from_file(path)?
            }
            None => ScrapeConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ScrapeConfig) {
        if let Some(start) = self.start_date {
            config.sweep.start_date = Some(start);
        }
        if let Some(end) = self.end_date {
            config.sweep.end_date = Some(end);
        }
        if let Some(difficulty) = self.difficulty {
            config.sweep.difficulty = difficulty;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.sweep.delay_ms = delay_ms;
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(kind) = self.renderer {
            config.renderer.kind = kind;
        }
        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.renderer.timeout_seconds = timeout;
        }
        if self.headless {
            config.renderer.headless = true;
        }
        if let Some(executable) = &self.chrome_executable {
            config.renderer.chrome_executable = Some(executable.clone());
        }
        if let Some(cell_size) = self.cell_size {
            config.grid.cell_size_px = cell_size;
        }
    }
}
