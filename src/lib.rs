pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{RendererKind, ScrapeConfig};

#[cfg(feature = "chrome")]
pub use adapters::chrome::{ChromeOptions, ChromeRenderer};
pub use adapters::http::HttpRenderer;
pub use adapters::storage::{LocalStorage, MemoryStorage};
pub use crate::core::{
    etl::{EtlEngine, ScrapeOutcome, SweepSummary},
    grid::{Grid, GridExtractor},
    store::PuzzleStore,
};
pub use utils::error::{EtlError, Result};
