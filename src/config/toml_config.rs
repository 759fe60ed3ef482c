use crate::core::grid::{GridExtractor, DEFAULT_CELL_SIZE_PX};
use crate::domain::model::{Difficulty, PuzzleSource};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Everything a sweep needs, resolved from defaults, a TOML file and CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub sweep: SweepConfig,
    pub source: PuzzleSource,
    pub renderer: RendererConfig,
    pub output: OutputConfig,
    pub grid: GridConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub difficulty: Difficulty,
    pub delay_ms: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            difficulty: Difficulty::Hard,
            delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RendererKind {
    #[default]
    Chrome,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub kind: RendererKind,
    pub timeout_seconds: u64,
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
    pub ready_selector: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: RendererKind::Chrome,
            timeout_seconds: 10,
            headless: false,
            chrome_executable: None,
            window_width: 1200,
            window_height: 1000,
            ready_selector: "#cell-givens text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "src/lib/nyt_puzzles.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_size_px: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size_px: DEFAULT_CELL_SIZE_PX,
        }
    }
}

impl ScrapeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PUZZLE_OUTPUT})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Inclusive sweep window. The end defaults to today.
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = *validation::validate_required_field("sweep.start_date", &self.sweep.start_date)?;
        let end = self
            .sweep
            .end_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Ok((start, end))
    }

    pub fn difficulty(&self) -> Difficulty {
        self.sweep.difficulty
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.sweep.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.renderer.timeout_seconds)
    }

    pub fn output_path(&self) -> &str {
        &self.output.path
    }

    pub fn extractor(&self) -> GridExtractor {
        GridExtractor::new(self.grid.cell_size_px)
    }

    #[cfg(feature = "chrome")]
    pub fn chrome_options(&self) -> crate::adapters::chrome::ChromeOptions {
        crate::adapters::chrome::ChromeOptions {
            headless: self.renderer.headless,
            window_width: self.renderer.window_width,
            window_height: self.renderer.window_height,
            executable: self.renderer.chrome_executable.clone(),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.source.base_url)?;
        validation::validate_non_empty_string("source.tag", &self.source.tag)?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_cell_size("grid.cell_size_px", self.grid.cell_size_px)?;
        validation::validate_positive_number(
            "renderer.timeout_seconds",
            self.renderer.timeout_seconds,
            1,
        )?;
        validation::validate_non_empty_string(
            "renderer.ready_selector",
            &self.renderer.ready_selector,
        )?;

        let (start, end) = self.date_range()?;
        validation::validate_date_range("sweep", start, end)?;

        Ok(())
    }
}

impl Validate for ScrapeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
