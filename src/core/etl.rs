use crate::config::toml_config::ScrapeConfig;
use crate::core::grid::GridExtractor;
use crate::core::store::PuzzleStore;
use crate::domain::model::PuzzleRecord;
use crate::domain::ports::{PageRenderer, RenderOutcome, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::NaiveDate;

/// What happened to one date of the sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    Saved(PuzzleRecord),
    AlreadyStored,
    NotFound,
    TimedOut,
    NotRendered,
    EmptyGrid,
    Failed(String),
}

impl ScrapeOutcome {
    pub fn describe(&self) -> String {
        match self {
            ScrapeOutcome::Saved(record) => {
                let preview: String = record.digits.chars().take(5).collect();
                format!("Success! ({}...)", preview)
            }
            ScrapeOutcome::AlreadyStored => "Already in database. Skipping.".to_string(),
            ScrapeOutcome::NotFound => "Skipped (404/Not Found)".to_string(),
            ScrapeOutcome::TimedOut => "Skipped (Timeout waiting for numbers)".to_string(),
            ScrapeOutcome::NotRendered => "Failed (No givens rendered)".to_string(),
            ScrapeOutcome::EmptyGrid => "Failed (Grid Empty)".to_string(),
            ScrapeOutcome::Failed(message) => format!("Error: {}", message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub saved: usize,
    pub already_stored: usize,
    pub not_found: usize,
    pub timed_out: usize,
    pub not_rendered: usize,
    pub empty_grid: usize,
    pub failed: usize,
    pub total_in_store: usize,
}

impl SweepSummary {
    pub fn record(&mut self, outcome: &ScrapeOutcome) {
        match outcome {
            ScrapeOutcome::Saved(_) => self.saved += 1,
            ScrapeOutcome::AlreadyStored => self.already_stored += 1,
            ScrapeOutcome::NotFound => self.not_found += 1,
            ScrapeOutcome::TimedOut => self.timed_out += 1,
            ScrapeOutcome::NotRendered => self.not_rendered += 1,
            ScrapeOutcome::EmptyGrid => self.empty_grid += 1,
            ScrapeOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.not_found + self.timed_out + self.not_rendered + self.empty_grid
    }
}

/// One date in the sweep window and how it maps onto the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedScrape {
    pub date: NaiveDate,
    pub id: String,
    pub url: String,
    pub already_stored: bool,
}

/// Lays out every date in the configured window, oldest first.
pub fn plan_sweep<S: Storage>(
    store: &PuzzleStore<S>,
    config: &ScrapeConfig,
) -> Result<Vec<PlannedScrape>> {
    let (start, end) = config.date_range()?;
    let difficulty = config.difficulty();

    Ok(start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let id = config.source.puzzle_id(difficulty, date);
            PlannedScrape {
                already_stored: store.contains(&id),
                url: config.source.puzzle_url(difficulty, date),
                id,
                date,
            }
        })
        .collect())
}

/// Drives a date-range sweep: render, read the grid, merge into the store.
pub struct EtlEngine<R: PageRenderer, S: Storage> {
    renderer: R,
    store: PuzzleStore<S>,
    config: ScrapeConfig,
    extractor: GridExtractor,
    monitor: SystemMonitor,
}

impl<R: PageRenderer, S: Storage> EtlEngine<R, S> {
    pub fn new(renderer: R, store: PuzzleStore<S>, config: ScrapeConfig) -> Self {
        Self::new_with_monitoring(renderer, store, config, false)
    }

    pub fn new_with_monitoring(
        renderer: R,
        store: PuzzleStore<S>,
        config: ScrapeConfig,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            extractor: config.extractor(),
            renderer,
            store,
            config,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn store(&self) -> &PuzzleStore<S> {
        &self.store
    }

    /// Only a failed save stops the sweep; every other failure is per date.
    pub async fn run(&mut self) -> Result<SweepSummary> {
        let plan = plan_sweep(&self.store, &self.config)?;
        let mut summary = SweepSummary::default();
        let mut attempted = false;

        tracing::info!("🚀 Starting sweep over {} dates", plan.len());
        self.monitor.log_stats("Sweep start");

        for entry in plan {
            let outcome = if self.store.contains(&entry.id) {
                ScrapeOutcome::AlreadyStored
            } else {
                if attempted {
                    tokio::time::sleep(self.config.delay()).await;
                }
                attempted = true;

                println!("[{}] Opening {} ...", entry.date.format("%Y%m%d"), entry.url);
                let outcome = self.scrape_date(entry.date).await;
                if let ScrapeOutcome::Saved(record) = &outcome {
                    self.store.upsert(record.clone());
                    if let Err(e) = self.store.save() {
                        // 先回報這一天，再中止整個 sweep
                        report(entry.date, &ScrapeOutcome::Failed(e.to_string()));
                        return Err(e);
                    }
                }
                outcome
            };

            report(entry.date, &outcome);
            summary.record(&outcome);
        }

        summary.total_in_store = self.store.len();
        self.monitor.log_final_stats();
        tracing::info!(
            "✅ Sweep finished: {} saved, {} already stored, {} skipped, {} failed",
            summary.saved,
            summary.already_stored,
            summary.skipped(),
            summary.failed
        );

        Ok(summary)
    }

    /// Scrapes one date without touching the store.
    pub async fn scrape_date(&self, date: NaiveDate) -> ScrapeOutcome {
        let difficulty = self.config.difficulty();
        let url = self.config.source.puzzle_url(difficulty, date);

        // Extract
        let rendered = self
            .renderer
            .render(
                &url,
                &self.config.renderer.ready_selector,
                self.config.timeout(),
            )
            .await;

        let markup = match rendered {
            Ok(RenderOutcome::Ready(markup)) => markup,
            Ok(RenderOutcome::TimedOut) => return ScrapeOutcome::TimedOut,
            Ok(RenderOutcome::NotFound) => return ScrapeOutcome::NotFound,
            Err(e) => return ScrapeOutcome::Failed(e.to_string()),
        };

        // Transform
        let grid = match self.extractor.extract(&markup) {
            Some(grid) if grid.is_blank() => return ScrapeOutcome::EmptyGrid,
            Some(grid) => grid,
            None => return ScrapeOutcome::NotRendered,
        };
        tracing::debug!("{} givens read for {}", grid.given_count(), date);

        let solution = self.fetch_solution().await;
        ScrapeOutcome::Saved(
            self.config
                .source
                .record(difficulty, date, grid.to_string(), solution),
        )
    }

    /// An empty string covers both "no solution published" and a failed lookup.
    async fn fetch_solution(&self) -> String {
        match self.renderer.evaluate(&self.config.source.solution_script).await {
            Ok(Some(solution)) => solution,
            Ok(None) => String::new(),
            Err(e) => {
                tracing::debug!("Solution lookup failed: {}", e);
                String::new()
            }
        }
    }

    /// Closes the renderer and hands back the store.
    pub async fn shutdown(mut self) -> Result<PuzzleStore<S>> {
        self.renderer.close().await?;
        Ok(self.store)
    }
}

fn report_line(date: NaiveDate, outcome: &ScrapeOutcome) -> String {
    format!("[{}] {}", date.format("%Y%m%d"), outcome.describe())
}

fn report(date: NaiveDate, outcome: &ScrapeOutcome) {
    let stamp = date.format("%Y%m%d");
    println!("{}", report_line(date, outcome));

    match outcome {
        ScrapeOutcome::Saved(record) => tracing::info!(id = %record.id, "Saved puzzle"),
        ScrapeOutcome::Failed(message) => {
            tracing::warn!(date = %stamp, error = %message, "Scrape failed")
        }
        other => tracing::debug!(date = %stamp, outcome = ?other, "Date skipped"),
    }
}
