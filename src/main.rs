use clap::Parser;
use sudoku_etl::core::etl::plan_sweep;
use sudoku_etl::domain::ports::{PageRenderer, Storage};
use sudoku_etl::utils::error::ErrorSeverity;
use sudoku_etl::utils::{logger, validation::Validate};
use sudoku_etl::{
    CliConfig, EtlEngine, EtlError, HttpRenderer, LocalStorage, PuzzleStore, RendererKind,
    ScrapeConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_format);

    tracing::info!("Starting sudoku-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    display_config_summary(&config, &cli);

    let store = PuzzleStore::load(LocalStorage::new(config.output_path()));

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No browser will be launched");
        perform_dry_run(&store, &config)?;
        return Ok(());
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match config.renderer.kind {
        RendererKind::Http => {
            let renderer = HttpRenderer::new(config.timeout());
            run_sweep(renderer, store, config, cli.monitor).await;
        }
        RendererKind::Chrome => launch_chrome(store, config, cli.monitor).await,
    }

    Ok(())
}

#[cfg(feature = "chrome")]
async fn launch_chrome(store: PuzzleStore<LocalStorage>, config: ScrapeConfig, monitor: bool) {
    println!(
        "Launching {} Browser{}...",
        if config.renderer.headless { "Headless" } else { "Visible" },
        if config.renderer.headless { "" } else { " (Do not minimize)" }
    );
    match sudoku_etl::ChromeRenderer::launch(&config.chrome_options()).await {
        Ok(renderer) => run_sweep(renderer, store, config, monitor).await,
        Err(e) => exit_with(&e),
    }
}

#[cfg(not(feature = "chrome"))]
async fn launch_chrome(_store: PuzzleStore<LocalStorage>, _config: ScrapeConfig, _monitor: bool) {
    exit_with(&EtlError::ConfigError {
        message: "this build has no Chrome support; use --renderer http".to_string(),
    })
}

async fn run_sweep<R: PageRenderer>(
    renderer: R,
    store: PuzzleStore<LocalStorage>,
    config: ScrapeConfig,
    monitor: bool,
) {
    println!("Saving to: {}", store.storage().describe());
    println!("{}", "-".repeat(60));

    let mut engine = EtlEngine::new_with_monitoring(renderer, store, config, monitor);
    let result = engine.run().await;

    match engine.shutdown().await {
        Ok(store) => println!("\nFinished. Total puzzles in database: {}", store.len()),
        Err(e) => tracing::warn!("⚠️ Failed to close renderer cleanly: {}", e),
    }

    match result {
        Ok(summary) => {
            println!(
                "Saved {} new, {} already stored, {} skipped, {} errors.",
                summary.saved,
                summary.already_stored,
                summary.skipped(),
                summary.failed
            );
        }
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ sudoku-etl failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}

fn display_config_summary(config: &ScrapeConfig, cli: &CliConfig) {
    println!("📋 Configuration Summary:");
    if let Ok((start, end)) = config.date_range() {
        println!("  Dates: {} .. {}", start, end);
    }
    println!(
        "  Difficulty: {} (level {})",
        config.difficulty().display_name(),
        config.difficulty().level()
    );
    println!("  Source: {}", config.source.base_url);
    println!("  Output: {}", config.output_path());
    println!("  Renderer: {:?}", config.renderer.kind);
    println!("  Timeout: {}s", config.renderer.timeout_seconds);

    if cli.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run<S: Storage>(
    store: &PuzzleStore<S>,
    config: &ScrapeConfig,
) -> anyhow::Result<()> {
    let plan = plan_sweep(store, config)?;
    let pending = plan.iter().filter(|p| !p.already_stored).count();

    println!("🔍 Dry Run Analysis:");
    println!("  Existing puzzles: {}", store.len());
    println!("  Dates in range: {}", plan.len());
    println!("  Would scrape: {}", pending);
    println!();

    for entry in &plan {
        if entry.already_stored {
            println!("  [{}] already stored ({})", entry.date.format("%Y%m%d"), entry.id);
        } else {
            println!("  [{}] would open {}", entry.date.format("%Y%m%d"), entry.url);
        }
    }

    println!();
    println!("✅ Dry run analysis complete.");
    Ok(())
}
