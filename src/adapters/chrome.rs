use crate::domain::ports::PageRenderer;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub executable: Option<PathBuf>,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1200,
            window_height: 1000,
            executable: None,
        }
    }
}

/// One Chrome tab driven over CDP.
pub struct ChromeRenderer {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeRenderer {
    pub async fn launch(options: &ChromeOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(options.window_width, options.window_height)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--log-level=3");

        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &options.executable {
            builder = builder.chrome_executable(executable);
        }

        let config = builder
            .build()
            .map_err(|message| EtlError::RendererError { message })?;

        tracing::info!(
            "🌐 Launching {} browser",
            if options.headless { "headless" } else { "visible" }
        );
        let (browser, mut handler) = Browser::launch(config).await?;

        // CDP 事件必須持續消化，否則頁面指令會卡住
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

/// 節點尚未出現時 CDP 回傳的錯誤，其餘錯誤（斷線、逾時）要往上傳
fn is_missing_node(err: &CdpError) -> bool {
    matches!(err, CdpError::NotFound | CdpError::Chrome(_))
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(_) => return Ok(true),
                Err(e) if is_missing_node(&e) => {}
                Err(e) => return Err(e.into()),
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    async fn evaluate(&self, script: &str) -> Result<Option<String>> {
        let result = self.page.evaluate(script).await?;
        match result.into_value::<serde_json::Value>() {
            Ok(serde_json::Value::String(value)) => Ok(Some(value)),
            Ok(_) | Err(_) => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<()> {
        tracing::info!("Closing browser");
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_visible_scraper_window() {
        let options = ChromeOptions::default();
        assert!(!options.headless);
        assert_eq!((options.window_width, options.window_height), (1200, 1000));
        assert!(options.executable.is_none());
    }

    #[test]
    fn test_only_missing_node_errors_keep_polling() {
        assert!(is_missing_node(&CdpError::NotFound));
        assert!(!is_missing_node(&CdpError::NoResponse));
        assert!(!is_missing_node(&CdpError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "browser went away"
        ))));
    }
}
