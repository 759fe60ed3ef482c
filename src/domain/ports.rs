use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Whole-file persistence for the puzzle store.
pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn read_file(&self) -> Result<Option<Vec<u8>>>;
    /// Replaces the stored bytes in full.
    fn write_file(&self, data: &[u8]) -> Result<()>;
    fn describe(&self) -> String;
}

/// What a bounded wait on a freshly loaded page produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Ready(String),
    TimedOut,
    NotFound,
}

/// A single page that can be pointed at a URL and inspected once rendered.
///
/// Implementations serve one navigation at a time.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Polls until `selector` matches or `timeout` elapses.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool>;

    async fn content(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// Evaluates `script` in the page. `None` when it yields no string.
    async fn evaluate(&self, script: &str) -> Result<Option<String>>;

    async fn close(&mut self) -> Result<()>;

    async fn render(&self, url: &str, selector: &str, timeout: Duration) -> Result<RenderOutcome> {
        self.navigate(url).await?;

        if self.wait_for(selector, timeout).await? {
            return Ok(RenderOutcome::Ready(self.content().await?));
        }

        let title = self.title().await.unwrap_or_default();
        let body = self.content().await.unwrap_or_default();
        Ok(classify_missing_page(&title, &body))
    }
}

/// Tells a 404/error page apart from a page that is just slow to draw.
pub fn classify_missing_page(title: &str, body: &str) -> RenderOutcome {
    if title.contains("Page not found") || body.contains("Error") {
        RenderOutcome::NotFound
    } else {
        RenderOutcome::TimedOut
    }
}
