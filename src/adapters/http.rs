use crate::domain::ports::PageRenderer;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct FetchedPage {
    url: String,
    body: String,
}

/// Renders by plain HTTP fetch. Useful for mirrors that serve the board
/// already drawn; scripts are never executed.
pub struct HttpRenderer {
    client: Client,
    request_timeout: Duration,
    current: Mutex<Option<FetchedPage>>,
}

impl HttpRenderer {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            request_timeout,
            current: Mutex::new(None),
        }
    }

    async fn current_body(&self) -> Result<String> {
        let current = self.current.lock().await;
        current
            .as_ref()
            .map(|page| page.body.clone())
            .ok_or_else(|| EtlError::RendererError {
                message: "no page has been loaded".to_string(),
            })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| EtlError::RendererError {
        message: format!("invalid selector '{}': {}", selector, e),
    })
}

fn markup_matches(markup: &str, selector: &Selector) -> bool {
    Html::parse_document(markup).select(selector).next().is_some()
}

fn markup_title(markup: &str) -> String {
    let document = Html::parse_document(markup);
    match Selector::parse("title") {
        Ok(selector) => document
            .select(&selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        // 404 頁面也保留內容，交給 render 判斷
        let body = response.text().await?;

        *self.current.lock().await = Some(FetchedPage {
            url: url.to_string(),
            body,
        });
        Ok(())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        let body = self.current_body().await?;
        let selector = parse_selector(selector)?;
        Ok(markup_matches(&body, &selector))
    }

    async fn content(&self) -> Result<String> {
        self.current_body().await
    }

    async fn title(&self) -> Result<String> {
        let body = self.current_body().await?;
        Ok(markup_title(&body))
    }

    async fn evaluate(&self, script: &str) -> Result<Option<String>> {
        if let Some(page) = self.current.lock().await.as_ref() {
            tracing::debug!("Script evaluation unsupported for {}: {}", page.url, script);
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<()> {
        *self.current.lock().await = None;
        Ok(())
    }
}
