use crate::config::toml_config::FetchSettings;
use crate::domain::ports::Fetcher;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// 單次請求失敗的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Status(u16),
    ShortBody(usize),
    Challenge(String),
    Transport(String),
}

/// 帶重試的網頁抓取器
pub struct RetryingFetcher {
    client: Client,
    settings: FetchSettings,
}

impl RetryingFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let client = Client::builder()
            .default_headers(browser_headers(&settings.user_agent))
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self { client, settings })
    }

    /// 檢查回應內容，回傳可接受的頁面或失敗原因
    pub fn inspect(
        &self,
        status: StatusCode,
        body: String,
    ) -> std::result::Result<String, AttemptFailure> {
        if status != StatusCode::OK {
            return Err(AttemptFailure::Status(status.as_u16()));
        }
        if body.len() < self.settings.min_body_length {
            return Err(AttemptFailure::ShortBody(body.len()));
        }
        if let Some(marker) = self
            .settings
            .challenge_markers
            .iter()
            .find(|m| body.contains(m.as_str()))
        {
            return Err(AttemptFailure::Challenge(marker.clone()));
        }
        Ok(body)
    }

    async fn attempt(&self, url: &str) -> std::result::Result<String, AttemptFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptFailure::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptFailure::Transport(e.to_string()))?;
        self.inspect(status, body)
    }

    fn backoff(&self, failure: &AttemptFailure) -> Duration {
        match failure {
            AttemptFailure::Transport(_) => Duration::from_secs(self.settings.error_delay),
            _ => Duration::from_secs(random_between(
                self.settings.retry_delay_min,
                self.settings.retry_delay_max,
            )),
        }
    }
}

#[async_trait]
impl Fetcher for RetryingFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let attempts = self.settings.retry_attempts;

        for attempt in 1..=attempts {
            tracing::debug!("🌐 GET {} (attempt {}/{})", url, attempt, attempts);

            match self.attempt(url).await {
                Ok(body) => {
                    tracing::debug!("✅ Received {} bytes from {}", body.len(), url);
                    return Ok(body);
                }
                Err(failure) => {
                    tracing::warn!(
                        "⚠️ Attempt {}/{} for {} failed: {:?}",
                        attempt,
                        attempts,
                        url,
                        failure
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.backoff(&failure)).await;
                    }
                }
            }
        }

        Err(EtlError::FetchExhausted {
            url: url.to_string(),
            attempts,
        })
    }
}

/// 在 [min, max] 內取隨機秒數
pub fn random_between(min: u64, max: u64) -> u64 {
    if min >= max {
        return min;
    }
    rand::rng().random_range(min..=max)
}

fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(header::USER_AGENT, value);
    }
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-TW,zh-HK;q=0.9,zh;q=0.8,en;q=0.7"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}
