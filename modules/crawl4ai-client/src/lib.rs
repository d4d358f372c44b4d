//! Pure Crawl4AI REST API client
//!
//! A minimal typed client for a self-hosted Crawl4AI service: submit crawl
//! jobs, check task status, and wait for completion. No domain logic.
//!
//! # Example
//!
//! ```rust,ignore
//! use crawl4ai_client::{Crawl4aiClient, CrawlRequest, CssSchema, ExtractionConfig};
//!
//! let token = std::env::var("CRAWL4AI_API_TOKEN").ok();
//! let client = Crawl4aiClient::new("http://localhost:11235", token.as_deref());
//!
//! let schema = CssSchema::new("Crypto Prices", ".cds-tableRow-t45thuk")
//!     .field("crypto", "td:nth-child(1) h2", "text")
//!     .field("price", "td:nth-child(2)", "text");
//!
//! let request = CrawlRequest::new("https://www.coinbase.com/explore")
//!     .extraction(ExtractionConfig::json_css(schema));
//!
//! let handle = client.submit_crawl(&request).await?;
//! let status = client.wait_for_task(&handle.task_id).await?;
//! println!("{}", serde_json::to_string(&status)?);
//! ```

pub mod error;
pub mod types;

pub use error::{Crawl4aiError, Result};
pub use types::{
    CrawlRequest, CrawlerParams, CssField, CssSchema, ExtractionConfig, SubmitResponse,
    TaskHandle, TaskStatus,
};

use std::time::{Duration, Instant};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);
/// Consecutive transient poll failures tolerated before giving up.
const MAX_POLL_FAILURES: u32 = 3;

pub struct Crawl4aiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    poll_interval: Duration,
    wait_timeout: Duration,
}

impl Crawl4aiClient {
    /// Create a client for the service at `base_url`. A `token` of `None`
    /// sends requests without an `Authorization` header.
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// Override the gap between status polls in [`wait_for_task`](Self::wait_for_task).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the total time [`wait_for_task`](Self::wait_for_task) polls
    /// before returning [`Crawl4aiError::WaitTimeout`].
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Submit one crawl job. Returns as soon as the service queues the task.
    pub async fn submit_crawl(&self, request: &CrawlRequest) -> Result<TaskHandle> {
        let endpoint = format!("{}/crawl", self.base_url);
        tracing::info!(url = %request.urls, priority = request.priority, "Submitting crawl task");

        let resp = self
            .authorize(self.client.post(&endpoint))
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Crawl4aiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let submit: SubmitResponse = serde_json::from_str(&body)?;
        // An empty id counts as missing, same as an absent field.
        match submit.task_id.filter(|t| !t.is_empty()) {
            Some(task_id) => {
                tracing::info!(task_id, "Crawl task accepted");
                Ok(TaskHandle { task_id })
            }
            None => Err(Crawl4aiError::MissingTaskId),
        }
    }

    /// Fetch the current status of a task.
    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        let endpoint = format!("{}/task/{}", self.base_url, task_id);

        let resp = self.authorize(self.client.get(&endpoint)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Crawl4aiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Poll the task until it reaches a terminal status.
    ///
    /// Returns the final status for a completed task, [`Crawl4aiError::TaskFailed`]
    /// for a failed one, and [`Crawl4aiError::WaitTimeout`] if neither happens
    /// within the wait timeout. Transient network errors are tolerated for a
    /// few polls in a row before the wait gives up.
    pub async fn wait_for_task(&self, task_id: &str) -> Result<TaskStatus> {
        let start = Instant::now();
        let mut failures = 0u32;

        loop {
            if start.elapsed() >= self.wait_timeout {
                return Err(Crawl4aiError::WaitTimeout {
                    task_id: task_id.to_string(),
                    waited: start.elapsed(),
                });
            }

            match self.task_status(task_id).await {
                Ok(status) => {
                    failures = 0;
                    match status.status.as_str() {
                        "completed" => {
                            tracing::info!(task_id, "Crawl task completed");
                            return Ok(status);
                        }
                        "failed" => {
                            let reason = status
                                .error()
                                .unwrap_or("no error detail in status response")
                                .to_string();
                            return Err(Crawl4aiError::TaskFailed(reason));
                        }
                        other => {
                            tracing::debug!(task_id, status = other, "Task still in progress");
                        }
                    }
                }
                Err(Crawl4aiError::Network(message)) => {
                    failures += 1;
                    if failures >= MAX_POLL_FAILURES {
                        return Err(Crawl4aiError::Network(message));
                    }
                    tracing::warn!(
                        task_id,
                        attempt = failures,
                        error = %message,
                        "Status poll failed, retrying"
                    );
                }
                Err(other) => return Err(other),
            }

            let remaining = self.wait_timeout.saturating_sub(start.elapsed());
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}
