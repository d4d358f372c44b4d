use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Crawl4aiError>;

#[derive(Debug, Error)]
pub enum Crawl4aiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Submission accepted but no task_id in the response")]
    MissingTaskId,

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Timed out after {waited:?} waiting for task {task_id}")]
    WaitTimeout { task_id: String, waited: Duration },
}

impl From<reqwest::Error> for Crawl4aiError {
    fn from(err: reqwest::Error) -> Self {
        Crawl4aiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for Crawl4aiError {
    fn from(err: serde_json::Error) -> Self {
        Crawl4aiError::Parse(err.to_string())
    }
}
