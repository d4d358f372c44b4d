use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Extraction strategies ---

/// How the service should turn a fetched page into structured data.
///
/// Serializes to the wire envelope the service expects:
/// `{"type": "<strategy>", "params": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum ExtractionConfig {
    /// Ask a language model to pull content out of the page.
    Llm { provider: String, instruction: String },
    /// Extract fields with CSS selectors against a declared schema.
    JsonCss { schema: CssSchema },
    /// Keep only content semantically close to a keyword filter.
    Cosine {
        semantic_filter: String,
        word_count_threshold: u32,
        max_dist: f64,
        top_k: u32,
    },
}

impl ExtractionConfig {
    pub fn llm(provider: impl Into<String>, instruction: impl Into<String>) -> Self {
        ExtractionConfig::Llm {
            provider: provider.into(),
            instruction: instruction.into(),
        }
    }

    pub fn json_css(schema: CssSchema) -> Self {
        ExtractionConfig::JsonCss { schema }
    }

    pub fn cosine(
        semantic_filter: impl Into<String>,
        word_count_threshold: u32,
        max_dist: f64,
        top_k: u32,
    ) -> Self {
        ExtractionConfig::Cosine {
            semantic_filter: semantic_filter.into(),
            word_count_threshold,
            max_dist,
            top_k,
        }
    }
}

/// Schema for CSS extraction: a base selector scoping each record and the
/// fields to read inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssSchema {
    pub name: String,
    #[serde(rename = "baseSelector")]
    pub base_selector: String,
    pub fields: Vec<CssField>,
}

impl CssSchema {
    pub fn new(name: impl Into<String>, base_selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_selector: base_selector.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field descriptor.
    pub fn field(
        mut self,
        name: impl Into<String>,
        selector: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        self.fields.push(CssField {
            name: name.into(),
            selector: selector.into(),
            field_type: kind.into(),
        });
        self
    }
}

/// One field in a [`CssSchema`]: where to look and what kind of value to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssField {
    pub name: String,
    pub selector: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

impl CssField {
    /// Plain text field, the common case.
    pub fn text(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            field_type: "text".to_string(),
        }
    }
}

// --- Crawl request ---

/// Body for `POST /crawl`: one page-fetch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Target URL. The service names the field `urls` but takes a single
    /// URL string here.
    pub urls: String,
    /// Queue priority, higher runs first.
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_config: Option<ExtractionConfig>,
    /// JavaScript snippets executed in the page before extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub js_code: Vec<String>,
    /// CSS selector the crawler waits for before returning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<String>,
    pub screenshot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawler_params: Option<CrawlerParams>,
}

impl CrawlRequest {
    /// Request for a single URL with priority 10 and no automation.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            urls: url.into(),
            priority: 10,
            extraction_config: None,
            js_code: Vec::new(),
            wait_for: None,
            screenshot: false,
            crawler_params: None,
        }
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn extraction(mut self, config: ExtractionConfig) -> Self {
        self.extraction_config = Some(config);
        self
    }

    /// Add a JavaScript snippet to run in the page.
    pub fn js(mut self, snippet: impl Into<String>) -> Self {
        self.js_code.push(snippet.into());
        self
    }

    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }

    pub fn screenshot(mut self, screenshot: bool) -> Self {
        self.screenshot = screenshot;
        self
    }

    pub fn crawler_params(mut self, params: CrawlerParams) -> Self {
        self.crawler_params = Some(params);
        self
    }
}

/// Browser-automation knobs forwarded to the crawler. Everything is
/// optional; unset fields stay off the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlerParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulate_user: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_navigator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Extra request headers the crawler sends when fetching the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// Open-ended passthrough bag. The service reads keys such as
    /// `delay_before_return_html` out of it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_wait_for: Option<String>,
}

impl CrawlerParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simulate_user(mut self, on: bool) -> Self {
        self.simulate_user = Some(on);
        self
    }

    pub fn magic(mut self, on: bool) -> Self {
        self.magic = Some(on);
        self
    }

    pub fn override_navigator(mut self, on: bool) -> Self {
        self.override_navigator = Some(on);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add one request header for the crawler's page fetch.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Hold the page open this many seconds before returning HTML.
    pub fn delay_before_return_html(mut self, seconds: f64) -> Self {
        let extra = self
            .extra
            .get_or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(map) = extra {
            map.insert("delay_before_return_html".to_string(), seconds.into());
        }
        self
    }

    pub fn screenshot_wait_for(mut self, selector: impl Into<String>) -> Self {
        self.screenshot_wait_for = Some(selector.into());
        self
    }
}

// --- Responses ---

/// Raw body of a `POST /crawl` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub task_id: Option<String>,
}

/// Receipt for an accepted crawl job.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    pub task_id: String,
}

/// Status payload from `GET /task/{task_id}`.
///
/// The service owns this shape and grows it freely; only `status` is
/// interpreted here. Every other field rides along in `extra` untouched,
/// explicit nulls included, so re-serializing reproduces the body as
/// received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl TaskStatus {
    /// Whether the task has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed")
    }

    /// The extraction result, when present and non-null.
    pub fn result(&self) -> Option<&Value> {
        self.extra.get("result").filter(|v| !v.is_null())
    }

    /// The service's error string for a failed task.
    pub fn error(&self) -> Option<&str> {
        self.extra.get("error").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn llm_wire_shape() {
        let config =
            ExtractionConfig::llm("openai/gpt-4", "Extract main topics from the page");
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "llm",
                "params": {
                    "provider": "openai/gpt-4",
                    "instruction": "Extract main topics from the page"
                }
            })
        );
    }

    #[test]
    fn css_wire_shape_and_round_trip() {
        let schema = CssSchema::new("Rows", ".row").field("x", "td", "text");
        let config = ExtractionConfig::json_css(schema);
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value["type"], "json_css");
        assert_eq!(value["params"]["schema"]["name"], "Rows");
        assert_eq!(value["params"]["schema"]["baseSelector"], ".row");
        assert_eq!(
            value["params"]["schema"]["fields"][0],
            json!({"name": "x", "selector": "td", "type": "text"})
        );

        let back: ExtractionConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn cosine_wire_shape() {
        let config = ExtractionConfig::cosine("business finance economy", 10, 0.2, 3);
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "cosine",
                "params": {
                    "semantic_filter": "business finance economy",
                    "word_count_threshold": 10,
                    "max_dist": 0.2,
                    "top_k": 3
                }
            })
        );
    }

    #[test]
    fn minimal_request_omits_unset_fields() {
        let request = CrawlRequest::new("https://example.com");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "urls": "https://example.com",
                "priority": 10,
                "screenshot": false
            })
        );
    }

    #[test]
    fn crawler_params_builders() {
        let params = CrawlerParams::new()
            .simulate_user(true)
            .magic(true)
            .header("Accept-Language", "en-US,en;q=0.9")
            .delay_before_return_html(3.0);
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(
            value,
            json!({
                "simulate_user": true,
                "magic": true,
                "headers": {"Accept-Language": "en-US,en;q=0.9"},
                "extra": {"delay_before_return_html": 3.0}
            })
        );
    }

    #[test]
    fn task_status_preserves_unknown_fields() {
        let body = r##"{"status":"completed","result":{"markdown":"# hi"},"created_at":1700000000}"##;
        let status: TaskStatus = serde_json::from_str(body).unwrap();

        assert!(status.is_terminal());
        assert_eq!(status.result().unwrap()["markdown"], "# hi");
        assert_eq!(status.extra["created_at"], json!(1700000000));

        let echoed = serde_json::to_value(&status).unwrap();
        assert_eq!(echoed, serde_json::from_str::<Value>(body).unwrap());
    }

    #[test]
    fn task_status_echoes_explicit_nulls() {
        let body = r#"{"status":"pending","result":null}"#;
        let status: TaskStatus = serde_json::from_str(body).unwrap();

        assert!(status.result().is_none());
        assert!(status.error().is_none());

        let echoed = serde_json::to_value(&status).unwrap();
        assert_eq!(echoed, serde_json::from_str::<Value>(body).unwrap());
    }

    #[test]
    fn terminal_statuses() {
        for (raw, terminal) in [
            ("pending", false),
            ("processing", false),
            ("completed", true),
            ("failed", true),
        ] {
            let status: TaskStatus =
                serde_json::from_value(json!({"status": raw})).unwrap();
            assert_eq!(status.is_terminal(), terminal, "status {raw}");
        }
    }
}
