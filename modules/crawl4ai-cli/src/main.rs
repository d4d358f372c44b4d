//! Command-line client for a self-hosted Crawl4AI service.
//!
//! Submits crawl jobs, reports task status, and optionally polls until a
//! task finishes. Status payloads are printed to stdout as received;
//! logging goes to stderr so output stays pipeable.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crawl4ai_client::{
    Crawl4aiClient, Crawl4aiError, CrawlRequest, CrawlerParams, CssSchema, ExtractionConfig,
    TaskStatus,
};

use config::Config;

/// Printed verbatim when a submission comes back without a task identifier.
const TASK_ID_MISSING_MESSAGE: &str = "Error: Task ID not found in the response.";

#[derive(Parser)]
#[command(name = "crawl4ai", version, about = "Submit crawl jobs to a Crawl4AI service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a crawl job, then report its status
    Submit(SubmitArgs),
    /// Fetch the current status of a task
    Status {
        /// Task identifier returned at submission
        task_id: String,
    },
    /// Poll a task until it completes or fails
    Watch {
        /// Task identifier returned at submission
        task_id: String,
    },
}

#[derive(Args)]
struct SubmitArgs {
    /// URL to crawl
    url: String,

    /// Queue priority, higher runs first
    #[arg(long, default_value_t = 10)]
    priority: u8,

    /// Extraction strategy to apply to the fetched page
    #[arg(long, value_enum)]
    extract: Option<ExtractKind>,

    /// Model for LLM extraction, e.g. openai/gpt-4
    #[arg(long)]
    llm_provider: Option<String>,

    /// Instruction guiding LLM extraction
    #[arg(long)]
    llm_instruction: Option<String>,

    /// Path to a JSON schema file for CSS extraction
    #[arg(long)]
    schema_file: Option<PathBuf>,

    /// Keywords for cosine similarity filtering
    #[arg(long)]
    semantic_filter: Option<String>,

    /// Minimum word count per content block (cosine)
    #[arg(long, default_value_t = 10)]
    word_count_threshold: u32,

    /// Maximum cosine distance to the filter (cosine)
    #[arg(long, default_value_t = 0.2)]
    max_dist: f64,

    /// Number of best-matching blocks to keep (cosine)
    #[arg(long, default_value_t = 3)]
    top_k: u32,

    /// JavaScript snippet to run in the page, repeatable
    #[arg(long = "js")]
    js_code: Vec<String>,

    /// CSS selector to wait for before the crawl returns
    #[arg(long)]
    wait_for: Option<String>,

    /// Capture a screenshot of the page
    #[arg(long)]
    screenshot: bool,

    /// Simulate real user input on the page
    #[arg(long)]
    simulate_user: bool,

    /// Let the service pick its own anti-detection tricks
    #[arg(long)]
    magic: bool,

    /// Mask the automated browser's navigator fingerprint
    #[arg(long)]
    override_navigator: bool,

    /// Custom User-Agent for the crawler's page fetch
    #[arg(long)]
    user_agent: Option<String>,

    /// Extra page-fetch header as NAME=VALUE, repeatable
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Seconds to hold the page open before returning HTML
    #[arg(long)]
    delay_before_return_html: Option<f64>,

    /// CSS selector to wait for before the screenshot
    #[arg(long)]
    screenshot_wait_for: Option<String>,

    /// Poll until the task finishes instead of reporting once
    #[arg(long)]
    watch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum ExtractKind {
    Llm,
    Css,
    Cosine,
}

// The bin target's module path is rooted at the binary name, `crawl4ai`.
fn env_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive("crawl4ai_client=info".parse()?)
        .add_directive("crawl4ai=info".parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_keys();

    let client = Crawl4aiClient::new(&config.base_url, config.api_token.as_deref());

    match cli.command {
        Commands::Submit(args) => submit(&client, args).await,
        Commands::Status { task_id } => {
            let status = client.task_status(&task_id).await?;
            print_status(&status)
        }
        Commands::Watch { task_id } => {
            let status = client.wait_for_task(&task_id).await?;
            print_status(&status)
        }
    }
}

async fn submit(client: &Crawl4aiClient, args: SubmitArgs) -> Result<()> {
    let request = build_request(&args)?;

    let handle = match client.submit_crawl(&request).await {
        Ok(handle) => handle,
        Err(Crawl4aiError::MissingTaskId) => {
            // Terminal condition, not a process failure. No follow-up request.
            println!("{TASK_ID_MISSING_MESSAGE}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let status = if args.watch {
        client.wait_for_task(&handle.task_id).await?
    } else {
        client.task_status(&handle.task_id).await?
    };
    print_status(&status)
}

fn print_status(status: &TaskStatus) -> Result<()> {
    println!("{}", serde_json::to_string(status)?);
    Ok(())
}

fn build_request(args: &SubmitArgs) -> Result<CrawlRequest> {
    let mut request = CrawlRequest::new(&args.url).priority(args.priority);

    if let Some(extraction) = build_extraction(args)? {
        request = request.extraction(extraction);
    }
    for snippet in &args.js_code {
        request = request.js(snippet);
    }
    if let Some(ref selector) = args.wait_for {
        request = request.wait_for(selector);
    }
    if args.screenshot {
        request = request.screenshot(true);
    }
    if let Some(params) = build_crawler_params(args) {
        request = request.crawler_params(params);
    }

    Ok(request)
}

fn build_extraction(args: &SubmitArgs) -> Result<Option<ExtractionConfig>> {
    let Some(kind) = args.extract else {
        return Ok(None);
    };

    let extraction = match kind {
        ExtractKind::Llm => {
            let provider = args
                .llm_provider
                .clone()
                .context("--llm-provider is required with --extract llm")?;
            let instruction = args
                .llm_instruction
                .clone()
                .context("--llm-instruction is required with --extract llm")?;
            ExtractionConfig::llm(provider, instruction)
        }
        ExtractKind::Css => {
            let path = args
                .schema_file
                .as_ref()
                .context("--schema-file is required with --extract css")?;
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read schema file {}", path.display()))?;
            let schema: CssSchema = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid CSS schema in {}", path.display()))?;
            ExtractionConfig::json_css(schema)
        }
        ExtractKind::Cosine => {
            let filter = args
                .semantic_filter
                .clone()
                .context("--semantic-filter is required with --extract cosine")?;
            ExtractionConfig::cosine(
                filter,
                args.word_count_threshold,
                args.max_dist,
                args.top_k,
            )
        }
    };

    Ok(Some(extraction))
}

fn build_crawler_params(args: &SubmitArgs) -> Option<CrawlerParams> {
    let mut params = CrawlerParams::new();

    if args.simulate_user {
        params = params.simulate_user(true);
    }
    if args.magic {
        params = params.magic(true);
    }
    if args.override_navigator {
        params = params.override_navigator(true);
    }
    if let Some(ref user_agent) = args.user_agent {
        params = params.user_agent(user_agent);
    }
    for (name, value) in &args.headers {
        params = params.header(name, value);
    }
    if let Some(delay) = args.delay_before_return_html {
        params = params.delay_before_return_html(delay);
    }
    if let Some(ref selector) = args.screenshot_wait_for {
        params = params.screenshot_wait_for(selector);
    }

    (params != CrawlerParams::new()).then_some(params)
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}
