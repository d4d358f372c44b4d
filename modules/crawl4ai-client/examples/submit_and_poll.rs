use std::error::Error;

use crawl4ai_client::{
    Crawl4aiClient, CrawlRequest, CrawlerParams, CssSchema, ExtractionConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let token = std::env::var("CRAWL4AI_API_TOKEN").ok();
    let client = Crawl4aiClient::new("http://localhost:11235", token.as_deref());

    let schema = CssSchema::new("Crypto Prices", ".cds-tableRow-t45thuk")
        .field("crypto", "td:nth-child(1) h2", "text")
        .field("price", "td:nth-child(2)", "text");

    let request = CrawlRequest::new("https://www.nbcnews.com/business")
        .priority(10)
        .extraction(ExtractionConfig::json_css(schema))
        .js("const loadMoreButton = Array.from(document.querySelectorAll('button')).find(button => button.textContent.includes('Load More')); loadMoreButton && loadMoreButton.click();")
        .wait_for("article.tease-card:nth-child(10)")
        .screenshot(true)
        .crawler_params(
            CrawlerParams::new()
                .simulate_user(true)
                .magic(true)
                .override_navigator(true)
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
                .header("Accept-Language", "en-US,en;q=0.9")
                .delay_before_return_html(3.0)
                .screenshot_wait_for(".main-content"),
        );

    println!("Submitting crawl job...");
    let handle = client.submit_crawl(&request).await?;
    println!("Task accepted: {}", handle.task_id);

    let status = client.wait_for_task(&handle.task_id).await?;
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}
