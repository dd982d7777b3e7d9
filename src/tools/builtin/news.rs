//! `search_news`: latest headlines from the Google News RSS feed.

use std::sync::Arc;

use serde::Deserialize;

use super::search::is_cjk;
use super::ToolEndpoints;
use crate::error::{QuintetError, Result};
use crate::provider::http::shared_client;
use crate::tools::tool::{AgentTool, Tool};
use crate::tools::types::ToolParameters;

const MAX_HEADLINES: usize = 5;

pub fn search_news_tool(endpoints: Arc<ToolEndpoints>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "search_news",
        "Search recent news headlines",
        ToolParameters::object()
            .string("query", "News topic", true)
            .build(),
        move |args, _ctx| {
            let endpoints = endpoints.clone();
            async move {
                let query = args.get_str("query")?.to_string();
                Ok(match fetch_headlines(&endpoints, &query).await {
                    Ok(items) => format_headlines(&query, &items),
                    Err(e) => format!("News search failed: {e}"),
                })
            }
        },
    ))
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<NewsItem>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
}

/// Feed locale parameters `(hl, gl, ceid)` for `query`.
fn locale(query: &str) -> [(&'static str, &'static str); 3] {
    if is_cjk(query) {
        [("hl", "zh-CN"), ("gl", "CN"), ("ceid", "CN:zh-Hans")]
    } else {
        [("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")]
    }
}

async fn fetch_headlines(endpoints: &ToolEndpoints, query: &str) -> Result<Vec<NewsItem>> {
    let response = shared_client()
        .get(&endpoints.news)
        .query(&[("q", query)])
        .query(&locale(query))
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(QuintetError::api(status.as_u16(), "news feed unavailable"));
    }
    parse_feed(&response.text().await?)
}

/// Items of an RSS 2.0 document, in feed order.
pub fn parse_feed(xml: &str) -> Result<Vec<NewsItem>> {
    let rss: Rss = quick_xml::de::from_str(xml)
        .map_err(|e| QuintetError::tool("search_news", format!("malformed feed: {e}")))?;
    Ok(rss.channel.items)
}

/// `Mon, 14 Oct 2026 08:30:00 GMT` becomes `2026-10-14 08:30`; anything
/// unparseable is kept as is.
fn short_date(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc2822(raw.trim())
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.trim().to_string())
}

fn format_headlines(query: &str, items: &[NewsItem]) -> String {
    if items.is_empty() {
        return format!("No news found about '{query}'.");
    }
    let lines: Vec<String> = items
        .iter()
        .take(MAX_HEADLINES)
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. **{}**\n   Published: {}\n   Link: {}",
                i + 1,
                item.title.as_deref().unwrap_or("Untitled"),
                item.pub_date.as_deref().map(short_date).unwrap_or_else(|| "unknown".to_string()),
                item.link.as_deref().unwrap_or("#"),
            )
        })
        .collect();
    format!("Latest news about '{query}':\n\n{}", lines.join("\n\n"))
}
