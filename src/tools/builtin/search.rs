//! `search_web`: DuckDuckGo HTML results plus a Wikipedia summary for
//! definitional questions.

use std::sync::Arc;

use scraper::Html;
use serde::Deserialize;
use tracing::debug;

use super::{element_text, parse_url, selector, ToolEndpoints};
use crate::error::{QuintetError, Result};
use crate::provider::http::{browser_headers, shared_client};
use crate::tools::tool::{AgentTool, Tool};
use crate::tools::types::ToolParameters;

const MAX_RESULTS: usize = 3;
const DEFINITION_CUES: &[&str] = &["what is", "who is", "define", "是什么", "什么是", "定义", "介绍"];

pub fn search_web_tool(endpoints: Arc<ToolEndpoints>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "search_web",
        "Search the web (DuckDuckGo, plus Wikipedia for definitions)",
        ToolParameters::object()
            .string("query", "Search query", true)
            .build(),
        move |args, _ctx| {
            let endpoints = endpoints.clone();
            async move {
                let query = args.get_str("query")?.to_string();
                Ok(search_web(&endpoints, &query).await)
            }
        },
    ))
}

/// A single DuckDuckGo hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

async fn search_web(endpoints: &ToolEndpoints, query: &str) -> String {
    let mut sections = Vec::new();

    match search_duckduckgo(endpoints, query).await {
        Ok(hits) if !hits.is_empty() => sections.push(format_hits(query, &hits)),
        Ok(_) => debug!(query, "duckduckgo returned no results"),
        Err(e) => sections.push(format!("DuckDuckGo search failed: {e}")),
    }

    if is_definitional(query) {
        match wikipedia_summary(endpoints, query).await {
            Ok(Some(summary)) => sections.push(summary),
            Ok(None) => debug!(query, "no wikipedia entry"),
            Err(e) => debug!(query, error = %e, "wikipedia lookup failed"),
        }
    }

    if sections.is_empty() {
        format!("Could not find information about '{query}'. Try a different or more specific query.")
    } else {
        sections.join("\n\n---\n\n")
    }
}

async fn search_duckduckgo(endpoints: &ToolEndpoints, query: &str) -> Result<Vec<SearchHit>> {
    let response = shared_client()
        .get(&endpoints.duckduckgo)
        .headers(browser_headers())
        .query(&[("q", query)])
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(QuintetError::api(status.as_u16(), "search page unavailable"));
    }
    let body = response.text().await?;
    parse_duckduckgo(&body, MAX_RESULTS)
}

/// Extract result titles, links and snippets from a DuckDuckGo HTML page.
pub fn parse_duckduckgo(html: &str, max: usize) -> Result<Vec<SearchHit>> {
    let document = Html::parse_document(html);
    let result = selector(".result")?;
    let title = selector("a.result__a")?;
    let snippet = selector(".result__snippet")?;

    let hits = document
        .select(&result)
        .filter_map(|node| {
            let anchor = node.select(&title).next()?;
            let hit = SearchHit {
                title: element_text(anchor),
                link: anchor.value().attr("href").unwrap_or_default().to_string(),
                snippet: node.select(&snippet).next().map(element_text).unwrap_or_default(),
            };
            (!hit.title.is_empty()).then_some(hit)
        })
        .take(max)
        .collect();
    Ok(hits)
}

fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    let lines: Vec<String> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| format!("{}. **{}**\n   {}\n   Link: {}", i + 1, hit.title, hit.snippet, hit.link))
        .collect();
    format!("DuckDuckGo results for '{query}':\n\n{}", lines.join("\n\n"))
}

pub fn is_definitional(query: &str) -> bool {
    let lowered = query.to_lowercase();
    DEFINITION_CUES.iter().any(|cue| lowered.contains(cue))
}

/// Whether `text` contains CJK ideographs.
pub(super) fn is_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// `zh` for queries containing CJK ideographs, `en` otherwise.
fn wikipedia_language(query: &str) -> &'static str {
    if is_cjk(query) {
        "zh"
    } else {
        "en"
    }
}

#[derive(Deserialize)]
struct PageSummary {
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Deserialize)]
struct ContentUrls {
    desktop: Option<DesktopUrl>,
}

#[derive(Deserialize)]
struct DesktopUrl {
    page: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Vec<SearchEntry>,
}

#[derive(Deserialize)]
struct SearchEntry {
    title: String,
}

async fn wikipedia_summary(endpoints: &ToolEndpoints, query: &str) -> Result<Option<String>> {
    let host = endpoints.wikipedia.replace("{lang}", wikipedia_language(query));
    let host = host.trim_end_matches('/');

    if let Some(summary) = fetch_summary(host, query).await? {
        return Ok(Some(summary));
    }

    // Exact title missed; take the best full-text match instead.
    let response = shared_client()
        .get(format!("{host}/w/api.php"))
        .query(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("format", "json"),
            ("srlimit", "1"),
        ])
        .send()
        .await?;
    if !response.status().is_success() {
        return Ok(None);
    }
    let found: SearchResponse = response.json().await?;
    match found.query.search.into_iter().next() {
        Some(entry) => fetch_summary(host, &entry.title).await,
        None => Ok(None),
    }
}

async fn fetch_summary(host: &str, title: &str) -> Result<Option<String>> {
    let mut url = parse_url(&format!("{host}/api/rest_v1/page/summary"))?;
    url.path_segments_mut()
        .map_err(|_| QuintetError::InvalidArgument(format!("cannot extend URL '{host}'")))?
        .push(title);

    let response = shared_client().get(url).send().await?;
    if !response.status().is_success() {
        return Ok(None);
    }
    let page: PageSummary = response.json().await?;
    let Some(extract) = page.extract.filter(|e| !e.trim().is_empty()) else {
        return Ok(None);
    };

    let mut text = format!(
        "**Wikipedia: {}**\n\n{extract}",
        page.title.as_deref().unwrap_or(title)
    );
    if let Some(link) = page.content_urls.and_then(|u| u.desktop).and_then(|d| d.page) {
        text.push_str(&format!("\n\nMore: {link}"));
    }
    Ok(Some(text))
}
