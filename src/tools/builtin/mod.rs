//! Network-backed tools available to the executor.
//!
//! Each tool is an [`AgentTool`](crate::tools::AgentTool) returned as
//! `Arc<dyn Tool>`. Endpoints come from [`ToolEndpoints`] so tests can point
//! them at a local mock server. Network and parse failures are reported as
//! plain sentences in the tool output rather than as errors.

mod currency;
mod news;
mod search;
mod weather;
mod web_page;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use currency::exchange_rate_tool;
pub use news::{parse_feed, search_news_tool, NewsItem};
pub use search::search_web_tool;
pub use weather::weather_tool;
pub use web_page::{open_web_page_tool, PageAction};

use super::registry::{ToolName, ToolRegistry};
use super::tool::Tool;
use crate::error::{QuintetError, Result};

/// Base URLs used by the built-in tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolEndpoints {
    /// DuckDuckGo HTML search page; the query goes in `q`.
    pub duckduckgo: String,
    /// Wikipedia host; `{lang}` is replaced with the language code.
    pub wikipedia: String,
    /// Google News RSS search endpoint; the query goes in `q`.
    pub news: String,
    /// wttr.in host.
    pub weather: String,
    /// open.er-api.com `latest` endpoint; the base currency is appended.
    pub exchange_rates: String,
}

impl Default for ToolEndpoints {
    fn default() -> Self {
        Self {
            duckduckgo: "https://html.duckduckgo.com/html/".to_string(),
            wikipedia: "https://{lang}.wikipedia.org".to_string(),
            news: "https://news.google.com/rss/search".to_string(),
            weather: "https://wttr.in".to_string(),
            exchange_rates: "https://open.er-api.com/v6/latest".to_string(),
        }
    }
}

impl ToolEndpoints {
    /// Point every endpoint at one host (used by tests).
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            duckduckgo: format!("{base}/html/"),
            wikipedia: base.to_string(),
            news: format!("{base}/rss/search"),
            weather: base.to_string(),
            exchange_rates: format!("{base}/v6/latest"),
        }
    }
}

/// Build the tool for `name`.
pub fn builtin_tool(name: ToolName, endpoints: &Arc<ToolEndpoints>) -> Arc<dyn Tool> {
    match name {
        ToolName::SearchWeb => search_web_tool(endpoints.clone()),
        ToolName::SearchNews => search_news_tool(endpoints.clone()),
        ToolName::GetWeather => weather_tool(endpoints.clone()),
        ToolName::GetExchangeRate => exchange_rate_tool(endpoints.clone()),
        ToolName::OpenWebPage => open_web_page_tool(),
    }
}

/// A registry holding the enabled built-in tools.
pub fn builtin_registry(enabled: &[ToolName], endpoints: ToolEndpoints) -> Result<ToolRegistry> {
    let endpoints = Arc::new(endpoints);
    let mut registry = ToolRegistry::new();
    for name in enabled {
        registry.register(*name, builtin_tool(*name, &endpoints))?;
    }
    Ok(registry)
}

fn selector(css: &str) -> Result<scraper::Selector> {
    scraper::Selector::parse(css)
        .map_err(|e| QuintetError::InvalidState(format!("invalid selector '{css}': {e}")))
}

/// All text below `element`, whitespace collapsed.
fn element_text(element: scraper::ElementRef<'_>) -> String {
    crate::util::text::collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn parse_url(raw: &str) -> Result<reqwest::Url> {
    reqwest::Url::parse(raw).map_err(|e| QuintetError::InvalidArgument(format!("invalid URL '{raw}': {e}")))
}
