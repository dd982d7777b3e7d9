//! `open_web_page`: fetch a page and return its readable text or a
//! request summary.

use std::sync::Arc;

use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{element_text, parse_url, selector};
use crate::error::Result;
use crate::provider::http::{browser_headers, shared_client};
use crate::tools::tool::{AgentTool, Tool};
use crate::tools::types::ToolParameters;
use crate::util::text::{collapse_whitespace, ellipsize};

const MAX_CONTENT_CHARS: usize = 1000;
const MIN_PARAGRAPH_CHARS: usize = 50;

/// What to do with the fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PageAction {
    #[default]
    Content,
    Logs,
    /// No renderer is available; answered with the page text.
    Screenshot,
}

pub fn open_web_page_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "open_web_page",
        "Open a web page and read its content or request log",
        ToolParameters::object()
            .string("url", "Page URL", true)
            .string_enum("action", "content, logs or screenshot", &["content", "logs", "screenshot"], false)
            .build(),
        |args, _ctx| async move {
            let url = args.get_str("url")?.to_string();
            let action = args
                .get_str_opt("action")
                .and_then(|a| a.parse::<PageAction>().ok())
                .unwrap_or_default();
            Ok(match open_page(&url, action).await {
                Ok(text) => text,
                Err(e) => format!("Could not open {url}: {e}"),
            })
        },
    ))
}

async fn open_page(url: &str, action: PageAction) -> Result<String> {
    let target = parse_url(url)?;
    let response = shared_client()
        .get(target)
        .headers(browser_headers())
        .send()
        .await?;

    if action == PageAction::Logs {
        let status = response.status();
        let mut lines = vec![format!("GET {url} -> {status}")];
        for (name, value) in response.headers() {
            lines.push(format!("{name}: {}", value.to_str().unwrap_or("<binary>")));
        }
        return Ok(lines.join("\n"));
    }

    let body = response.text().await?;
    let text = extract_main_text(&body, MAX_CONTENT_CHARS)?;
    let prefix = match action {
        PageAction::Screenshot => "Screenshots are not available; page text instead",
        _ => "Page content",
    };
    Ok(format!("{prefix} ({url}):\n\n{text}"))
}

/// Readable text of an HTML page.
///
/// Prefers `article`/`main` elements and content-like containers; falls back
/// to paragraphs longer than a short caption. Script and style text is never
/// included.
pub fn extract_main_text(html: &str, max_chars: usize) -> Result<String> {
    let document = Html::parse_document(html);
    let regions = selector(
        "article, main, [class*=content], [class*=article], [class*=main], [class*=body]",
    )?;

    let mut parts: Vec<String> = document
        .select(&regions)
        // Skip nested regions; their text is already in the ancestor.
        .filter(|el| {
            !el.ancestors()
                .filter_map(scraper::ElementRef::wrap)
                .any(|a| regions.matches(&a))
        })
        .map(visible_text)
        .filter(|t| !t.is_empty())
        .collect();

    if parts.is_empty() {
        let paragraphs = selector("p")?;
        parts = document
            .select(&paragraphs)
            .map(element_text)
            .filter(|t| t.chars().count() > MIN_PARAGRAPH_CHARS)
            .collect();
    }

    Ok(ellipsize(&collapse_whitespace(&parts.join(" ")), max_chars))
}

fn visible_text(element: scraper::ElementRef<'_>) -> String {
    let mut out = Vec::new();
    for node in element.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node
                .ancestors()
                .filter_map(scraper::ElementRef::wrap)
                .any(|a| matches!(a.value().name(), "script" | "style" | "noscript"));
            if !hidden {
                let text: &str = text;
                out.push(text.to_string());
            }
        }
    }
    collapse_whitespace(&out.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_article_without_scripts() {
        let html = r#"<html><head><style>body{}</style></head><body>
            <nav>Menu</nav>
            <article><h1>Title</h1><script>var x = 1;</script><p>Body   text
            here.</p></article></body></html>"#;
        assert_eq!(extract_main_text(html, 1000).unwrap(), "Title Body text here.");
    }

    #[test]
    fn falls_back_to_long_paragraphs() {
        let long = "This paragraph is comfortably longer than fifty characters in total.";
        let html = format!("<body><p>short</p><p>{long}</p></body>");
        assert_eq!(extract_main_text(&html, 1000).unwrap(), long);
    }

    #[test]
    fn truncates_long_content() {
        let html = format!("<main>{}</main>", "word ".repeat(500));
        let text = extract_main_text(&html, 20).unwrap();
        assert!(text.ends_with("..."));
        assert_eq!(text.chars().count(), 23);
    }

    #[test]
    fn nested_regions_are_not_duplicated() {
        let html = r#"<main><div class="content">Once</div></main>"#;
        assert_eq!(extract_main_text(html, 1000).unwrap(), "Once");
    }

    #[test]
    fn parses_actions() {
        assert_eq!("logs".parse::<PageAction>().unwrap(), PageAction::Logs);
        assert_eq!(PageAction::default(), PageAction::Content);
    }
}
