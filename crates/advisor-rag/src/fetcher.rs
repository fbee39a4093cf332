//! HTTP content fetcher with HTML cleanup

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use advisor_core::{ContentFetcher, Error, Result};

/// Some documentation hosts reject default client agents
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

static NON_CONTENT: LazyLock<Option<Selector>> = LazyLock::new(|| {
    Selector::parse("script, style, nav, footer, header, aside, noscript").ok()
});

/// Fetches a page once, with a fixed timeout, and returns its readable text
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_default();

        let body = response
            .text()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        if content_type.is_empty() || content_type.contains("html") {
            Ok(extract_text(&body))
        } else if content_type.starts_with("text/plain") {
            Ok(normalize_whitespace(&body))
        } else {
            Err(Error::Fetch(format!("unsupported content type '{}'", content_type)))
        }
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(text) => {
                debug!(url, chars = text.chars().count(), "Fetched document");
                text
            }
            Err(e) => {
                warn!(url, error = %e, "Skipping document");
                String::new()
            }
        }
    }
}

/// Extract readable text from an HTML page
///
/// Script, style and page-chrome elements (nav, header, footer, aside) are
/// removed before the text nodes are collected one per line.
pub fn extract_text(html: &str) -> String {
    let mut document = Html::parse_document(html);

    if let Some(selector) = NON_CONTENT.as_ref() {
        let ids: Vec<_> = document.select(selector).map(|element| element.id()).collect();
        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    let text = document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    normalize_whitespace(&text)
}

/// Trim every line, split lines on double spaces and drop blank pieces
pub fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    const PAGE: &str = r#"
        <html>
            <head>
                <title>Lakehouse Migration Guide</title>
                <style>body { color: red; }</style>
                <script>var tracking = "should not appear";</script>
            </head>
            <body>
                <header><a href="/">Home</a> | <a href="/blog">Blog</a></header>
                <nav><ul><li>Products</li><li>Pricing</li></ul></nav>
                <article>
                    <h1>Assess your warehouse</h1>
                    <p>Inventory   every table and job   before moving.</p>


                    <p>Then   plan the cutover.</p>
                </article>
                <aside>Subscribe to our newsletter</aside>
                <footer>© Example Corp</footer>
            </body>
        </html>
    "#;

    #[test]
    fn test_extract_text_strips_page_chrome() {
        assert_snapshot!(extract_text(PAGE), @r"
        Lakehouse Migration Guide
        Assess your warehouse
        Inventory
        every table and job
        before moving.
        Then
        plan the cutover.
        ");
    }

    #[test]
    fn test_normalize_whitespace() {
        let raw = "  first line  \n\n\n   \nsecond  part  three\n";
        assert_eq!(normalize_whitespace(raw), "first line\nsecond\npart\nthree");
    }

    #[test]
    fn test_extract_text_of_empty_document() {
        assert_eq!(extract_text(""), "");
    }

    #[tokio::test]
    async fn test_unreachable_url_yields_empty_string() {
        // Bind then drop a listener to get a port nothing is serving on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(2)).unwrap();
        let text = fetcher.fetch(&format!("http://127.0.0.1:{}/guide", port)).await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_malformed_url_yields_empty_string() {
        let fetcher = HttpFetcher::new().unwrap();
        assert_eq!(fetcher.fetch("not a url").await, "");
    }
}
