//! Fetches source pages and extracts their visible text.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::types::RagError;

/// Crawl collaborator: turns a URL into whitespace-collapsed visible text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &Url) -> Result<String, RagError>;
}

/// Fetches pages over HTTP and strips markup with a body-text extraction.
#[derive(Clone, Debug)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String, RagError> {
        let body = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| RagError::SourceFetch {
                url: url.to_string(),
                message: err.to_string(),
            })?
            .text()
            .await
            .map_err(|err| RagError::SourceFetch {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        extract_visible_text(&body)
    }
}

/// Extracts the visible text of an HTML document: text nodes under `body`
/// (or the whole document when no body exists), joined with single spaces.
pub fn extract_visible_text(html: &str) -> Result<String, RagError> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("body").map_err(|err| RagError::InvalidDocument(err.to_string()))?;

    let tokens: Vec<&str> = match document.select(&selector).next() {
        Some(body) => body.text().flat_map(str::split_whitespace).collect(),
        None => document
            .root_element()
            .text()
            .flat_map(str::split_whitespace)
            .collect(),
    };

    Ok(tokens.join(" "))
}
