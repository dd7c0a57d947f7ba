// ABOUTME: HTTP client for the semantic quote search service
// ABOUTME: Posts the source text and returns ranked quote candidates

use anyhow::{Context, Result};
use async_trait::async_trait;
use quoordinates_core::config::QuotesConfig;
use quoordinates_core::traits::{QuoteCandidate, QuoteSearch};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: u32,
}

#[derive(Clone)]
pub struct HttpQuoteSearch {
    http: Client,
    search_url: String,
    max_results: u32,
}

impl HttpQuoteSearch {
    pub fn new(config: &QuotesConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create quote search HTTP client")?;
        Ok(Self {
            http,
            search_url: config.search_url.clone(),
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl QuoteSearch for HttpQuoteSearch {
    #[tracing::instrument(skip(self, source_text), fields(limit = self.max_results))]
    async fn search(&self, source_text: &str) -> Result<Vec<QuoteCandidate>> {
        let request = SearchRequest {
            query: source_text,
            limit: self.max_results,
        };
        let response = self
            .http
            .post(&self.search_url)
            .json(&request)
            .send()
            .await
            .context("Quote search request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Quote search returned {}", response.status());
        }

        let candidates: Vec<QuoteCandidate> = response
            .json()
            .await
            .context("Failed to parse quote search response")?;
        tracing::debug!(count = candidates.len(), "Quote search returned candidates");
        Ok(candidates)
    }
}
