// ABOUTME: OpenAI-compatible client backing the summarize and illustrate actions
// ABOUTME: Calls /chat/completions for summaries and /images/generations for art

use anyhow::{Context, Result};
use async_trait::async_trait;
use quoordinates_core::config::OpenAiConfig;
use quoordinates_core::traits::{ArtGenerator, Completer, GeneratedArt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

/// Client for an OpenAI-compatible API
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create OpenAI HTTP client")?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: Serialize + ?Sized, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("OpenAI request to {} failed", path))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("OpenAI {} returned {}: {}", path, status, error_text);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse OpenAI {} response", path))
    }
}

fn extract_completion(response: ChatResponse) -> Result<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("Completion response had no content")?;
    Ok(content.trim().to_string())
}

fn extract_art(response: ImageResponse, source_text: &str) -> Result<GeneratedArt> {
    let image = response
        .data
        .into_iter()
        .next()
        .context("Image response had no data")?;
    let image_url = image.url.context("Image response had no URL")?;
    let prompt = image
        .revised_prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| source_text.to_string());
    Ok(GeneratedArt { prompt, image_url })
}

#[async_trait]
impl Completer for OpenAiClient {
    #[tracing::instrument(skip(self, instruction), fields(model = %self.config.completion_model))]
    async fn complete(&self, instruction: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.completion_model,
            messages: vec![ChatMessage {
                role: "user",
                content: instruction,
            }],
        };
        let response: ChatResponse = self.post("chat/completions", &request).await?;
        extract_completion(response)
    }
}

#[async_trait]
impl ArtGenerator for OpenAiClient {
    #[tracing::instrument(skip(self, source_text), fields(model = %self.config.image_model))]
    async fn generate(&self, source_text: &str) -> Result<GeneratedArt> {
        let request = ImageRequest {
            model: &self.config.image_model,
            prompt: source_text,
            n: 1,
            size: &self.config.image_size,
        };
        let response: ImageResponse = self.post("images/generations", &request).await?;
        extract_art(response, source_text)
    }
}
