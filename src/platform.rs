// ABOUTME: Discord-style REST transport implementing ReplySurface for one interaction
// ABOUTME: Also decodes the inbound InteractionEnvelope into a core Interaction

use anyhow::{Context, Result};
use async_trait::async_trait;
use quoordinates_core::config::PlatformConfig;
use quoordinates_core::traits::{
    ButtonDescriptor, ButtonStyle, ChannelRef, Interaction, InteractionKind, ReplyPayload,
    ReplySurface, SourceMessage,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// Interaction callback type: channel message with source
const CALLBACK_MESSAGE: u8 = 4;
/// Interaction callback type: deferred channel message ("thinking...")
const CALLBACK_DEFERRED: u8 = 5;
/// Message flag hiding the message from everyone but the invoking user
const FLAG_EPHEMERAL: u64 = 1 << 6;

const COMPONENT_ACTION_ROW: u8 = 1;
const COMPONENT_BUTTON: u8 = 2;

// =============================================================================
// Inbound
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeChannel {
    pub id: String,
    #[serde(default)]
    pub is_thread: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeMessage {
    pub id: String,
    pub content: String,
}

/// Interaction as relayed to the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEnvelope {
    /// Platform interaction ID, used in the callback URL
    pub id: String,
    /// Interaction token, valid for follow-ups for a limited time
    pub token: String,
    /// "command", "button", or anything else
    pub kind: String,
    /// Command name or button custom ID
    pub identifier: String,
    pub user: String,
    pub channel: EnvelopeChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<EnvelopeMessage>,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl InteractionEnvelope {
    pub fn to_interaction(&self) -> Interaction {
        let kind = match self.kind.as_str() {
            "command" => InteractionKind::Command,
            "button" => InteractionKind::ButtonClick,
            other => InteractionKind::Other(other.to_string()),
        };
        Interaction {
            kind,
            identifier: self.identifier.clone(),
            source_message: self
                .message
                .as_ref()
                .map(|m| SourceMessage::new(m.id.clone(), m.content.clone())),
            channel: ChannelRef {
                id: self.channel.id.clone(),
                is_thread: self.channel.is_thread,
            },
            user_id: self.user.clone(),
            options: self.options.clone(),
        }
    }
}

// =============================================================================
// Outbound
// =============================================================================

fn button_style(style: ButtonStyle) -> u8 {
    match style {
        ButtonStyle::Primary => 1,
        ButtonStyle::Secondary => 2,
    }
}

/// Message body shared by callbacks and follow-ups
pub fn message_body(payload: &ReplyPayload) -> Value {
    let components: Vec<Value> = if payload.buttons.is_empty() {
        Vec::new()
    } else {
        vec![json!({
            "type": COMPONENT_ACTION_ROW,
            "components": payload.buttons.iter().map(button_component).collect::<Vec<_>>(),
        })]
    };

    let mut body = json!({
        "content": payload.content,
        "components": components,
    });
    if payload.ephemeral {
        body["flags"] = json!(FLAG_EPHEMERAL);
    }
    body
}

fn button_component(button: &ButtonDescriptor) -> Value {
    json!({
        "type": COMPONENT_BUTTON,
        "style": button_style(button.style),
        "label": button.label,
        "custom_id": button.id,
    })
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    id: String,
    #[serde(default)]
    content: String,
}

/// Shared REST client; hands out one surface per interaction
#[derive(Clone)]
pub struct PlatformClient {
    http: Client,
    config: PlatformConfig,
}

impl PlatformClient {
    pub fn new(config: PlatformConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create platform HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn surface(&self, envelope: &InteractionEnvelope) -> PlatformSurface {
        PlatformSurface {
            client: self.clone(),
            interaction_id: envelope.id.clone(),
            token: envelope.token.clone(),
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }
}

/// Reply surface bound to one interaction's ID and token
pub struct PlatformSurface {
    client: PlatformClient,
    interaction_id: String,
    token: String,
}

impl PlatformSurface {
    fn callback_url(&self) -> String {
        self.client.api(&format!(
            "/interactions/{}/{}/callback",
            self.interaction_id, self.token
        ))
    }

    fn follow_up_url(&self) -> String {
        self.client.api(&format!(
            "/webhooks/{}/{}",
            self.client.config.application_id, self.token
        ))
    }

    async fn post(&self, url: String, body: Value, what: &str) -> Result<()> {
        let response = self
            .client
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Platform {} request failed", what))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Platform {} returned {}: {}", what, status, error_text);
        }
        Ok(())
    }
}

#[async_trait]
impl ReplySurface for PlatformSurface {
    async fn defer(&self) -> Result<()> {
        self.post(
            self.callback_url(),
            json!({ "type": CALLBACK_DEFERRED }),
            "defer",
        )
        .await
    }

    async fn reply(&self, payload: ReplyPayload) -> Result<()> {
        self.post(
            self.callback_url(),
            json!({ "type": CALLBACK_MESSAGE, "data": message_body(&payload) }),
            "reply",
        )
        .await
    }

    async fn follow_up(&self, payload: ReplyPayload) -> Result<()> {
        self.post(self.follow_up_url(), message_body(&payload), "follow-up")
            .await
    }

    /// Walks the history newest to oldest, one page at a time, until a short
    /// page marks the start of the thread or `thread_history_max` is reached
    async fn thread_messages(&self, thread: &ChannelRef) -> Result<Vec<String>> {
        let page_size = self.client.config.thread_history_limit;
        let max = self.client.config.thread_history_max as usize;
        let mut contents = Vec::new();
        let mut before: Option<String> = None;

        loop {
            let page = self.history_page(thread, page_size, before.as_deref()).await?;
            let full_page = page.len() >= page_size as usize;
            before = page.last().map(|m| m.id.clone());
            contents.extend(page.into_iter().map(|m| m.content));

            if !full_page || before.is_none() {
                break;
            }
            if contents.len() >= max {
                tracing::warn!(
                    thread = %thread.id,
                    max,
                    "Thread history truncated at configured maximum"
                );
                contents.truncate(max);
                break;
            }
        }

        Ok(contents)
    }
}

impl PlatformSurface {
    async fn history_page(
        &self,
        thread: &ChannelRef,
        limit: u32,
        before: Option<&str>,
    ) -> Result<Vec<ThreadMessage>> {
        let mut url = self
            .client
            .api(&format!("/channels/{}/messages?limit={}", thread.id, limit));
        if let Some(before) = before {
            url.push_str(&format!("&before={}", before));
        }

        let response = self
            .client
            .http
            .get(&url)
            .header(
                "Authorization",
                format!("Bot {}", self.client.config.bot_token),
            )
            .send()
            .await
            .context("Thread history request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Thread history returned {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse thread history")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quoordinates_core::follow_up_row;

    fn envelope(kind: &str) -> InteractionEnvelope {
        serde_json::from_value(json!({
            "id": "i1",
            "token": "tok",
            "kind": kind,
            "identifier": "summarize",
            "user": "u1",
            "channel": { "id": "t1", "is_thread": true },
            "message": { "id": "m1", "content": "Life is short" }
        }))
        .unwrap()
    }

    #[test]
    fn test_envelope_to_button_interaction() {
        let interaction = envelope("button").to_interaction();
        assert_eq!(interaction.kind, InteractionKind::ButtonClick);
        assert_eq!(interaction.source_content(), "Life is short");
        assert!(interaction.channel.is_thread);
        assert!(interaction.options.is_empty());
    }

    #[test]
    fn test_envelope_unknown_kind() {
        let interaction = envelope("modal_submit").to_interaction();
        assert_eq!(
            interaction.kind,
            InteractionKind::Other("modal_submit".to_string())
        );
    }

    #[test]
    fn test_message_body_with_button_row() {
        let body = message_body(&ReplyPayload::with_buttons("> quote", follow_up_row()));
        let row = &body["components"][0];
        assert_eq!(row["type"], 1);
        assert_eq!(row["components"].as_array().unwrap().len(), 3);
        assert_eq!(row["components"][0]["type"], 2);
        assert_eq!(row["components"][0]["style"], 1);
        assert_eq!(row["components"][0]["custom_id"], "illustrate");
        assert!(body.get("flags").is_none());
    }

    #[test]
    fn test_message_body_without_buttons_clears_components() {
        let body = message_body(&ReplyPayload::text("No more quotes found!"));
        assert_eq!(body["components"], json!([]));
    }

    #[test]
    fn test_ephemeral_flag() {
        let body = message_body(&ReplyPayload::ephemeral("oops"));
        assert_eq!(body["flags"], 64);
    }

    #[test]
    fn test_urls() {
        let config = PlatformConfig {
            api_base: "https://discord.test/api/v10/".to_string(),
            application_id: "app".to_string(),
            ..PlatformConfig::default()
        };
        let client = PlatformClient::new(config).unwrap();
        let surface = client.surface(&envelope("button"));
        assert_eq!(
            surface.callback_url(),
            "https://discord.test/api/v10/interactions/i1/tok/callback"
        );
        assert_eq!(
            surface.follow_up_url(),
            "https://discord.test/api/v10/webhooks/app/tok"
        );
    }
}
