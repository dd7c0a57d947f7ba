// ABOUTME: Core traits and data types shared by the dispatcher and platform adapters
// ABOUTME: Interactions, reply payloads, button descriptors, and collaborator seams

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Interaction
// =============================================================================

/// Kind discriminator of an inbound platform event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    /// A slash-style command invocation
    Command,
    /// A click on a button attached to an earlier bot message
    ButtonClick,
    /// Anything else the platform delivers (autocomplete, modal submit, ...)
    Other(String),
}

impl InteractionKind {
    /// Short label used in logs and metrics
    pub fn as_str(&self) -> &str {
        match self {
            InteractionKind::Command => "command",
            InteractionKind::ButtonClick => "button",
            InteractionKind::Other(kind) => kind.as_str(),
        }
    }

    /// Bounded label for metrics; every unsupported kind shares "other"
    pub fn metric_label(&self) -> &'static str {
        match self {
            InteractionKind::Command => "command",
            InteractionKind::ButtonClick => "button",
            InteractionKind::Other(_) => "other",
        }
    }
}

/// The message a clicked button is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
    /// Platform message ID
    pub id: String,
    /// Literal text content of the message
    pub content: String,
}

impl SourceMessage {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Channel an interaction happened in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    /// Platform channel ID (the thread ID when `is_thread` is set)
    pub id: String,
    /// Whether the channel is a thread whose history can be fetched
    pub is_thread: bool,
}

impl ChannelRef {
    pub fn channel(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_thread: false,
        }
    }

    pub fn thread(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_thread: true,
        }
    }
}

/// One inbound event: a command invocation or a button click
#[derive(Debug, Clone)]
pub struct Interaction {
    pub kind: InteractionKind,
    /// Command name or button custom ID
    pub identifier: String,
    /// Message the button is attached to (button clicks only)
    pub source_message: Option<SourceMessage>,
    pub channel: ChannelRef,
    /// User who triggered the interaction
    pub user_id: String,
    /// Command options keyed by option name
    pub options: BTreeMap<String, String>,
}

impl Interaction {
    pub fn command(
        name: impl Into<String>,
        channel: ChannelRef,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: InteractionKind::Command,
            identifier: name.into(),
            source_message: None,
            channel,
            user_id: user_id.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn button(
        custom_id: impl Into<String>,
        source_message: SourceMessage,
        channel: ChannelRef,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: InteractionKind::ButtonClick,
            identifier: custom_id.into(),
            source_message: Some(source_message),
            channel,
            user_id: user_id.into(),
            options: BTreeMap::new(),
        }
    }

    /// Builder-style helper to attach a command option
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Get a command option by name
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(|s| s.as_str())
    }

    /// Content of the attached source message, empty if there is none
    pub fn source_content(&self) -> &str {
        self.source_message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

// =============================================================================
// Replies
// =============================================================================

/// Visual style of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Primary,
    Secondary,
}

/// A clickable button attached to a reply. Built fresh, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonDescriptor {
    pub id: String,
    pub label: String,
    pub style: ButtonStyle,
}

impl ButtonDescriptor {
    pub fn primary(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style: ButtonStyle::Primary,
        }
    }
}

/// Content sent back to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub content: String,
    /// Follow-up buttons rendered as a single row; empty closes the chain
    pub buttons: Vec<ButtonDescriptor>,
    /// Only visible to the invoking user
    pub ephemeral: bool,
}

impl ReplyPayload {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            buttons: Vec::new(),
            ephemeral: false,
        }
    }

    pub fn with_buttons(content: impl Into<String>, buttons: Vec<ButtonDescriptor>) -> Self {
        Self {
            content: content.into(),
            buttons,
            ephemeral: false,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            buttons: Vec::new(),
            ephemeral: true,
        }
    }
}

/// Platform operations available for one interaction.
///
/// Implementations are raw transports; response-state bookkeeping lives in
/// [`crate::reply::Responder`], which is the only caller of these methods.
#[async_trait]
pub trait ReplySurface: Send + Sync {
    /// Acknowledge the interaction and show a pending state
    async fn defer(&self) -> Result<()>;

    /// Send the initial response
    async fn reply(&self, payload: ReplyPayload) -> Result<()>;

    /// Send an additional message after the interaction was acknowledged
    async fn follow_up(&self, payload: ReplyPayload) -> Result<()>;

    /// Fetch the literal content of every message currently in a thread
    async fn thread_messages(&self, thread: &ChannelRef) -> Result<Vec<String>>;
}

// =============================================================================
// External collaborators
// =============================================================================

/// Candidate quote returned by the similarity search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteCandidate {
    pub text: String,
    pub title: String,
}

impl QuoteCandidate {
    pub fn new(text: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: title.into(),
        }
    }
}

/// Result of an image generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArt {
    /// Prompt the image was actually generated from
    pub prompt: String,
    /// Temporary URL of the generated image
    pub image_url: String,
}

/// Image generation from free text
#[async_trait]
pub trait ArtGenerator: Send + Sync {
    async fn generate(&self, source_text: &str) -> Result<GeneratedArt>;
}

/// Single-shot text completion
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, instruction: &str) -> Result<String>;
}

/// Semantic quote search
#[async_trait]
pub trait QuoteSearch: Send + Sync {
    async fn search(&self, source_text: &str) -> Result<Vec<QuoteCandidate>>;
}

/// Book title to link lookup
pub trait BookLookup: Send + Sync {
    fn lookup(&self, title: &str) -> Option<String>;
}

// =============================================================================
// Tests
// =============================================================================
