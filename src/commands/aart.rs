// ABOUTME: /aart command: generate an illustration from a prompt
// ABOUTME: Replies with the prompt used and a link to the temporary image

use super::required_text_option;
use anyhow::{Context, Result};
use async_trait::async_trait;
use quoordinates_core::commands::CommandHandler;
use quoordinates_core::reply::Responder;
use quoordinates_core::resolvers::{art_reply, Collaborators};
use quoordinates_core::traits::{Interaction, ReplyPayload};
use quoordinates_core::workflow::{self, WorkflowTracker};
use std::sync::Arc;

pub struct AartCommand {
    collaborators: Collaborators,
    tracker: Arc<dyn WorkflowTracker>,
}

impl AartCommand {
    pub fn new(collaborators: Collaborators, tracker: Arc<dyn WorkflowTracker>) -> Self {
        Self {
            collaborators,
            tracker,
        }
    }
}

#[async_trait]
impl CommandHandler for AartCommand {
    fn name(&self) -> &str {
        "aart"
    }

    fn description(&self) -> &str {
        "Generate art from a prompt"
    }

    fn options(&self) -> serde_json::Value {
        required_text_option("prompt", "Describe the image")
    }

    async fn execute(&self, interaction: &Interaction, responder: &mut Responder<'_>) -> Result<()> {
        let prompt = interaction
            .option("prompt")
            .context("aart invoked without a prompt")?;

        // Image generation easily outlasts the platform's acknowledgement window
        responder.defer().await?;
        workflow::run_pre(self.tracker.as_ref(), interaction).await;

        let art = self.collaborators.art.generate(prompt).await?;
        responder.respond(ReplyPayload::text(art_reply(&art))).await?;

        workflow::run_post(self.tracker.as_ref(), interaction, self.name(), false).await;
        Ok(())
    }
}
