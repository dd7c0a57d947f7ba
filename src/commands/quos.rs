// ABOUTME: /quos command: semantic quote search for a free-text query
// ABOUTME: Posts each result with the follow-up button row

use super::required_text_option;
use anyhow::{Context, Result};
use async_trait::async_trait;
use quoordinates_core::commands::CommandHandler;
use quoordinates_core::quotes::ExclusionSet;
use quoordinates_core::reply::Responder;
use quoordinates_core::resolvers::{self, Collaborators};
use quoordinates_core::traits::Interaction;
use quoordinates_core::workflow::{self, WorkflowTracker};
use std::sync::Arc;

pub const NO_QUOTES_FOUND: &str = "No quotes found!";

pub struct QuosCommand {
    collaborators: Collaborators,
    tracker: Arc<dyn WorkflowTracker>,
}

impl QuosCommand {
    pub fn new(collaborators: Collaborators, tracker: Arc<dyn WorkflowTracker>) -> Self {
        Self {
            collaborators,
            tracker,
        }
    }
}

#[async_trait]
impl CommandHandler for QuosCommand {
    fn name(&self) -> &str {
        "quos"
    }

    fn description(&self) -> &str {
        "Find quotes related to a topic"
    }

    fn options(&self) -> serde_json::Value {
        required_text_option("query", "What the quotes should be about")
    }

    async fn execute(&self, interaction: &Interaction, responder: &mut Responder<'_>) -> Result<()> {
        let query = interaction
            .option("query")
            .context("quos invoked without a query")?;

        responder.defer().await?;
        workflow::run_pre(self.tracker.as_ref(), interaction).await;

        let candidates = self.collaborators.quotes.search(query).await?;
        // A fresh query has nothing visible to dedup against yet
        let quotes =
            resolvers::render_new_quotes(&self.collaborators, candidates, &ExclusionSet::default());
        resolvers::post_quotes(responder, quotes, NO_QUOTES_FOUND).await?;

        workflow::run_post(self.tracker.as_ref(), interaction, self.name(), false).await;
        Ok(())
    }
}
