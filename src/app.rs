// ABOUTME: Wires config into concrete collaborators, the command registry, and the dispatcher
// ABOUTME: Shared by the serve and commands subcommands

use anyhow::{Context, Result};
use quoordinates_core::config::Config;
use quoordinates_core::resolvers::Collaborators;
use quoordinates_core::workflow::{UsageTracker, WorkflowTracker};
use quoordinates_core::{CommandRegistry, Dispatcher};
use std::sync::Arc;

use crate::books::BookCatalog;
use crate::commands;
use crate::openai::OpenAiClient;
use crate::platform::PlatformClient;
use crate::quote_search::HttpQuoteSearch;

/// Everything the gateway needs to handle interactions
pub struct App {
    pub dispatcher: Arc<Dispatcher>,
    pub platform: PlatformClient,
    pub tracker: Arc<UsageTracker>,
}

pub fn collaborators(config: &Config) -> Result<Collaborators> {
    let openai = Arc::new(OpenAiClient::new(config.openai.clone())?);
    let books = BookCatalog::new(&config.books);
    tracing::info!(books = books.len(), "Book catalog loaded");

    Ok(Collaborators {
        art: openai.clone(),
        completer: openai,
        quotes: Arc::new(HttpQuoteSearch::new(&config.quotes)?),
        books: Arc::new(books),
    })
}

pub fn registry(
    collaborators: &Collaborators,
    tracker: &Arc<dyn WorkflowTracker>,
) -> Result<CommandRegistry> {
    commands::build_registry(collaborators, tracker).context("Failed to register slash commands")
}

impl App {
    pub fn build(config: &Config) -> Result<Self> {
        let collaborators = collaborators(config)?;
        let tracker = Arc::new(UsageTracker::new());
        let workflow: Arc<dyn WorkflowTracker> = tracker.clone();
        let registry = registry(&collaborators, &workflow)?;
        tracing::info!(commands = ?registry.names(), "Slash commands registered");

        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(registry, collaborators, workflow)),
            platform: PlatformClient::new(config.platform.clone())?,
            tracker,
        })
    }
}
