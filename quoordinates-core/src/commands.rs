// ABOUTME: Slash command handler trait and the write-once command registry
// ABOUTME: Duplicate registrations are configuration errors surfaced at startup

use crate::reply::Responder;
use crate::traits::Interaction;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A slash command the bot can execute
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name as invoked on the platform (without the leading slash)
    fn name(&self) -> &str;

    /// Human-readable description shown in the platform's command picker
    fn description(&self) -> &str;

    /// Option schema, owned by the handler and passed through to the platform untouched
    fn options(&self) -> serde_json::Value {
        serde_json::Value::Array(Vec::new())
    }

    /// Run the command. Errors are turned into a generic user-facing reply by the dispatcher.
    async fn execute(&self, interaction: &Interaction, responder: &mut Responder<'_>)
        -> Result<()>;
}

/// Definition of a registered command, suitable for platform registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandDef {
    pub name: String,
    pub description: String,
    pub options: serde_json::Value,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command '{0}' is already registered")]
    Duplicate(String),

    #[error("command name must not be empty")]
    EmptyName,
}

/// Collects handlers during startup. Consumed by [`CommandRegistryBuilder::build`].
#[derive(Default)]
pub struct CommandRegistryBuilder {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler under its own name. Fails if the name is taken.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) -> Result<(), RegistryError> {
        let name = handler.name().trim().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        tracing::debug!(command = %name, "Registered command handler");
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with(mut self, handler: Arc<dyn CommandHandler>) -> Result<Self, RegistryError> {
        self.register(handler)?;
        Ok(self)
    }

    /// Freeze the registry. No further registration is possible.
    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            handlers: Arc::new(self.handlers),
        }
    }
}

/// Immutable name -> handler map, cheap to clone and share across tasks
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: Arc<HashMap<String, Arc<dyn CommandHandler>>>,
}

impl CommandRegistry {
    pub fn builder() -> CommandRegistryBuilder {
        CommandRegistryBuilder::new()
    }

    /// Look up a handler by command name
    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Definitions of all registered commands, sorted by name
    pub fn definitions(&self) -> Vec<CommandDef> {
        let mut defs: Vec<CommandDef> = self
            .handlers
            .values()
            .map(|h| CommandDef {
                name: h.name().to_string(),
                description: h.description().to_string(),
                options: h.options(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}
