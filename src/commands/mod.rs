// ABOUTME: Slash commands offered by the bot and the startup registry wiring
// ABOUTME: /quos searches quotes, /aart generates an illustration

pub mod aart;
pub mod quos;

pub use aart::AartCommand;
pub use quos::QuosCommand;

use quoordinates_core::commands::{CommandRegistry, RegistryError};
use quoordinates_core::resolvers::Collaborators;
use quoordinates_core::workflow::WorkflowTracker;
use serde_json::{json, Value};
use std::sync::Arc;

/// Platform option type for free text
const OPTION_STRING: u8 = 3;

/// Schema for a single required free-text option
pub(crate) fn required_text_option(name: &str, description: &str) -> Value {
    json!([{
        "type": OPTION_STRING,
        "name": name,
        "description": description,
        "required": true,
    }])
}

/// Build the registry with every slash command. Fails on duplicate names.
pub fn build_registry(
    collaborators: &Collaborators,
    tracker: &Arc<dyn WorkflowTracker>,
) -> Result<CommandRegistry, RegistryError> {
    let registry = CommandRegistry::builder()
        .with(Arc::new(QuosCommand::new(
            collaborators.clone(),
            Arc::clone(tracker),
        )))?
        .with(Arc::new(AartCommand::new(
            collaborators.clone(),
            Arc::clone(tracker),
        )))?
        .build();
    Ok(registry)
}
