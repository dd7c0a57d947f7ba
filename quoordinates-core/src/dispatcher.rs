// ABOUTME: Interaction dispatcher routing commands and button clicks to their handlers
// ABOUTME: Owns the failure boundary and brackets button actions with workflow hooks

use crate::{
    actions::ButtonAction,
    commands::CommandRegistry,
    metrics,
    reply::Responder,
    resolvers::{self, Collaborators},
    traits::{Interaction, InteractionKind, ReplyPayload, ReplySurface},
    workflow::{self, WorkflowTracker},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;

/// Ephemeral reply sent when a command or button action fails
pub const GENERIC_FAILURE: &str = "There was an error while executing this command!";

/// Why an interaction was deliberately not handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Neither a command nor a button click
    UnsupportedKind,
    /// Button this bot did not emit
    UnknownButton,
    /// Button click without the message it is attached to
    MissingSource,
    /// Command name with no registered handler
    UnknownCommand,
}

/// Result of dispatching one interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran to completion
    Handled,
    /// Nothing was sent
    Ignored(IgnoreReason),
    /// The handler failed and the generic failure reply was delivered
    Failed,
}

/// Routes every inbound interaction to a resolver or command handler
pub struct Dispatcher {
    registry: CommandRegistry,
    collaborators: Collaborators,
    tracker: Arc<dyn WorkflowTracker>,
}

impl Dispatcher {
    pub fn new(
        registry: CommandRegistry,
        collaborators: Collaborators,
        tracker: Arc<dyn WorkflowTracker>,
    ) -> Self {
        Self {
            registry,
            collaborators,
            tracker,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handle one interaction start to finish.
    ///
    /// Returns `Err` only when the platform could not be reached at all for
    /// this interaction (e.g. the defer or the failure reply itself failed);
    /// that error is fatal to this interaction and nothing else.
    #[tracing::instrument(
        skip(self, interaction, surface),
        fields(kind = %interaction.kind.as_str(), identifier = %interaction.identifier, user = %interaction.user_id)
    )]
    pub async fn dispatch(
        &self,
        interaction: &Interaction,
        surface: &dyn ReplySurface,
    ) -> Result<DispatchOutcome> {
        let start = Instant::now();
        metrics::record_interaction(interaction.kind.metric_label());

        let outcome = match interaction.kind {
            InteractionKind::ButtonClick => self.dispatch_button(interaction, surface).await,
            InteractionKind::Command => self.dispatch_command(interaction, surface).await,
            InteractionKind::Other(_) => {
                tracing::debug!("Ignoring unsupported interaction kind");
                Ok(DispatchOutcome::Ignored(IgnoreReason::UnsupportedKind))
            }
        };

        metrics::record_dispatch_duration(start.elapsed().as_secs_f64());
        outcome
    }

    async fn dispatch_button(
        &self,
        interaction: &Interaction,
        surface: &dyn ReplySurface,
    ) -> Result<DispatchOutcome> {
        let Some(action) = ButtonAction::parse(&interaction.identifier) else {
            tracing::debug!("Ignoring button this bot does not own");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::UnknownButton));
        };
        if interaction.source_content().trim().is_empty() {
            tracing::debug!(action = ?action, "Ignoring button click without source message");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::MissingSource));
        }
        metrics::record_button_action(action.custom_id());

        let mut responder = Responder::new(surface);
        // Acknowledge before any slow external call so the platform does not time out
        responder
            .defer()
            .await
            .context("Failed to defer button interaction")?;

        workflow::run_pre(self.tracker.as_ref(), interaction).await;

        match resolvers::resolve(action, &self.collaborators, interaction, &mut responder).await {
            Ok(()) => {
                workflow::run_post(
                    self.tracker.as_ref(),
                    interaction,
                    action.logical_name(),
                    true,
                )
                .await;
                Ok(DispatchOutcome::Handled)
            }
            Err(e) => {
                metrics::record_error("button_action");
                tracing::error!(action = ?action, error = %e, "Button action failed");
                send_failure(&mut responder).await?;
                Ok(DispatchOutcome::Failed)
            }
        }
    }

    async fn dispatch_command(
        &self,
        interaction: &Interaction,
        surface: &dyn ReplySurface,
    ) -> Result<DispatchOutcome> {
        let Some(handler) = self.registry.get(&interaction.identifier) else {
            tracing::debug!("Ignoring unregistered command");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::UnknownCommand));
        };
        metrics::record_command(handler.name());

        let mut responder = Responder::new(surface);
        match handler.execute(interaction, &mut responder).await {
            Ok(()) => Ok(DispatchOutcome::Handled),
            Err(e) => {
                metrics::record_error("command");
                tracing::error!(
                    command = %interaction.identifier,
                    error = ?e,
                    "There was an error while executing the command"
                );
                send_failure(&mut responder).await?;
                Ok(DispatchOutcome::Failed)
            }
        }
    }
}

/// Exactly one ephemeral generic failure message, via reply or follow-up
/// depending on what was already sent
async fn send_failure(responder: &mut Responder<'_>) -> Result<()> {
    responder
        .respond(ReplyPayload::ephemeral(GENERIC_FAILURE))
        .await
        .context("Failed to deliver failure reply")
}

