// ABOUTME: Per-interaction response state machine wrapping a ReplySurface
// ABOUTME: Tracks Unanswered -> Deferred -> Answered and rejects invalid emissions

use crate::traits::{ReplyPayload, ReplySurface};
use thiserror::Error;

/// Where an interaction is in its response lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// Nothing sent yet
    Unanswered,
    /// Acknowledged with a pending indicator, no content yet
    Deferred,
    /// At least one message delivered
    Answered,
}

impl ResponseState {
    /// True once the platform has seen any acknowledgement
    pub fn is_acknowledged(self) -> bool {
        !matches!(self, ResponseState::Unanswered)
    }
}

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("interaction already acknowledged (state: {0:?})")]
    AlreadyAcknowledged(ResponseState),

    #[error("interaction must be acknowledged before a follow-up")]
    NotAcknowledged,

    /// The platform rejected or never received the emission, e.g. an expired
    /// deferred-response token
    #[error("reply transport failed: {0}")]
    Transport(#[source] anyhow::Error),
}

/// Owns the response state of one interaction.
///
/// Every emission goes through here so that `reply` is never issued after a
/// defer or an earlier reply.
pub struct Responder<'a> {
    surface: &'a dyn ReplySurface,
    state: ResponseState,
}

impl<'a> Responder<'a> {
    pub fn new(surface: &'a dyn ReplySurface) -> Self {
        Self {
            surface,
            state: ResponseState::Unanswered,
        }
    }

    pub fn state(&self) -> ResponseState {
        self.state
    }

    /// Underlying surface, for non-emitting calls such as thread history
    pub fn surface(&self) -> &'a dyn ReplySurface {
        self.surface
    }

    /// Unanswered -> Deferred
    pub async fn defer(&mut self) -> Result<(), ReplyError> {
        if self.state.is_acknowledged() {
            return Err(ReplyError::AlreadyAcknowledged(self.state));
        }
        self.surface.defer().await.map_err(ReplyError::Transport)?;
        self.state = ResponseState::Deferred;
        Ok(())
    }

    /// Unanswered -> Answered
    pub async fn reply(&mut self, payload: ReplyPayload) -> Result<(), ReplyError> {
        if self.state.is_acknowledged() {
            return Err(ReplyError::AlreadyAcknowledged(self.state));
        }
        self.surface
            .reply(payload)
            .await
            .map_err(ReplyError::Transport)?;
        self.state = ResponseState::Answered;
        Ok(())
    }

    /// Deferred | Answered -> Answered
    pub async fn follow_up(&mut self, payload: ReplyPayload) -> Result<(), ReplyError> {
        if !self.state.is_acknowledged() {
            return Err(ReplyError::NotAcknowledged);
        }
        self.surface
            .follow_up(payload)
            .await
            .map_err(ReplyError::Transport)?;
        self.state = ResponseState::Answered;
        Ok(())
    }

    /// Reply if nothing was sent yet, otherwise follow up
    pub async fn respond(&mut self, payload: ReplyPayload) -> Result<(), ReplyError> {
        if self.state.is_acknowledged() {
            self.follow_up(payload).await
        } else {
            self.reply(payload).await
        }
    }
}
