// ABOUTME: Platform-agnostic interaction orchestration for the quoordinates bot
// ABOUTME: Command registry, dispatcher, button resolvers, quote dedup, and workflow hooks

pub mod actions;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod metrics;
pub mod paths;
pub mod quotes;
pub mod reply;
pub mod resolvers;
pub mod traits;
pub mod workflow;

pub use actions::{follow_up_row, ButtonAction};
pub use commands::{CommandDef, CommandHandler, CommandRegistry, RegistryError};
pub use config::Config;
pub use dispatcher::{DispatchOutcome, Dispatcher, IgnoreReason, GENERIC_FAILURE};
pub use reply::{ReplyError, Responder, ResponseState};
pub use resolvers::{Collaborators, NO_MORE_QUOTES};

// Re-export core traits and data types for convenient access
pub use traits::{
    // Collaborators
    ArtGenerator, BookLookup, Completer, QuoteSearch,
    // Platform
    ReplySurface,
    // Data Types
    ButtonDescriptor, ButtonStyle, ChannelRef, GeneratedArt, Interaction, InteractionKind,
    QuoteCandidate, ReplyPayload, SourceMessage,
};
pub use workflow::{UsageTracker, UserUsage, WorkflowTracker};
