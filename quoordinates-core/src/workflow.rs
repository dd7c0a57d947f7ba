// ABOUTME: Pre/post accounting hooks bracketing every handled interaction
// ABOUTME: UsageTracker keeps in-memory per-user counts and emits metrics

use crate::metrics;
use crate::traits::Interaction;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Accounting hooks around an interaction.
///
/// `pre_workflow` is awaited before the action's first external call,
/// `invocation_workflow` after the reply has been delivered. Both are best
/// effort: callers log failures and carry on.
#[async_trait]
pub trait WorkflowTracker: Send + Sync {
    async fn pre_workflow(&self, interaction: &Interaction) -> Result<()>;

    async fn invocation_workflow(
        &self,
        interaction: &Interaction,
        logical_name: &str,
        from_button: bool,
    ) -> Result<()>;
}

/// Run the pre hook, logging instead of propagating failure
pub async fn run_pre(tracker: &dyn WorkflowTracker, interaction: &Interaction) {
    if let Err(e) = tracker.pre_workflow(interaction).await {
        metrics::record_error("pre_workflow");
        tracing::warn!(error = %e, user = %interaction.user_id, "Pre-workflow hook failed");
    }
}

/// Run the post hook, logging instead of propagating failure
pub async fn run_post(
    tracker: &dyn WorkflowTracker,
    interaction: &Interaction,
    logical_name: &str,
    from_button: bool,
) {
    if let Err(e) = tracker
        .invocation_workflow(interaction, logical_name, from_button)
        .await
    {
        metrics::record_error("invocation_workflow");
        tracing::warn!(
            error = %e,
            user = %interaction.user_id,
            command = logical_name,
            "Invocation-workflow hook failed"
        );
    }
}

/// Usage figures for one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUsage {
    /// Completed invocations per logical command name
    pub invocations: HashMap<String, u64>,
    /// Of those, how many came from follow-up buttons
    pub from_buttons: u64,
    /// Interactions started but not yet accounted
    pub in_flight: u64,
    pub last_seen: Option<DateTime<Utc>>,
}

impl UserUsage {
    pub fn count(&self, command: &str) -> u64 {
        self.invocations.get(command).copied().unwrap_or(0)
    }
}

/// Users kept by `UsageTracker::new`
pub const DEFAULT_MAX_USERS: usize = 10_000;

#[derive(Debug)]
struct Tracked {
    usage: UserUsage,
    /// Tick of the most recent touch, for least-recently-seen eviction
    touched: u64,
}

#[derive(Debug)]
struct Users {
    max: usize,
    tick: u64,
    entries: HashMap<String, Tracked>,
}

impl Users {
    /// Usage for `user_id`, evicting the least recently seen user when a new
    /// one would exceed the cap
    fn touch(&mut self, user_id: &str) -> &mut UserUsage {
        self.tick += 1;
        if !self.entries.contains_key(user_id) && self.entries.len() >= self.max {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, t)| t.touched)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
                tracing::debug!(evicted = %oldest, max = self.max, "Usage tracker full");
            }
        }

        let tick = self.tick;
        let tracked = self
            .entries
            .entry(user_id.to_string())
            .or_insert_with(|| Tracked {
                usage: UserUsage::default(),
                touched: tick,
            });
        tracked.touched = tick;
        &mut tracked.usage
    }
}

/// In-memory usage accounting, capped at a fixed number of users.
/// Nothing survives a restart.
#[derive(Debug)]
pub struct UsageTracker {
    users: Mutex<Users>,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_USERS)
    }
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track at most `max_users`, dropping the least recently seen first
    pub fn with_capacity(max_users: usize) -> Self {
        Self {
            users: Mutex::new(Users {
                max: max_users.max(1),
                tick: 0,
                entries: HashMap::new(),
            }),
        }
    }

    /// Copy of one user's usage, if the user is still tracked
    pub async fn usage(&self, user_id: &str) -> Option<UserUsage> {
        self.users
            .lock()
            .await
            .entries
            .get(user_id)
            .map(|t| t.usage.clone())
    }

    /// Copy of all usage keyed by user
    pub async fn snapshot(&self) -> HashMap<String, UserUsage> {
        self.users
            .lock()
            .await
            .entries
            .iter()
            .map(|(id, t)| (id.clone(), t.usage.clone()))
            .collect()
    }
}

#[async_trait]
impl WorkflowTracker for UsageTracker {
    async fn pre_workflow(&self, interaction: &Interaction) -> Result<()> {
        let mut users = self.users.lock().await;
        let usage = users.touch(&interaction.user_id);
        usage.in_flight += 1;
        usage.last_seen = Some(Utc::now());
        tracing::debug!(
            user = %interaction.user_id,
            identifier = %interaction.identifier,
            "Workflow started"
        );
        Ok(())
    }

    async fn invocation_workflow(
        &self,
        interaction: &Interaction,
        logical_name: &str,
        from_button: bool,
    ) -> Result<()> {
        let mut users = self.users.lock().await;
        let usage = users.touch(&interaction.user_id);
        usage.in_flight = usage.in_flight.saturating_sub(1);
        *usage.invocations.entry(logical_name.to_string()).or_insert(0) += 1;
        if from_button {
            usage.from_buttons += 1;
        }
        usage.last_seen = Some(Utc::now());
        drop(users);

        metrics::record_invocation(logical_name, from_button);
        tracing::info!(
            user = %interaction.user_id,
            command = logical_name,
            from_button,
            "Invocation recorded"
        );
        Ok(())
    }
}
