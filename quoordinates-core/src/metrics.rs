// ABOUTME: Prometheus metrics for interactions, button actions, commands, and quotes
// ABOUTME: Thin recording helpers over the metrics facade plus exporter setup

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return a handle for rendering.
/// Call once at startup; recording before this is a no-op.
pub fn init_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

pub fn record_interaction(kind: &str) {
    ::metrics::counter!("quoordinates_interactions_total", "kind" => kind.to_string())
        .increment(1);
}

pub fn record_button_action(action: &str) {
    ::metrics::counter!("quoordinates_button_actions_total", "action" => action.to_string())
        .increment(1);
}

pub fn record_command(command: &str) {
    ::metrics::counter!("quoordinates_commands_total", "command" => command.to_string())
        .increment(1);
}

pub fn record_error(kind: &str) {
    ::metrics::counter!("quoordinates_errors_total", "kind" => kind.to_string()).increment(1);
}

pub fn record_quotes_dropped(reason: &str, count: usize) {
    if count == 0 {
        return;
    }
    ::metrics::counter!("quoordinates_quotes_dropped_total", "reason" => reason.to_string())
        .increment(count as u64);
}

pub fn record_invocation(command: &str, from_button: bool) {
    ::metrics::counter!(
        "quoordinates_invocations_total",
        "command" => command.to_string(),
        "from_button" => from_button.to_string()
    )
    .increment(1);
}

pub fn record_dispatch_duration(seconds: f64) {
    ::metrics::histogram!("quoordinates_dispatch_duration_seconds").record(seconds);
}

pub fn record_gateway_request(status: &str) {
    ::metrics::counter!("quoordinates_gateway_requests_total", "status" => status.to_string())
        .increment(1);
}
