//! Prometheus metrics for monitoring the server.
//!
//! Metrics are exposed in Prometheus text format when an exporter address is
//! configured. Without an installed recorder every call is a no-op.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **Chain Metrics**: Chains generated and their sizes
//! - **Mail Metrics**: Target messages sent and failed
//! - **Check-in Metrics**: Check-ins recorded

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Chain Metrics
// ============================================================================

/// Record a generated chain and its size.
pub fn chains_generated_total(size: usize) {
    metrics::counter!("chains_generated_total").increment(1);
    metrics::histogram!("chain_size").record(size as f64);
}

// ============================================================================
// Mail Metrics
// ============================================================================

/// Count target messages by outcome.
pub fn target_emails_total(count: usize, success: bool) {
    metrics::counter!("target_emails_total",
        "success" => success.to_string()
    )
    .increment(count as u64);
}

// ============================================================================
// Check-in Metrics
// ============================================================================

/// Increment check-ins counter.
pub fn check_ins_total() {
    metrics::counter!("check_ins_total").increment(1);
}
