use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();

    let handle = builder
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    init_metric_descriptions();

    handle
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!("packfy_quotes_total", "Total number of price quotes computed");
    describe_counter!(
        "packfy_shipments_created_total",
        "Total number of shipments registered"
    );
    describe_counter!(
        "packfy_status_updates_total",
        "Total number of shipment status changes"
    );
    describe_counter!("packfy_errors_total", "Total number of API errors");
    describe_histogram!(
        "packfy_request_duration_seconds",
        "Request duration in seconds"
    );
    describe_gauge!("packfy_build_info", "Service version information");

    gauge!("packfy_build_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a computed quote
pub fn record_quote(urgent: bool) {
    counter!(
        "packfy_quotes_total",
        "urgent" => if urgent { "true" } else { "false" },
    )
    .increment(1);
}

/// Record a created shipment
pub fn record_shipment_created(tenant: &str) {
    counter!(
        "packfy_shipments_created_total",
        "tenant" => tenant.to_string(),
    )
    .increment(1);
}

/// Record a status change
pub fn record_status_update(tenant: &str, status: &str) {
    counter!(
        "packfy_status_updates_total",
        "tenant" => tenant.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
}

/// Record request duration
pub fn record_duration(endpoint: &'static str, duration: Duration) {
    histogram!(
        "packfy_request_duration_seconds",
        "endpoint" => endpoint,
    )
    .record(duration.as_secs_f64());
}

/// Record an API error
pub fn record_api_error(error_type: &'static str) {
    counter!(
        "packfy_errors_total",
        "error_type" => error_type,
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_metrics() {
        init_metric_descriptions();

        // With no recorder installed these are no-ops; verify they don't panic
        record_quote(true);
        record_shipment_created("miami-express");
        record_status_update("miami-express", "received_miami");
        record_duration("/api/v1/quotes", Duration::from_millis(3));
        record_api_error("invalid_weight");
    }
}
