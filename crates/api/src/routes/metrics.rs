//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Registers descriptions for the metrics the services emit.
pub fn describe() {
    metrics::describe_counter!("orders_placed_total", "Orders committed");
    metrics::describe_counter!(
        "order_placement_failures_total",
        "Order placements that were rejected or rolled back, by reason"
    );
    metrics::describe_counter!(
        "auth_rejections_total",
        "Requests refused by the authorization gate, by reason"
    );
    metrics::describe_counter!("accounts_registered_total", "Self-service registrations");
    metrics::describe_histogram!(
        "order_placement_duration_seconds",
        metrics::Unit::Seconds,
        "Time to validate, price, and commit an order"
    );
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    ([(CONTENT_TYPE, PROMETHEUS_TEXT)], handle.render())
}
