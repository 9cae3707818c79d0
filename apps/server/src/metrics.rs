//! Prometheus metrics for the place server.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Histogram, HistogramVec, IntCounter, IntCounterVec,
};

lazy_static! {
    /// Total HTTP requests by method, route, and status.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "placehub_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds by method and route.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "placehub_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    /// Search operations by mode (general, keyword, radius, count).
    pub static ref SEARCH_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "placehub_search_requests_total",
        "Total number of search operations",
        &["mode"]
    )
    .expect("Failed to register SEARCH_REQUESTS_TOTAL");

    /// End-to-end search duration, request parse to response assembly.
    pub static ref SEARCH_DURATION_SECONDS: Histogram = register_histogram!(
        "placehub_search_duration_seconds",
        "Search operation duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register SEARCH_DURATION_SECONDS");

    /// Store failures that were swallowed into an empty result because
    /// `search.degrade_on_failure` is enabled.
    pub static ref SEARCH_DEGRADED_TOTAL: IntCounter = register_int_counter!(
        "placehub_search_degraded_total",
        "Search operations degraded to an empty result after a store failure"
    )
    .expect("Failed to register SEARCH_DEGRADED_TOTAL");
}
