//! HTTP middleware

mod layers;
mod metrics;
mod request_id;

pub use layers::cors;
pub use metrics::metrics_middleware;
pub use request_id::request_id_middleware;
