//! Prometheus exporters for domain metrics ports (`metrics` feature).

mod prometheus_enrollment;

pub use prometheus_enrollment::PrometheusEnrollmentMetrics;
