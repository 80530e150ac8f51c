//! Prometheus adapter for enrollment outcomes.
//!
//! Exposes `registrar_enrollment_attempts_total{outcome}` on the registry
//! served at `/metrics`.

use async_trait::async_trait;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::ports::{EnrollmentMetrics, EnrollmentMetricsError, EnrollmentOutcome};

const METRIC_NAME: &str = "registrar_enrollment_attempts_total";

/// Counts enroll attempts by outcome.
pub struct PrometheusEnrollmentMetrics {
    attempts_total: IntCounterVec,
}

impl PrometheusEnrollmentMetrics {
    /// Register the counter with `registry`.
    ///
    /// # Errors
    /// Fails when a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let attempts_total = IntCounterVec::new(
            Opts::new(METRIC_NAME, "Enrollment attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(attempts_total.clone()))?;
        Ok(Self { attempts_total })
    }
}

#[async_trait]
impl EnrollmentMetrics for PrometheusEnrollmentMetrics {
    async fn record_enrollment(
        &self,
        outcome: EnrollmentOutcome,
    ) -> Result<(), EnrollmentMetricsError> {
        self.attempts_total
            .get_metric_with_label_values(&[outcome.as_str()])
            .map_err(|err| EnrollmentMetricsError::export(err.to_string()))?
            .inc();
        Ok(())
    }
}
