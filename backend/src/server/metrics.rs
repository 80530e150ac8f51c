//! Prometheus wiring for the `metrics` feature.
//!
//! [`MetricsLayer`] wraps the app in the request metrics middleware when a
//! registry is configured and boxes the body either way so both arms share
//! one type. [`enrollment_metrics`] picks the enrollment counter adapter.

use std::sync::Arc;

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use registrar::domain::ports::{EnrollmentMetrics, NoOpEnrollmentMetrics};
use registrar::outbound::metrics::PrometheusEnrollmentMetrics;

const METRICS_NAMESPACE: &str = "registrar";
const METRICS_ENDPOINT: &str = "/metrics";

/// Build the request metrics middleware serving [`METRICS_ENDPOINT`].
pub(crate) fn build_prometheus() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new(METRICS_NAMESPACE)
        .endpoint(METRICS_ENDPOINT)
        .build()
        .map_err(|err| std::io::Error::other(format!("prometheus setup failed: {err}")))
}

/// Register enrollment counters on the shared registry, or fall back to a
/// no-op recorder when metrics are disabled.
pub(crate) fn enrollment_metrics(
    prometheus: Option<&PrometheusMetrics>,
) -> std::io::Result<Arc<dyn EnrollmentMetrics>> {
    match prometheus {
        Some(prometheus) => {
            let metrics = PrometheusEnrollmentMetrics::new(&prometheus.registry).map_err(|err| {
                std::io::Error::other(format!("enrollment metrics registration failed: {err}"))
            })?;
            Ok(Arc::new(metrics))
        }
        None => Ok(Arc::new(NoOpEnrollmentMetrics)),
    }
}

#[derive(Clone)]
pub(crate) enum MetricsLayer {
    Enabled(Arc<PrometheusMetrics>),
    Disabled,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(metrics: Option<PrometheusMetrics>) -> Self {
        metrics.map_or(Self::Disabled, |metrics| Self::Enabled(Arc::new(metrics)))
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            MetricsLayer::Enabled(metrics) => {
                let fut = Compat::new((*metrics).clone()).new_transform(service);
                Box::pin(async move { Ok(boxed::service(fut.await?)) })
            }
            MetricsLayer::Disabled => Box::pin(async move {
                let svc = service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
                Ok(boxed::service(svc))
            }),
        }
    }
}
