//! Request metrics middleware that can be switched off at startup.
//!
//! Both arms produce the same boxed service type, so the `App` type does not
//! depend on whether a Prometheus registry could be built.

use std::sync::Arc;

use actix_service::boxed::{self, BoxService};
use actix_service::{Service, ServiceExt as _, Transform};
use actix_web::Error;
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::PrometheusMetrics;
use futures_util::future::LocalBoxFuture;

type Boxed = BoxService<ServiceRequest, ServiceResponse<BoxBody>, Error>;

#[derive(Clone)]
pub(crate) struct MetricsLayer(Option<Arc<PrometheusMetrics>>);

impl MetricsLayer {
    pub(crate) fn new(prometheus: Option<PrometheusMetrics>) -> Self {
        Self(prometheus.map(Arc::new))
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = Boxed;
    type Future = LocalBoxFuture<'static, Result<Boxed, ()>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match &self.0 {
            Some(prometheus) => {
                let wrapped = Compat::new(PrometheusMetrics::clone(prometheus)).new_transform(service);
                Box::pin(async move { wrapped.await.map(boxed::service) })
            }
            None => {
                let plain = service.map(ServiceResponse::map_into_boxed_body);
                Box::pin(async move { Ok(boxed::service(plain)) })
            }
        }
    }
}
