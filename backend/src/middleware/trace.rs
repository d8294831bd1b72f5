//! Per-request correlation for the ledger API.
//!
//! [`Trace`] mints a [`TraceId`] for each request and drives the handler
//! inside [`TraceId::scope`] and a `tracing` span carrying the same value.
//! Domain errors built during the request pick the identifier up, and the
//! response echoes it in the `trace-id` header.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, debug, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Actix middleware factory; wrap an `App` or scope with it.
///
/// ```
/// use actix_web::App;
/// use seed_ledger::Trace;
///
/// let _app = App::new().wrap(Trace);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = Traced<S>;
    type Future = Ready<Result<Traced<S>, ()>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(Traced {
            inner: Rc::new(service),
        }))
    }
}

/// Service produced by [`Trace`].
pub struct Traced<S> {
    inner: Rc<S>,
}

fn stamp<B>(response: &mut ServiceResponse<B>, id: TraceId) {
    match HeaderValue::try_from(id.to_string()) {
        Ok(value) => {
            response
                .headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => warn!(%error, "trace id is not a valid header value"),
    }
}

impl<S, B> Service<ServiceRequest> for Traced<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&self, request: ServiceRequest) -> Self::Future {
        let id = TraceId::generate();
        let span = info_span!(
            "ledger_request",
            trace_id = %id,
            method = %request.method(),
            path = request.path(),
        );
        let inner = Rc::clone(&self.inner);

        let handled = async move {
            let mut response = inner.call(request).await?;
            stamp(&mut response, id);
            debug!(status = response.status().as_u16(), "request finished");
            Ok(response)
        };
        Box::pin(TraceId::scope(id, handled.instrument(span)))
    }
}
