//! Axum middleware placing the [`AccessGate`] in front of a router.
//!
//! The hosting transport terminates TLS and inserts a [`TlsState`] into the
//! request extensions of every request that arrived over TLS.  Requests
//! without that extension are treated as plaintext.  The remote address is
//! taken from `ConnectInfo<SocketAddr>` when the server was started with
//! `into_make_service_with_connect_info`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::mtls::{AccessGate, Decision, Rejection, TlsState};

/// Remote address placeholder when the transport supplied none.
const UNKNOWN_REMOTE: &str = "unknown";

/// mTLS guard middleware.
///
/// Forwards the untouched request to `next` exactly once on
/// [`Decision::Forward`]; otherwise answers with the configured status and
/// text without calling `next`.
pub async fn mtls_guard(
    State(gate): State<Arc<AccessGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| UNKNOWN_REMOTE.to_string(), |ConnectInfo(addr)| addr.to_string());

    let decision = gate.evaluate(request.extensions().get::<TlsState>(), &remote_addr);
    match decision {
        Decision::Forward => next.run(request).await,
        Decision::Reject(rejection) => rejection_response(&rejection),
    }
}

/// Wrap every route of `router` with [`mtls_guard`].
pub fn guarded<S>(router: Router<S>, gate: Arc<AccessGate>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, mtls_guard))
}

/// Plain-text error response, identical for every rejection reason.
///
/// The body is exactly the configured text, with no trailing newline.
fn rejection_response(rejection: &Rejection) -> Response {
    let mut response = (rejection.status, rejection.text.to_string()).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}
