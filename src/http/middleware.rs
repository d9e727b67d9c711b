//! Gate middleware.
//! Runs the gate before any protected handling of a request.

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::gate::RequestGate;
use crate::http::extract::buffer_request;
use crate::http::response::{block_response, StatusBody};
use crate::http::X_REQUEST_ID;

/// State required by the gate middleware and the status endpoint.
#[derive(Clone, Debug)]
pub struct GateState {
    pub gate: RequestGate,
    pub max_body_bytes: usize,
}

impl GateState {
    pub fn new(gate: RequestGate, max_body_bytes: usize) -> Self {
        Self {
            gate,
            max_body_bytes,
        }
    }
}

/// Wrap every route (and the fallback) of `router` with the gate.
pub fn protect<S>(router: Router<S>, state: GateState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, gate_middleware))
}

fn request_id(req: &Request<Body>) -> String {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

pub async fn gate_middleware(
    State(state): State<GateState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // Disabled gate: pass the request through untouched.
    if !state.gate.is_enabled() {
        return next.run(req).await;
    }

    let request_id = request_id(&req);
    let (ctx, req) = match buffer_request(req, state.max_body_bytes).await {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejecting unreadable request");
            return e.into_response();
        }
    };

    let verdict = state.gate.inspect(&ctx).await;
    match block_response(&verdict) {
        Some(response) => {
            tracing::info!(
                request_id = %request_id,
                ip = %ctx.client_address,
                method = %ctx.method,
                endpoint = %ctx.path,
                reason = %verdict.reason(),
                "Request blocked"
            );
            response
        }
        None => next.run(req).await,
    }
}

/// Status endpoint: runs the same inspection but always answers 200 with the outcome.
pub async fn status_handler(State(state): State<GateState>, req: Request<Body>) -> Response {
    let (ctx, _) = match buffer_request(req, state.max_body_bytes).await {
        Ok(pair) => pair,
        Err(e) => return e.into_response(),
    };

    let verdict = state.gate.inspect(&ctx).await;
    Json(StatusBody::new(&verdict, ctx.client_address)).into_response()
}

/// Answers a bare `OPTIONS` on the status endpoint without inspecting it.
pub async fn status_preflight() -> StatusCode {
    StatusCode::OK
}

/// Lets scripts from any origin poll the status endpoint.
pub fn status_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
