//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the status endpoint and the forwarding fallback
//! - Wire up middleware (gate, tracing, timeout, request ID)
//! - Forward allowed requests unmodified to the upstream application

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::authority::AuthorityError;
use crate::config::GateConfig;
use crate::gate::RequestGate;
use crate::http::middleware::{protect, status_cors, status_handler, status_preflight, GateState};

/// Errors constructing the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid upstream address '{0}'")]
    InvalidUpstream(String),

    #[error("failed to build authority client: {0}")]
    Authority(#[from] AuthorityError),
}

/// Forwarding state injected into the fallback handler.
#[derive(Clone)]
pub struct ProxyState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
}

/// HTTP server running the gate in front of one upstream application.
pub struct GateServer {
    router: Router,
    config: GateConfig,
}

impl GateServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GateConfig) -> Result<Self, ServerError> {
        let gate = RequestGate::new(&config.authority)?;
        Self::with_gate(config, gate)
    }

    /// Create a server around an already built gate.
    pub fn with_gate(config: GateConfig, gate: RequestGate) -> Result<Self, ServerError> {
        let upstream = Authority::from_str(&config.upstream.address)
            .map_err(|_| ServerError::InvalidUpstream(config.upstream.address.clone()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let proxy = ProxyState { client, upstream };
        let gate_state = GateState::new(gate, config.inspection.max_body_bytes);

        let router = Self::build_router(&config, proxy, gate_state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, proxy: ProxyState, gate_state: GateState) -> Router {
        let protected = protect(
            Router::new().fallback(forward_handler).with_state(proxy),
            gate_state.clone(),
        );

        Router::new()
            .route(
                &config.inspection.status_path,
                get(status_handler)
                    .post(status_handler)
                    .options(status_preflight),
            )
            .route_layer(status_cors())
            .with_state(gate_state)
            .merge(protected)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            authority = %self.config.authority.base_url,
            enabled = self.config.authority.enabled,
            "Gate server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Gate server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

/// Forward an allowed request to the upstream as-is.
async fn forward_handler(State(state): State<ProxyState>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %state.upstream, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
