//! Builds a [`RequestContext`] from an inbound axum request.
//!
//! # Responsibilities
//! - Buffer the body (bounded) so it can be inspected and still forwarded
//! - Parse query string and form/JSON bodies into merged parameters
//! - Resolve client address, path, method and user agent
//!
//! # Design Decisions
//! - The rebuilt request carries the exact bytes that were read
//! - Content types other than form and JSON contribute no parameters
//! - A JSON body that fails to parse is inspected as raw text under `body`

use std::net::SocketAddr;

use axum::{
    body::{Body, Bytes},
    extract::ConnectInfo,
    http::{header, request::Parts, Request},
};
use futures_util::StreamExt;
use thiserror::Error;

use crate::gate::context::{client_address, ParamValue, Parameters, RequestContext};

/// Failures while reading a request for inspection.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

/// Read the request, returning its context and an equivalent request to pass on.
pub async fn buffer_request(
    request: Request<Body>,
    max_body_bytes: usize,
) -> Result<(RequestContext, Request<Body>), ExtractError> {
    let (parts, body) = request.into_parts();
    let bytes = read_body(&parts, body, max_body_bytes).await?;
    let ctx = context_from_parts(&parts, &bytes);
    Ok((ctx, Request::from_parts(parts, Body::from(bytes))))
}

async fn read_body(parts: &Parts, body: Body, limit: usize) -> Result<Bytes, ExtractError> {
    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ExtractError::BodyTooLarge { limit });
    }

    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ExtractError::BodyRead(e.to_string()))?;
        if buf.len() + chunk.len() > limit {
            return Err(ExtractError::BodyTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// Snapshot request metadata and merged parameters (query first, then body).
pub fn context_from_parts(parts: &Parts, body: &[u8]) -> RequestContext {
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let user_agent = parts
        .headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut parameters = parts
        .uri
        .query()
        .map(Parameters::from_urlencoded)
        .unwrap_or_default();
    parameters.merge(body_parameters(parts, body));

    RequestContext::new(
        client_address(&parts.headers, peer),
        parts.method.as_str(),
        path,
    )
    .with_user_agent(user_agent)
    .with_parameters(parameters)
}

fn body_parameters(parts: &Parts, body: &[u8]) -> Parameters {
    if body.is_empty() {
        return Parameters::new();
    }

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let mime = content_type.split(';').next().unwrap_or_default().trim();

    if mime == "application/x-www-form-urlencoded" {
        Parameters::from_urlencoded(&String::from_utf8_lossy(body))
    } else if mime == "application/json" || mime.ends_with("+json") {
        match serde_json::from_slice(body) {
            Ok(value) => Parameters::from_json(value),
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable JSON body, inspecting as text");
                let mut params = Parameters::new();
                params.insert("body", ParamValue::text(String::from_utf8_lossy(body)));
                params
            }
        }
    } else {
        Parameters::new()
    }
}
