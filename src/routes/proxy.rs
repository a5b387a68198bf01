use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::{
        header::{HeaderName, USER_AGENT},
        HeaderMap, HeaderValue,
    },
    response::Response,
};

use crate::context::AppContext;
use crate::error::AppError;

const PROXY_USER_AGENT: &str = "GeoportalBackendProxy/1.0";

/// Request headers that must not reach the upstream: connection management
/// plus framing the client transport will recompute.
const STRIPPED_REQUEST_HEADERS: [&str; 5] = [
    "host",
    "connection",
    "user-agent",
    "content-length",
    "content-type",
];

/// Response headers the serving layer recomputes for the streamed body.
const STRIPPED_RESPONSE_HEADERS: [&str; 4] = [
    "content-length",
    "transfer-encoding",
    "content-encoding",
    "connection",
];

/// GET /proxy/mapserver/{*path}
///
/// Forwards the path and query string to the configured MapServer base URL
/// and streams the response back without buffering (tile and image payloads
/// can be large). Upstream HTTP errors pass through untouched; only
/// transport-level failures are translated, to 502.
pub async fn proxy_mapserver_get(
    State(app_context): State<Arc<AppContext>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let target_url = build_target_url(&app_context.config.mapserver.url, &path, query.as_deref());

    let upstream = app_context
        .http_client
        .get(&target_url)
        .headers(forward_headers(&headers))
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, target = %target_url, "MapServer request failed");
            AppError::UpstreamUnreachable
        })?;

    let mut builder = Response::builder().status(upstream.status());
    for (name, value) in upstream.headers() {
        if !is_stripped_response_header(name) {
            builder = builder.header(name, value);
        }
    }

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| {
            tracing::error!(error = %e, target = %target_url, "Failed to assemble proxy response");
            AppError::UpstreamUnexpected
        })
}

/// Joins the configured base URL (trailing slash stripped) with the captured
/// path, keeping the original query string verbatim.
fn build_target_url(base_url: &str, path: &str, query: Option<&str>) -> String {
    let mut target = format!("{}/{}", base_url.trim_end_matches('/'), path);
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }
    target
}

fn forward_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for (name, value) in headers {
        if !STRIPPED_REQUEST_HEADERS.contains(&name.as_str()) {
            forwarded.insert(name.clone(), value.clone());
        }
    }
    forwarded.insert(USER_AGENT, HeaderValue::from_static(PROXY_USER_AGENT));
    forwarded
}

fn is_stripped_response_header(name: &HeaderName) -> bool {
    STRIPPED_RESPONSE_HEADERS.contains(&name.as_str())
}
