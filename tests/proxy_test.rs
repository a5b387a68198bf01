// End-to-end tests for the MapServer reverse proxy: forwarding, header
// rewriting, upstream error passthrough and transport-failure translation.

mod test_utils;

use std::net::SocketAddr;

use axum::{
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Router,
};

use test_utils::{spawn_app, test_config};

/// Stub MapServer: echoes the requested URI and the user-agent it saw.
async fn spawn_upstream() -> SocketAddr {
    async fn echo(uri: Uri, headers: HeaderMap) -> impl IntoResponse {
        let seen_user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        (
            [
                ("content-type", "image/png".to_string()),
                ("x-seen-user-agent", seen_user_agent),
            ],
            uri.to_string(),
        )
    }

    async fn boom() -> impl IntoResponse {
        (StatusCode::INTERNAL_SERVER_ERROR, "mapserver exploded")
    }

    let app = Router::new()
        .route("/boom", get(boom))
        .route("/*path", get(echo));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind upstream listener");
    let addr = listener.local_addr().expect("failed to read upstream addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("upstream died");
    });

    addr
}

/// Reserves a port with nothing listening on it.
async fn refused_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to reserve port");
    let port = listener.local_addr().expect("failed to read addr").port();
    drop(listener);
    port
}

#[tokio::test]
async fn forwards_path_and_query_to_upstream() {
    let upstream = spawn_upstream().await;
    let app = spawn_app(test_config(&format!("http://{}", upstream))).await;

    let response = reqwest::get(format!(
        "http://{}/api/v1/proxy/mapserver/wms?LAYER=x",
        app
    ))
    .await
    .expect("proxy request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(
        response.headers().get("x-seen-user-agent").unwrap(),
        "GeoportalBackendProxy/1.0"
    );
    assert_eq!(response.text().await.unwrap(), "/wms?LAYER=x");
}

#[tokio::test]
async fn trailing_slash_on_base_url_does_not_double_up() {
    let upstream = spawn_upstream().await;
    let app = spawn_app(test_config(&format!("http://{}/", upstream))).await;

    let response = reqwest::get(format!(
        "http://{}/api/v1/proxy/mapserver/cgi-bin/mapserv?SERVICE=WMS",
        app
    ))
    .await
    .expect("proxy request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await.unwrap(),
        "/cgi-bin/mapserv?SERVICE=WMS"
    );
}

#[tokio::test]
async fn upstream_http_error_passes_through() {
    let upstream = spawn_upstream().await;
    let app = spawn_app(test_config(&format!("http://{}", upstream))).await;

    let response = reqwest::get(format!("http://{}/api/v1/proxy/mapserver/boom", app))
        .await
        .expect("proxy request failed");

    // A 500 from MapServer is a valid upstream response, not a gateway
    // failure; body and status mirror the upstream.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text().await.unwrap(), "mapserver exploded");
}

#[tokio::test]
async fn unreachable_upstream_yields_502() {
    let port = refused_port().await;
    let app = spawn_app(test_config(&format!("http://127.0.0.1:{}", port))).await;

    let response = reqwest::get(format!("http://{}/api/v1/proxy/mapserver/wms", app))
        .await
        .expect("proxy request failed");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(response.text().await.unwrap(), "Error connecting to MapServer");
}
