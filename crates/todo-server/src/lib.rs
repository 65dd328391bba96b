//! Static host for the browser front-end. No dynamic routes, no server-side
//! state: every GET maps to a file below the web root.

pub mod static_files;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::Uri;
use axum::response::Response;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

pub use static_files::WebRoot;

pub fn router(web_root: WebRoot) -> Router {
    Router::new()
        .route("/", get(serve_asset))
        .route("/{*path}", get(serve_asset))
        .with_state(Arc::new(web_root))
}

async fn serve_asset(State(web_root): State<Arc<WebRoot>>, uri: Uri) -> Response {
    static_files::serve_path(&web_root, uri.path()).await
}

/// Serves until Ctrl-C.
pub async fn serve(listener: TcpListener, web_root: WebRoot) -> anyhow::Result<()> {
    let addr = listener
        .local_addr()
        .context("listener has no local address")?;
    info!(
        listen = %addr,
        root = %web_root.root().display(),
        index = web_root.index(),
        "serving static assets"
    );

    axum::serve(listener, router(web_root))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
