//! Fixtures shared by the unit tests.

use axum::Router;
use std::path::PathBuf;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Creates a fresh directory under the system temp dir.
pub async fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dream-server-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    dir
}
