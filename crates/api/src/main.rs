use std::sync::Arc;

use stackassign_auth::{Actor, InMemorySessionStore};
use stackassign_core::UserId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stackassign_observability::init();

    let sessions = Arc::new(InMemorySessionStore::new());

    // Dev bootstrap: a fixed admin token via env, so the back office is
    // reachable before a real authentication collaborator is wired in.
    match std::env::var("ADMIN_TOKEN") {
        Ok(token) if !token.is_empty() => {
            sessions.issue_with_token(token, Actor::admin(UserId::new()));
            tracing::info!("admin session registered from ADMIN_TOKEN");
        }
        _ => {
            tracing::warn!("ADMIN_TOKEN not set; no admin session registered");
        }
    }

    let services = Arc::new(stackassign_api::app::services::AppServices::new());
    let app = stackassign_api::app::build_app(services, sessions);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
