use std::sync::Arc;

use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::errors;
use crate::app::routes::common::require_actor;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new().route("/stats", get(stats))
}

/// Back-office overview counters. Admin only.
pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match services.dashboard_stats(actor) {
        Ok(stats) => Json(serde_json::json!({ "stats": stats })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
