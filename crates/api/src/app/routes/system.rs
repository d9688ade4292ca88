use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::context::ActorContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(actor: Option<Extension<ActorContext>>) -> axum::response::Response {
    let actor = match super::common::require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    Json(serde_json::json!({
        "user_id": actor.user_id.to_string(),
        "role": actor.role.as_str(),
    }))
    .into_response()
}
