use axum::extract::Extension;
use axum::http::StatusCode;

use stackassign_auth::Actor;
use stackassign_core::AggregateId;

use crate::app::errors;
use crate::context::ActorContext;

/// Require an authenticated actor, or answer 401.
pub fn require_actor(
    actor: Option<Extension<ActorContext>>,
) -> Result<Actor, axum::response::Response> {
    actor
        .map(|Extension(ctx)| ctx.actor())
        .ok_or_else(errors::unauthorized)
}

/// The actor when present; public routes accept anonymous callers.
pub fn optional_actor(actor: Option<Extension<ActorContext>>) -> Option<Actor> {
    actor.map(|Extension(ctx)| ctx.actor())
}

/// Parse a path segment as an aggregate identifier, or answer 400.
pub fn parse_aggregate_id(raw: &str) -> Result<AggregateId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid identifier")
    })
}
