use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use stackassign_auth::SessionValidator;

use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionValidator>,
}

/// Resolve an optional bearer token into an [`ActorContext`].
///
/// - No `Authorization` header: the request proceeds anonymously (public
///   routes accept that; protected handlers answer 401 themselves).
/// - A present-but-invalid token is rejected outright: it signals a client
///   that thinks it is authenticated and should find out it is not.
pub async fn actor_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(token) = extract_bearer(req.headers())? {
        let actor = state
            .sessions
            .resolve(token)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;
        req.extensions_mut().insert(ActorContext::new(actor));
    }

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, StatusCode> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?
        .trim();

    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Some(token))
}
