use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::dto::{CreatePublicationRequest, EditPublicationRequest, PublicationListQuery};
use crate::app::errors;
use crate::app::routes::common::{optional_actor, require_actor};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_publication).get(list_publications))
        .route("/:slug", get(get_publication).patch(edit_publication))
        .route("/:slug/publish", post(publish))
        .route("/:slug/unpublish", post(unpublish))
}

pub async fn create_publication(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Json(body): Json<CreatePublicationRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match services.create_publication(actor, body) {
        Ok(publication) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "publication": publication })),
        )
            .into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

/// Public listing; drafts appear only for admins.
pub async fn list_publications(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Query(query): Query<PublicationListQuery>,
) -> axum::response::Response {
    match services.list_publications(optional_actor(actor), query) {
        Ok(publications) => {
            Json(serde_json::json!({ "publications": publications })).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}

/// Public lookup by slug; unpublished entries only resolve for admins.
pub async fn get_publication(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    match services.get_publication_by_slug(optional_actor(actor), &slug) {
        Ok(publication) => Json(serde_json::json!({ "publication": publication })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn edit_publication(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(slug): Path<String>,
    Json(body): Json<EditPublicationRequest>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let publication_id = match services.publication_id_by_slug(&slug) {
        Ok(id) => id,
        Err(err) => return errors::domain_error_to_response(err),
    };

    match services.edit_publication(actor, publication_id, body) {
        Ok(publication) => Json(serde_json::json!({ "publication": publication })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn publish(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let publication_id = match services.publication_id_by_slug(&slug) {
        Ok(id) => id,
        Err(err) => return errors::domain_error_to_response(err),
    };

    match services.publish_publication(actor, publication_id) {
        Ok(publication) => Json(serde_json::json!({ "publication": publication })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn unpublish(
    Extension(services): Extension<Arc<AppServices>>,
    actor: Option<Extension<ActorContext>>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    let actor = match require_actor(actor) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let publication_id = match services.publication_id_by_slug(&slug) {
        Ok(id) => id,
        Err(err) => return errors::domain_error_to_response(err),
    };

    match services.unpublish_publication(actor, publication_id) {
        Ok(publication) => Json(serde_json::json!({ "publication": publication })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
